//! Rendering toolkit boundary
//!
//! Screens describe what to show with plain view values and block on a
//! [`Toolkit`] for the user's answer. The terminal implementation lives in
//! [`crate::terminal`]; tests drive screens with a scripted toolkit.

use crate::keybindings::Button;
use crate::nav::Cursor;
use std::time::Duration;

/// How long transient messages stay on screen
pub const MESSAGE_DURATION: Duration = Duration::from_secs(2);

/// Footer hint: a button and what it does on this screen
pub type Hint = (Button, &'static str);

/// A scrollable, selectable list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListView {
    pub title: String,
    pub items: Vec<String>,
    /// Where the list opens
    pub cursor: Cursor,
    /// Shown in place of the items when there are none
    pub empty_message: String,
    pub hints: Vec<Hint>,
    /// Whether X ends the list with [`ListChoice::Action`]
    pub accepts_action: bool,
    /// Lines of the Menu overlay; no overlay when empty
    pub help: Vec<String>,
    /// One-line warning above the list (degraded data)
    pub banner: Option<String>,
}

impl ListView {
    pub fn new(title: impl Into<String>, items: Vec<String>, cursor: Cursor) -> Self {
        Self {
            title: title.into(),
            items,
            cursor,
            ..Default::default()
        }
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn hints(mut self, hints: Vec<Hint>) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_action(mut self) -> Self {
        self.accepts_action = true;
        self
    }

    pub fn help(mut self, lines: Vec<String>) -> Self {
        self.help = lines;
        self
    }

    pub fn banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChoice {
    /// A on the item at this index
    Selected(usize),
    /// X
    Action,
    /// B
    Cancelled,
}

/// The user's answer plus where the list was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListResponse {
    pub choice: ListChoice,
    pub cursor: Cursor,
}

/// Label/value rows, e.g. game statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub rows: Vec<(String, String)>,
    pub hints: Vec<Hint>,
    pub banner: Option<String>,
}

impl DetailView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((label.into(), value.into()));
        self
    }

    pub fn hints(mut self, hints: Vec<Hint>) -> Self {
        self.hints = hints;
        self
    }

    pub fn banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailChoice {
    /// A
    Confirm,
    /// X
    Action,
    /// B
    Back,
}

/// Blocking UI primitives the screens are drawn with
pub trait Toolkit {
    fn list(&mut self, view: &ListView) -> anyhow::Result<ListResponse>;

    fn details(&mut self, view: &DetailView) -> anyhow::Result<DetailChoice>;

    /// Yes/no question; `true` only on an explicit yes.
    fn confirm(&mut self, title: &str, message: &str) -> anyhow::Result<bool>;

    /// Transient message, drawn over whatever is shown next until `duration` passes.
    fn show_message(&mut self, message: &str, duration: Duration);

    /// Hold a still-visible message on screen until it expires or any button
    /// dismisses it. Called before the UI closes, when no screen is left to
    /// draw it over.
    fn flush_messages(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
