//! Ratatui implementation of the [`Toolkit`]
//!
//! Every call redraws on each key press and every [`POLL_INTERVAL`] so that
//! toasts expire on time even while the user is idle.

use crate::components::{
    footer, ConfirmDialog, ConfirmResult, DetailPane, HelpModal, ListPane, Toast, ToastManager,
};
use crate::keybindings::{Button, KeyBindings};
use crate::nav::Cursor;
use crate::toolkit::{DetailChoice, DetailView, ListChoice, ListResponse, ListView, Toolkit};
use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::ListState,
    Terminal,
};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where key presses come from
pub trait KeySource {
    /// Next key press, or `None` if `timeout` passed without one.
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>>;
}

/// Keys read from the real terminal
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(key));
                }
            }
        }
        Ok(None)
    }
}

/// Fixed key sequence; running out of keys is an error
#[derive(Debug, Default, Clone)]
pub struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    pub fn new(codes: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            keys: codes
                .into_iter()
                .map(|code| KeyEvent::new(code, KeyModifiers::NONE))
                .collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>> {
        match self.keys.pop_front() {
            Some(key) => Ok(Some(key)),
            None => bail!("key script exhausted"),
        }
    }
}

pub struct TerminalToolkit<B: Backend, K> {
    terminal: Terminal<B>,
    keys: K,
    bindings: KeyBindings,
    toasts: ToastManager,
}

impl<B, K> TerminalToolkit<B, K>
where
    B: Backend,
    <B as Backend>::Error: Send + Sync + 'static,
    K: KeySource,
{
    pub fn new(terminal: Terminal<B>, keys: K) -> Self {
        Self {
            terminal,
            keys,
            bindings: KeyBindings::new(),
            toasts: ToastManager::new(),
        }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }

    pub fn keys(&self) -> &K {
        &self.keys
    }

    /// Block until a bound button is pressed.
    fn next_button(&mut self) -> Result<Option<Button>> {
        let Some(key) = self.keys.next_key(POLL_INTERVAL)? else {
            return Ok(None);
        };
        let button = self.bindings.button(&key);
        if button.is_none() {
            debug!(key = ?key.code, "Unbound key ignored");
        }
        Ok(button)
    }
}

/// Split into optional banner, body and footer
fn split(area: Rect, banner: bool) -> (Option<Rect>, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(u16::from(banner)),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    (banner.then_some(chunks[0]), chunks[1], chunks[2])
}

/// Move a selection for a navigation button; `None` for other buttons.
fn navigate(button: Button, selected: usize, len: usize, page: usize) -> Option<usize> {
    let last = len.saturating_sub(1);
    let next = match button {
        Button::Up => selected.saturating_sub(1),
        Button::Down => (selected + 1).min(last),
        Button::Left | Button::L1 => selected.saturating_sub(page),
        Button::Right | Button::R1 => (selected + page).min(last),
        Button::Home => 0,
        Button::End => last,
        _ => return None,
    };
    Some(next)
}

impl<B, K> Toolkit for TerminalToolkit<B, K>
where
    B: Backend,
    <B as Backend>::Error: Send + Sync + 'static,
    K: KeySource,
{
    fn list(&mut self, view: &ListView) -> Result<ListResponse> {
        let len = view.items.len();
        let mut state = if len == 0 {
            ListState::default()
        } else {
            ListState::default()
                .with_selected(Some(view.cursor.selected.min(len - 1)))
                .with_offset(view.cursor.first_visible)
        };
        let mut help = HelpModal::new();
        let mut page = 1;

        loop {
            let toasts = &mut self.toasts;
            self.terminal.draw(|f| {
                let (banner, body, foot) = split(f.area(), view.banner.is_some());
                if let (Some(area), Some(message)) = (banner, view.banner.as_deref()) {
                    footer::render_banner(f, area, message);
                }
                page = ListPane::page_size(body);
                ListPane::new(&view.title, &view.items, &view.empty_message, &mut state)
                    .render(f, body);
                footer::render(f, foot, &view.hints);
                help.render(f, f.area(), &view.help);
                toasts.render(f, f.area());
            })?;

            let Some(button) = self.next_button()? else {
                continue;
            };

            if help.is_visible() {
                if matches!(button, Button::B | Button::Menu) {
                    help.hide();
                }
                continue;
            }

            let selected = state.selected().unwrap_or(0);
            if let Some(next) = navigate(button, selected, len, page) {
                if len > 0 {
                    state.select(Some(next));
                }
                continue;
            }

            let cursor = if len == 0 {
                Cursor::default()
            } else {
                Cursor::new(selected, state.offset())
            };
            let choice = match button {
                Button::A if len > 0 => ListChoice::Selected(selected),
                Button::X if view.accepts_action => ListChoice::Action,
                Button::B => ListChoice::Cancelled,
                Button::Menu => {
                    if !view.help.is_empty() {
                        help.toggle();
                    }
                    continue;
                }
                _ => continue,
            };
            return Ok(ListResponse { choice, cursor });
        }
    }

    fn details(&mut self, view: &DetailView) -> Result<DetailChoice> {
        loop {
            let toasts = &mut self.toasts;
            self.terminal.draw(|f| {
                let (banner, body, foot) = split(f.area(), view.banner.is_some());
                if let (Some(area), Some(message)) = (banner, view.banner.as_deref()) {
                    footer::render_banner(f, area, message);
                }
                DetailPane::new(&view.title, &view.rows).render(f, body);
                footer::render(f, foot, &view.hints);
                toasts.render(f, f.area());
            })?;

            match self.next_button()? {
                Some(Button::A) => return Ok(DetailChoice::Confirm),
                Some(Button::X) => return Ok(DetailChoice::Action),
                Some(Button::B) => return Ok(DetailChoice::Back),
                _ => {}
            }
        }
    }

    fn confirm(&mut self, title: &str, message: &str) -> Result<bool> {
        let dialog = ConfirmDialog::new(title, message);
        loop {
            self.terminal.draw(|f| dialog.render(f, f.area()))?;

            let Some(button) = self.next_button()? else {
                continue;
            };
            if let Some(result) = dialog.handle_button(button) {
                return Ok(result == ConfirmResult::Yes);
            }
        }
    }

    fn show_message(&mut self, message: &str, duration: Duration) {
        debug!(text = message, "Toast shown");
        self.toasts.push(Toast::new(message, duration));
    }

    fn flush_messages(&mut self) -> Result<()> {
        while self.toasts.is_active() {
            let toasts = &mut self.toasts;
            self.terminal.draw(|f| toasts.render(f, f.area()))?;
            if self.next_button()?.is_some() {
                break;
            }
        }
        self.toasts.dismiss();
        Ok(())
    }
}
