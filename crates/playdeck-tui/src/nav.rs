//! Stack-based screen navigation
//!
//! The controller owns an ordered stack of [`ScreenFrame`]s and runs exactly one
//! screen at a time: the top frame. Each screen receives the cursor saved in its
//! frame and reports a [`Transition`] plus the cursor it ended on. The controller
//! never looks inside transition values; a [`Router`] turns them into new screens.
//!
//! | transition | code | effect |
//! |---|---|---|
//! | `Forward(v)` | 0 | save cursor, push the routed screen at `(0, 0)` |
//! | `Back` | 2 | pop; the parent resumes at its saved cursor |
//! | `Action(v)` | 4 | save cursor, push the routed action screen |
//! | `NoData(msg)` | 404 | notify `msg` if any, then pop |
//! | error | -1 | unwind the whole stack, return [`NavigationError::Fatal`] |
//!
//! Popping the root frame ends the loop.

use std::fmt;
use thiserror::Error;
use tracing::{debug, error};

/// Scroll position within a list screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub selected: usize,
    pub first_visible: usize,
}

impl Cursor {
    pub fn new(selected: usize, first_visible: usize) -> Self {
        Self {
            selected,
            first_visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition<V> {
    Forward(V),
    Back,
    Action(V),
    /// Nothing to show; the optional message is displayed before popping
    NoData(Option<String>),
}

impl<V> Transition<V> {
    /// Numeric exit code of this transition.
    pub fn code(&self) -> i32 {
        match self {
            Transition::Forward(_) => 0,
            Transition::Back => 2,
            Transition::Action(_) => 4,
            Transition::NoData(_) => 404,
        }
    }
}

/// What a screen reports when it finishes drawing
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenOutcome<V> {
    pub transition: Transition<V>,
    pub cursor: Cursor,
}

impl<V> ScreenOutcome<V> {
    pub fn new(transition: Transition<V>, cursor: Cursor) -> Self {
        Self { transition, cursor }
    }

    pub fn back(cursor: Cursor) -> Self {
        Self::new(Transition::Back, cursor)
    }

    pub fn no_data(message: Option<String>, cursor: Cursor) -> Self {
        Self::new(Transition::NoData(message), cursor)
    }
}

/// A screen: immutable parameters plus a draw function
pub trait Screen<C: ?Sized> {
    type Id: Copy + Eq + fmt::Debug;
    type Value;

    fn identity(&self) -> Self::Id;

    /// Render and block until the user leaves the screen.
    fn draw(&self, ctx: &mut C, prior: Cursor) -> anyhow::Result<ScreenOutcome<Self::Value>>;
}

/// Maps transition values to the next screen
///
/// Returning `None` keeps the current frame on top; it is drawn again with the
/// cursor it just reported.
pub trait Router<C: ?Sized, S: Screen<C>> {
    fn forward(&mut self, ctx: &mut C, from: &S, value: S::Value) -> Option<S>;

    fn action(&mut self, ctx: &mut C, from: &S, value: S::Value) -> Option<S>;
}

/// Transient user-visible messages
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Screen {screen} failed")]
    Fatal {
        screen: String,
        #[source]
        source: anyhow::Error,
    },
}

/// One entry on the navigation stack
#[derive(Debug, Clone)]
pub struct ScreenFrame<S> {
    pub screen: S,
    pub cursor: Cursor,
}

impl<S> ScreenFrame<S> {
    pub fn new(screen: S) -> Self {
        Self {
            screen,
            cursor: Cursor::default(),
        }
    }
}

/// Whether the loop should keep going after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Finished,
}

pub struct NavigationController<S> {
    stack: Vec<ScreenFrame<S>>,
}

impl<S> NavigationController<S> {
    pub fn new(root: S) -> Self {
        Self {
            stack: vec![ScreenFrame::new(root)],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_finished(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn current(&self) -> Option<&ScreenFrame<S>> {
        self.stack.last()
    }

    pub fn frames(&self) -> &[ScreenFrame<S>] {
        &self.stack
    }

    /// Draw the top screen once and apply its transition.
    pub fn step<C, R>(&mut self, ctx: &mut C, router: &mut R) -> Result<Step, NavigationError>
    where
        C: Notifier + ?Sized,
        S: Screen<C>,
        R: Router<C, S>,
    {
        let Some(frame) = self.stack.last() else {
            return Ok(Step::Finished);
        };
        let id = frame.screen.identity();

        let outcome = match frame.screen.draw(ctx, frame.cursor) {
            Ok(outcome) => outcome,
            Err(source) => {
                error!(screen = ?id, error = %source, "Screen failed, unwinding");
                self.stack.clear();
                return Err(NavigationError::Fatal {
                    screen: format!("{id:?}"),
                    source,
                });
            }
        };

        debug!(
            screen = ?id,
            code = outcome.transition.code(),
            depth = self.stack.len(),
            "Screen finished"
        );

        match outcome.transition {
            Transition::Forward(value) => {
                let next = self.save_cursor_and_route(outcome.cursor, |from| {
                    router.forward(ctx, from, value)
                });
                if let Some(next) = next {
                    self.stack.push(ScreenFrame::new(next));
                }
            }
            Transition::Action(value) => {
                let next = self.save_cursor_and_route(outcome.cursor, |from| {
                    router.action(ctx, from, value)
                });
                if let Some(next) = next {
                    self.stack.push(ScreenFrame::new(next));
                }
            }
            Transition::Back => {
                self.stack.pop();
            }
            Transition::NoData(message) => {
                if let Some(message) = message {
                    ctx.notify(&message);
                }
                self.stack.pop();
            }
        }

        Ok(if self.stack.is_empty() {
            Step::Finished
        } else {
            Step::Continue
        })
    }

    /// Step until the root is popped or a screen fails.
    pub fn run<C, R>(&mut self, ctx: &mut C, router: &mut R) -> Result<(), NavigationError>
    where
        C: Notifier + ?Sized,
        S: Screen<C>,
        R: Router<C, S>,
    {
        while self.step(ctx, router)? == Step::Continue {}
        Ok(())
    }

    fn save_cursor_and_route(
        &mut self,
        cursor: Cursor,
        route: impl FnOnce(&S) -> Option<S>,
    ) -> Option<S> {
        let frame = self.stack.last_mut()?;
        frame.cursor = cursor;
        route(&frame.screen)
    }
}
