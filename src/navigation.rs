//! Where the operator is in the menu graph and how choices move them around.

use crate::menu::{MenuGraph, ROOT_MENU};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// Only reachable with a graph that skipped validation.
    #[error("menu '{target}' not found")]
    TargetMissing { target: String },
}

/// Current menu, the back-stack, and whether the session is still running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    current: String,
    history: Vec<String>,
    running: bool,
}

impl NavigationState {
    /// Start at `root` with an empty history.
    pub fn new() -> Self {
        Self {
            current: ROOT_MENU.to_string(),
            history: Vec::new(),
            running: true,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Previously visited menus, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Open `target`, remembering the current menu for [`back`](Self::back).
    ///
    /// A target that is not in `graph` leaves the state untouched.
    pub fn enter(&mut self, target: &str, graph: &MenuGraph) -> Result<(), NavigationError> {
        if !graph.contains(target) {
            return Err(NavigationError::TargetMissing {
                target: target.to_string(),
            });
        }
        let previous = std::mem::replace(&mut self.current, target.to_string());
        debug!(from = %previous, to = target, "entered menu");
        self.history.push(previous);
        Ok(())
    }

    /// Return to the previous menu. With an empty history nothing happens and `false` is returned.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                debug!(from = %self.current, to = %previous, "went back");
                self.current = previous;
                true
            }
            None => false,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the operator asked for at the menu prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Back,
    Quit,
    /// Zero-based index into the current menu's items.
    Item(usize),
}

/// Input that is neither a reserved word nor a valid item number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("please enter a valid choice")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("choose a number between 0 and {max}")]
    OutOfRange { max: usize },
}

/// Parse a menu prompt answer for a menu with `item_count` items.
///
/// `0`, `b` and `back` go back, `q` and `quit` quit, `1..=item_count` pick an item. On a menu
/// without items any number goes back.
pub fn parse_choice(input: &str, item_count: usize) -> Result<Choice, ChoiceError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ChoiceError::Empty);
    }
    match input.to_ascii_lowercase().as_str() {
        "b" | "back" => return Ok(Choice::Back),
        "q" | "quit" => return Ok(Choice::Quit),
        _ => {}
    }

    let number: usize = input
        .parse()
        .map_err(|_| ChoiceError::NotANumber(input.to_string()))?;
    match number {
        0 => Ok(Choice::Back),
        _ if item_count == 0 => Ok(Choice::Back),
        n if n <= item_count => Ok(Choice::Item(n - 1)),
        _ => Err(ChoiceError::OutOfRange { max: item_count }),
    }
}
