//! Navigation state definitions.

use crate::command::CommandParseError;
use crate::element::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;

/// Interaction mode of the canvas.
///
/// The mode picks which key table the input layer consults; it does not
/// restrict which commands the controller accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Browse and edit existing elements.
    #[default]
    Select,
    /// Keys create new elements.
    Create,
    /// Pick a target to connect the selection to.
    Connect,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Create => "create",
            Self::Connect => "connect",
        }
    }
}

impl FromStr for Mode {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Self::Select),
            "create" => Ok(Self::Create),
            "connect" => Ok(Self::Connect),
            other => Err(CommandParseError::UnknownMode(other.to_string())),
        }
    }
}

/// Snapshot of the controller state for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NavigationState {
    pub selected: Option<ElementId>,
    pub mode: Mode,
}

/// Bounded list of previously selected ids, most recent last.
#[derive(Debug, Clone)]
pub struct FocusHistory {
    entries: VecDeque<ElementId>,
    limit: usize,
}

impl Default for FocusHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

impl FocusHistory {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Record an id, dropping the oldest entry when full.
    ///
    /// Pushing the id already on top is a no-op.
    pub fn push(&mut self, id: ElementId) {
        if self.entries.back() == Some(&id) {
            return;
        }
        if self.entries.len() == self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(id);
    }

    /// Take the most recent entry.
    pub fn pop(&mut self) -> Option<ElementId> {
        self.entries.pop_back()
    }

    /// Forget every occurrence of `id`.
    pub fn purge(&mut self, id: &ElementId) {
        self.entries.retain(|entry| entry != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ElementId> {
        self.entries.iter()
    }
}
