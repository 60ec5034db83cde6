//! Shared selection state
//!
//! A single optional wallet id mirrors the persisted selection in memory.
//! The controller owns the writer half; query callers only ever see
//! read-only views.

use std::sync::{Arc, RwLock};

/// Writer half of the shared selection state.
///
/// Owned by the selection controller; the only code path that mutates the
/// selected wallet id.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: Arc<RwLock<Option<String>>>,
}

impl SelectionState {
    /// Create state with no wallet selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view sharing this state
    pub fn view(&self) -> SelectionStateView {
        SelectionStateView {
            selected: self.selected.clone(),
        }
    }

    /// Mark the given wallet id as the active selection
    pub fn select(&self, wallet_id: &str) {
        *self.selected.write().unwrap() = Some(wallet_id.to_string());
    }

    /// Clear the active selection
    pub fn clear(&self) {
        *self.selected.write().unwrap() = None;
    }

    /// Currently selected wallet id, if any
    pub fn selected(&self) -> Option<String> {
        self.selected.read().unwrap().clone()
    }
}

/// Read-only view of the selection state
#[derive(Debug, Clone)]
pub struct SelectionStateView {
    selected: Arc<RwLock<Option<String>>>,
}

impl SelectionStateView {
    /// Currently selected wallet id, if any
    pub fn selected(&self) -> Option<String> {
        self.selected.read().unwrap().clone()
    }

    /// Whether the given wallet id is the active selection
    pub fn is_selected(&self, wallet_id: &str) -> bool {
        self.selected().as_deref() == Some(wallet_id)
    }
}
