use std::collections::BTreeSet;

use crate::store::RecordIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Browsing,
    Selecting,
}

/// Multi-select state for the history list.
///
/// Transitions consume the value and return the next one. Selected entries
/// are storage indices, so the list's newest-first order never leaks into a
/// delete.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    mode: SelectionMode,
    selected: BTreeSet<RecordIndex>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_selecting(&self) -> bool {
        self.mode == SelectionMode::Selecting
    }

    pub fn selected(&self) -> &BTreeSet<RecordIndex> {
        &self.selected
    }

    pub fn is_selected(&self, index: RecordIndex) -> bool {
        self.selected.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn enter(self) -> Self {
        Self {
            mode: SelectionMode::Selecting,
            selected: BTreeSet::new(),
        }
    }

    pub fn cancel(self) -> Self {
        Self::default()
    }

    /// Select/Cancel as one control; the selection is cleared either way
    pub fn toggle_mode(self) -> Self {
        match self.mode {
            SelectionMode::Browsing => self.enter(),
            SelectionMode::Selecting => self.cancel(),
        }
    }

    /// Add or remove `index`. Ignored while browsing.
    pub fn toggle(mut self, index: RecordIndex) -> Self {
        if self.is_selecting() && !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        self
    }

    /// Leave select mode, handing back what should be deleted
    pub fn confirm_delete(self) -> (Self, BTreeSet<RecordIndex>) {
        let selected = match self.mode {
            SelectionMode::Selecting => self.selected,
            SelectionMode::Browsing => BTreeSet::new(),
        };
        (Self::default(), selected)
    }
}
