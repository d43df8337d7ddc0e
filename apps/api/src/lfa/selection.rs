//! Row selection over the currently filtered view.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header checkbox state for a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Unchecked,
    Checked,
    Indeterminate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("record '{0}' is not in the current view")]
    NotVisible(String),
}

/// Selected record ids. Ordered so responses are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn from_ids(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    /// Drops ids that are no longer part of the view.
    pub fn retain_visible(&mut self, visible: &[String]) {
        self.ids.retain(|id| visible.contains(id));
    }

    pub fn select(&mut self, id: &str, visible: &[String]) -> Result<(), SelectionError> {
        ensure_visible(id, visible)?;
        self.ids.insert(id.to_string());
        Ok(())
    }

    /// Flips one row. Returns whether the row is selected afterwards.
    pub fn toggle(&mut self, id: &str, visible: &[String]) -> Result<bool, SelectionError> {
        ensure_visible(id, visible)?;
        if self.ids.remove(id) {
            Ok(false)
        } else {
            self.ids.insert(id.to_string());
            Ok(true)
        }
    }

    /// Selects exactly the visible ids.
    pub fn select_all_visible(&mut self, visible: &[String]) {
        self.ids = visible.iter().cloned().collect();
    }

    /// Header checkbox click: clears when fully checked, otherwise selects all.
    pub fn toggle_all(&mut self, visible: &[String]) {
        match self.check_state(visible) {
            CheckState::Checked => self.clear(),
            CheckState::Unchecked | CheckState::Indeterminate => self.select_all_visible(visible),
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn check_state(&self, visible: &[String]) -> CheckState {
        let selected_visible = visible.iter().filter(|id| self.ids.contains(*id)).count();
        if selected_visible == 0 {
            CheckState::Unchecked
        } else if selected_visible == visible.len() {
            CheckState::Checked
        } else {
            CheckState::Indeterminate
        }
    }
}

fn ensure_visible(id: &str, visible: &[String]) -> Result<(), SelectionError> {
    if visible.iter().any(|v| v == id) {
        Ok(())
    } else {
        Err(SelectionError::NotVisible(id.to_string()))
    }
}
