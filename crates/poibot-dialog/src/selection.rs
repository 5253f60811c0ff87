use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use poibot_core::{Error, Result, SearchHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    Single,
    Multiple,
}

impl SelectionMode {
    pub fn from_multiple(multiple: bool) -> Self {
        if multiple { SelectionMode::Multiple } else { SelectionMode::Single }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Empty,
    Accumulating,
    Finalized,
}

/// Hits chosen during one dialog, keyed by `SearchHit::key` in insertion
/// order.
///
/// Once [`finalize`](Self::finalize) has been called the set is frozen:
/// `select` and `deselect` return `Error::InvalidState`.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    mode: SelectionMode,
    selected: IndexMap<String, SearchHit>,
    finalized: bool,
}

impl SelectionTracker {
    pub fn new(mode: SelectionMode) -> Self {
        Self { mode, selected: IndexMap::new(), finalized: false }
    }

    pub fn mode(&self) -> SelectionMode { self.mode }

    pub fn state(&self) -> TrackerState {
        if self.finalized {
            TrackerState::Finalized
        } else if self.selected.is_empty() {
            TrackerState::Empty
        } else {
            TrackerState::Accumulating
        }
    }

    /// Single mode replaces the set; multiple mode adds the hit unless its
    /// key is already present.
    pub fn select(&mut self, hit: SearchHit) -> Result<()> {
        self.ensure_open("select")?;
        match self.mode {
            SelectionMode::Single => {
                self.selected.clear();
                self.selected.insert(hit.key.clone(), hit);
            }
            SelectionMode::Multiple => {
                self.selected.entry(hit.key.clone()).or_insert(hit);
            }
        }
        Ok(())
    }

    /// Returns whether the key was selected.
    pub fn deselect(&mut self, key: &str) -> Result<bool> {
        self.ensure_open("deselect")?;
        Ok(self.selected.shift_remove(key).is_some())
    }

    pub fn len(&self) -> usize { self.selected.len() }

    pub fn is_empty(&self) -> bool { self.selected.is_empty() }

    pub fn selected(&self) -> impl Iterator<Item = &SearchHit> { self.selected.values() }

    /// Freeze the set and return its members in insertion order. May be
    /// called repeatedly.
    pub fn finalize(&mut self) -> Vec<SearchHit> {
        self.finalized = true;
        self.selected.values().cloned().collect()
    }

    fn ensure_open(&self, op: &str) -> Result<()> {
        if self.finalized {
            return Err(Error::InvalidState(format!("{} after the selection was finalized", op)));
        }
        Ok(())
    }
}
