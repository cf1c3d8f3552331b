//! Selection set for a tree instance.
//!
//! Selected ids are kept in the order they were selected. The anchor is the
//! node the last explicit (non-range) selection happened on, used as the
//! starting point for range selection.

use crate::id::{NodeId, shift_ordinal};

/// Ids that entered and left the selection in one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

impl SelectionDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: Vec<NodeId>,
    anchor: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    /// Clear all selection. Returns the ids that were deselected.
    pub fn clear(&mut self) -> Vec<NodeId> {
        self.anchor = None;
        std::mem::take(&mut self.selected)
    }

    /// Make `id` the only selected id.
    pub fn select(&mut self, id: NodeId) -> SelectionDelta {
        let was_selected = self.contains(&id);
        let removed = self.selected.drain(..).filter(|i| *i != id).collect();
        self.selected.push(id);
        self.anchor = Some(id);
        SelectionDelta {
            added: if was_selected { vec![] } else { vec![id] },
            removed,
        }
    }

    /// Add `id` without touching the rest.
    pub fn add(&mut self, id: NodeId) -> SelectionDelta {
        self.anchor = Some(id);
        if self.contains(&id) {
            return SelectionDelta::default();
        }
        self.selected.push(id);
        SelectionDelta {
            added: vec![id],
            removed: vec![],
        }
    }

    /// Flip membership of `id` (Ctrl+click behaviour).
    pub fn toggle(&mut self, id: NodeId) -> SelectionDelta {
        self.anchor = Some(id);
        self.flip(id)
    }

    /// Flip membership of every id in `range` individually.
    ///
    /// Applying the same range twice restores the previous set. The anchor
    /// is left where it was.
    pub fn toggle_range(&mut self, range: &[NodeId]) -> SelectionDelta {
        let mut delta = SelectionDelta::default();
        for id in range {
            let step = self.flip(*id);
            delta.added.extend(step.added);
            delta.removed.extend(step.removed);
        }
        delta
    }

    /// Shift stored ids with ordinal `>= from` by `delta`, following an index
    /// renumbering pass.
    pub(crate) fn shift(&mut self, from: u32, delta: i64) {
        let shift = |id: NodeId| {
            if id.ordinal() >= from {
                id.with_ordinal(shift_ordinal(id.ordinal(), delta))
            } else {
                id
            }
        };
        for id in &mut self.selected {
            *id = shift(*id);
        }
        self.anchor = self.anchor.map(shift);
    }

    /// Drop every id matching `gone`. Returns the dropped ids.
    pub(crate) fn remove_where<F>(&mut self, mut gone: F) -> Vec<NodeId>
    where
        F: FnMut(&NodeId) -> bool,
    {
        let mut removed = Vec::new();
        self.selected.retain(|id| {
            if gone(id) {
                removed.push(*id);
                false
            } else {
                true
            }
        });
        if self.anchor.as_ref().is_some_and(&mut gone) {
            self.anchor = None;
        }
        removed
    }

    fn flip(&mut self, id: NodeId) -> SelectionDelta {
        if let Some(pos) = self.selected.iter().position(|i| *i == id) {
            self.selected.remove(pos);
            SelectionDelta {
                added: vec![],
                removed: vec![id],
            }
        } else {
            self.selected.push(id);
            SelectionDelta {
                added: vec![id],
                removed: vec![],
            }
        }
    }
}
