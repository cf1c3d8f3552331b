//! Index of materialized nodes.
//!
//! Maps each [`NodeId`] to its bookkeeping entry. Ordinals of the live
//! entries always form the contiguous range `[1, counter]`; inserting or
//! removing a subtree goes through [`Index::renumber`], which moves every
//! following entry in one synchronous pass.

#[cfg(test)]
use std::cell::Cell;
use std::collections::HashMap;

use crate::id::{DataKey, NodeId, TreeInstanceId, shift_ordinal};
use crate::visual::VisualId;

/// Bookkeeping for one materialized node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Current id of the node.
    pub id: NodeId,
    /// Handle of the node in the visual tree.
    pub visual: VisualId,
    /// The data node this entry was materialized from.
    pub data: DataKey,
    /// Parent entry, `None` for roots.
    pub parent: Option<NodeId>,
    /// Number of ancestors.
    pub level: usize,
    /// Rendered as a parent (has children and is not part of a flat view).
    pub is_parent: bool,
    /// Children are excluded from the visible sequence.
    pub collapsed: bool,
    /// Children have been materialized at least once.
    pub loaded: bool,
}

/// Storage key. `Shifting` keys only exist inside a renumbering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Live(u32),
    Shifting(u32),
}

#[derive(Debug)]
pub struct Index {
    tree: TreeInstanceId,
    entries: HashMap<Slot, IndexEntry>,
    counter: u32,
    /// Lookups served by `get` and `at`, for bounding navigation cost.
    #[cfg(test)]
    lookups: Cell<usize>,
}

impl Index {
    pub fn new(tree: TreeInstanceId) -> Self {
        Self {
            tree,
            entries: HashMap::new(),
            counter: 0,
            #[cfg(test)]
            lookups: Cell::new(0),
        }
    }

    /// The tree instance whose ids this index holds.
    pub fn tree(&self) -> TreeInstanceId {
        self.tree
    }

    /// Highest assigned ordinal.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id for an ordinal of this tree.
    pub fn id_at(&self, ordinal: u32) -> NodeId {
        NodeId::new(self.tree, ordinal)
    }

    /// Look up an entry. Ids of other trees and unmaterialized ids are absent.
    pub fn get(&self, id: &NodeId) -> Option<&IndexEntry> {
        if id.tree() != self.tree {
            return None;
        }
        self.at(id.ordinal())
    }

    pub(crate) fn get_mut(&mut self, id: &NodeId) -> Option<&mut IndexEntry> {
        if id.tree() != self.tree {
            return None;
        }
        self.entries.get_mut(&Slot::Live(id.ordinal()))
    }

    /// Entry at an ordinal.
    pub fn at(&self, ordinal: u32) -> Option<&IndexEntry> {
        #[cfg(test)]
        self.lookups.set(self.lookups.get() + 1);
        self.entries.get(&Slot::Live(ordinal))
    }

    #[cfg(test)]
    pub(crate) fn take_lookups(&self) -> usize {
        self.lookups.replace(0)
    }

    /// Register an entry under its id, replacing any previous occupant.
    pub(crate) fn register(&mut self, entry: IndexEntry) {
        let ordinal = entry.id.ordinal();
        log::trace!("index register {} (level {})", entry.id, entry.level);
        self.counter = self.counter.max(ordinal);
        self.entries.insert(Slot::Live(ordinal), entry);
    }

    /// Remove an entry. Following ordinals are not moved; pair with
    /// [`Index::renumber`] to keep the range contiguous.
    pub(crate) fn remove(&mut self, id: &NodeId) -> Option<IndexEntry> {
        if id.tree() != self.tree {
            return None;
        }
        self.entries.remove(&Slot::Live(id.ordinal()))
    }

    /// Shift every entry with ordinal `>= from` by `delta`.
    ///
    /// Entries are first parked under temporary keys and then written back
    /// under their final keys, so shifting within the same key space never
    /// overwrites an entry that has not moved yet. Parent references are
    /// shifted with the same rule. `relabel` is called once per moved entry
    /// with its previous id, after the entry holds its new id.
    pub(crate) fn renumber<F>(&mut self, from: u32, delta: i64, mut relabel: F)
    where
        F: FnMut(NodeId, &IndexEntry),
    {
        if delta == 0 {
            return;
        }

        let mut moving: Vec<u32> = self
            .entries
            .keys()
            .filter_map(|slot| match slot {
                Slot::Live(ordinal) if *ordinal >= from => Some(*ordinal),
                _ => None,
            })
            .collect();
        moving.sort_unstable();

        let mut parked = Vec::with_capacity(moving.len());
        for ordinal in moving {
            if let Some(mut entry) = self.entries.remove(&Slot::Live(ordinal)) {
                let previous = entry.id;
                let target = shift_ordinal(ordinal, delta);
                entry.id = self.id_at(target);
                self.entries.insert(Slot::Shifting(target), entry);
                parked.push((previous, target));
            }
        }

        for entry in self.entries.values_mut() {
            if let Some(parent) = entry.parent
                && parent.ordinal() >= from
            {
                entry.parent = Some(parent.shifted(delta));
            }
        }

        for (previous, target) in &parked {
            if let Some(entry) = self.entries.remove(&Slot::Shifting(*target)) {
                relabel(*previous, &entry);
                let displaced = self.entries.insert(Slot::Live(*target), entry);
                debug_assert!(displaced.is_none(), "renumber collided at {target}");
            }
        }

        self.counter = shift_ordinal(self.counter, delta);
        log::debug!(
            "index renumbered {} entries from {} by {}",
            parked.len(),
            from,
            delta
        );
    }

    /// All ids in ordinal order.
    pub fn ordered_ids(&self) -> Vec<NodeId> {
        self.ordered_entries().into_iter().map(|e| e.id).collect()
    }

    /// All entries in ordinal order.
    pub fn ordered_entries(&self) -> Vec<&IndexEntry> {
        let mut entries: Vec<&IndexEntry> = self.entries.values().collect();
        entries.sort_unstable_by_key(|e| e.id.ordinal());
        entries
    }

    /// First id in ordinal order.
    pub fn first_id(&self) -> Option<NodeId> {
        (1..=self.counter)
            .find(|ordinal| self.at(*ordinal).is_some())
            .map(|ordinal| self.id_at(ordinal))
    }

    /// Last id in ordinal order.
    pub fn last_id(&self) -> Option<NodeId> {
        (1..=self.counter)
            .rev()
            .find(|ordinal| self.at(*ordinal).is_some())
            .map(|ordinal| self.id_at(ordinal))
    }

    /// Whether live ordinals are exactly `[1, counter]`.
    pub fn is_contiguous(&self) -> bool {
        self.entries.len() == self.counter as usize
            && (1..=self.counter).all(|ordinal| self.at(ordinal).is_some())
    }

    /// Last ordinal of the materialized subtree rooted at `id`.
    pub(crate) fn subtree_end(&self, id: &NodeId) -> Option<u32> {
        let root = self.get(id)?;
        let mut end = id.ordinal();
        while let Some(next) = self.at(end + 1) {
            if next.level <= root.level {
                break;
            }
            end += 1;
        }
        Some(end)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.counter = 0;
    }
}
