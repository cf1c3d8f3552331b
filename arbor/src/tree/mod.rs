//! The tree widget state engine.
//!
//! [`TreeView`] owns the data store, the index of materialized nodes, the
//! visual tree, the selection set and the focus cursor, and keeps them
//! consistent through every operation. All mutation is synchronous: an
//! operation returns only after the index, visuals, selection and focus
//! agree again.

mod events;
mod expand;
mod materialize;
mod navigation;

use serde::de::DeserializeOwned;

use crate::data::{DataNode, DataStore, NodeContent};
use crate::error::TreeError;
use crate::events::TreeEvent;
use crate::filter::{self, FuzzyQuery, Traverse};
use crate::hooks::{HookNode, Hooks};
use crate::id::{DataKey, NodeId, NodeRef, TreeInstanceId};
use crate::index::{Index, IndexEntry};
use crate::keymap::KeyMap;
use crate::options::{Renderer, TreeOptions, TreePolicy};
use crate::selection::Selection;
use crate::visual::{VisualId, VisualKind, VisualTree};

pub use events::ClickTarget;
pub use expand::{ExpandOptions, Transition};
pub use navigation::SelectOptions;

/// A tree widget instance.
pub struct TreeView<T> {
    instance: TreeInstanceId,
    policy: TreePolicy,
    renderer: Renderer<T>,
    keymap: KeyMap,
    hooks: Hooks<T>,
    data: DataStore<T>,
    index: Index,
    visual: VisualTree,
    selection: Selection,
    focus: Option<NodeId>,
    events: Vec<TreeEvent>,
    /// The current view is a flat filter result rather than the hierarchy.
    flat: bool,
    dirty: bool,
}

impl<T: NodeContent> TreeView<T> {
    pub fn new(options: TreeOptions<T>) -> Self {
        let (instance, policy, renderer, keymap, hooks) = options.into_parts();
        log::debug!("creating tree {instance} ({policy:?})");
        Self {
            instance,
            policy,
            renderer,
            keymap,
            hooks,
            data: DataStore::new(),
            index: Index::new(instance),
            visual: VisualTree::new(),
            selection: Selection::new(),
            focus: None,
            events: Vec::new(),
            flat: false,
            dirty: true,
        }
    }

    pub fn instance_id(&self) -> TreeInstanceId {
        self.instance
    }

    pub fn policy(&self) -> &TreePolicy {
        &self.policy
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut KeyMap {
        &mut self.keymap
    }

    /// Replace all hooks.
    pub fn set_hooks(&mut self, hooks: Hooks<T>) {
        self.hooks = hooks;
    }

    // Loading and rendering

    /// Replace the data with a new forest and materialize it. Returns the
    /// root keys.
    pub fn load(&mut self, roots: Vec<DataNode<T>>) -> Vec<DataKey> {
        self.reset_view();
        let keys = self.data.replace(roots);
        log::debug!("loaded {} data nodes into {}", self.data.len(), self.instance);
        self.materialize_roots(&keys, false);
        keys
    }

    /// Decode a JSON document (one node or an array of roots) and load it.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<DataKey>, TreeError>
    where
        T: DeserializeOwned,
    {
        let roots = DataNode::forest_from_json(json)?;
        Ok(self.load(roots))
    }

    /// Drop everything materialized: index, visuals, selection and focus.
    /// The data is kept and can be shown again with [`TreeView::render`].
    pub fn clear(&mut self) {
        self.reset_view();
        log::debug!("cleared {}", self.instance);
    }

    /// Re-materialize the retained data as a hierarchy, with collapse state
    /// back at its initial values. Ids come out the same as on `load`.
    pub fn render(&mut self) {
        self.reset_view();
        let roots = self.data.roots().to_vec();
        self.materialize_roots(&roots, false);
    }

    /// Materialize a flat list of the nodes matching `predicate`, in
    /// depth-first order, capped at `limit` (or the configured filter
    /// limit). Returns the number of nodes shown.
    pub fn render_filtered<P>(&mut self, predicate: P, limit: Option<usize>) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let limit = limit.unwrap_or(self.policy.filter_limit);
        let keys = filter::filtered(&self.data, None, predicate, limit);
        self.show_flat(&keys)
    }

    /// Flat view of the nodes whose label fuzzy-matches `query`.
    pub fn filter_fuzzy(&mut self, query: &str, limit: Option<usize>) -> usize {
        let limit = limit.unwrap_or(self.policy.filter_limit);
        let mut matcher = FuzzyQuery::new(query);
        let renderer = &self.renderer;
        let keys = filter::filtered(
            &self.data,
            None,
            |payload| matcher.matches(&renderer.label(payload)),
            limit,
        );
        self.show_flat(&keys)
    }

    /// Whether the current view is a flat filter result.
    pub fn is_flat(&self) -> bool {
        self.flat
    }

    fn show_flat(&mut self, keys: &[DataKey]) -> usize {
        self.reset_view();
        self.materialize_roots(keys, true);
        self.flat = true;
        keys.len()
    }

    fn reset_view(&mut self) {
        self.index.clear();
        self.visual.clear();
        self.selection.clear();
        self.focus = None;
        self.data.clear_node_ids();
        self.flat = false;
        self.dirty = true;
    }

    // Structural mutation

    /// Append children to a data node.
    ///
    /// The data is always extended. New children are materialized right
    /// away when the parent's children are already materialized, and
    /// following ordinals shift up by the number of new nodes. Under a lazy
    /// parent that was never expanded they wait for its first expansion. A
    /// leaf becomes an expanded parent.
    pub fn add_children(&mut self, nodes: Vec<DataNode<T>>, parent: DataKey) -> Vec<DataKey> {
        let keys = self.data.append_children(parent, nodes);
        if keys.is_empty() || self.flat {
            return keys;
        }
        let Some(id) = self.node_id_of(parent) else {
            log::debug!("{parent} not materialized, children kept in data only");
            return keys;
        };
        let Some(entry) = self.index.get(&id).cloned() else {
            return keys;
        };

        if !entry.is_parent {
            if let Some(entry) = self.index.get_mut(&id) {
                entry.is_parent = true;
                entry.collapsed = false;
                entry.loaded = true;
            }
            self.visual.set_kind(entry.visual, VisualKind::Parent);
            self.visual.set_collapsed(entry.visual, false);
        } else if !entry.loaded {
            log::debug!("{id} not loaded yet, children kept in data only");
            return keys;
        }

        self.materialize_children(id, &keys, false);
        keys
    }

    /// Delete a data node and its subtree.
    ///
    /// Materialized nodes of the subtree leave the index, visuals, selection
    /// and focus, and following ordinals shift down so they stay contiguous.
    pub fn remove_node(&mut self, key: DataKey) -> bool {
        if self.data.get(key).is_none() {
            return false;
        }
        let parent = self.data.parent(key);
        let mut ordinals: Vec<u32> = filter::flatten(&self.data, Some(key))
            .into_iter()
            .filter_map(|k| self.node_id_of(k))
            .map(|id| id.ordinal())
            .collect();
        self.data.remove_subtree(key);

        let before = self.selected_refs();
        ordinals.sort_unstable();
        let removed: Vec<IndexEntry> = ordinals
            .iter()
            .filter_map(|ordinal| self.index.at(*ordinal).cloned())
            .collect();
        let mut deselected = Vec::new();
        for entry in &removed {
            let tops_subtree = entry
                .parent
                .is_none_or(|p| ordinals.binary_search(&p.ordinal()).is_err());
            if tops_subtree {
                self.visual.detach(entry.visual);
            }
            if self.selection.contains(&entry.id) {
                deselected.push(NodeRef {
                    id: entry.id,
                    key: entry.data,
                });
            }
        }
        self.selection
            .remove_where(|id| ordinals.binary_search(&id.ordinal()).is_ok());
        if self
            .focus
            .is_some_and(|f| ordinals.binary_search(&f.ordinal()).is_ok())
        {
            self.focus = None;
        }

        // Close the gaps run by run, highest first, so earlier runs keep
        // their ordinals while later ones move.
        for (start, end) in contiguous_runs(&ordinals).into_iter().rev() {
            for ordinal in start..=end {
                let id = self.index.id_at(ordinal);
                self.index.remove(&id);
            }
            self.shift_ordinals(end + 1, -i64::from(end - start + 1));
        }

        if let Some(parent) = parent
            && !self.data.has_children(parent)
            && let Some(id) = self.node_id_of(parent)
            && let Some(entry) = self.index.get_mut(&id)
        {
            entry.is_parent = false;
            entry.collapsed = false;
            let visual = entry.visual;
            self.visual.set_kind(visual, VisualKind::Leaf);
            self.visual.set_collapsed(visual, false);
        }

        if !deselected.is_empty() {
            // Survivors may have shifted; report them under their current
            // ids so `before` and `after` agree on them.
            let before = before
                .into_iter()
                .map(|node| match self.node_id_of(node.key) {
                    Some(id) if !deselected.contains(&node) => NodeRef { id, key: node.key },
                    _ => node,
                })
                .collect();
            let after = self.selected_refs();
            self.events.push(TreeEvent::SelectionChanged { before, after });
            self.events
                .extend(deselected.into_iter().map(TreeEvent::Deselected));
        }
        log::debug!("removed {key} ({} materialized nodes)", ordinals.len());
        self.dirty = true;
        true
    }

    /// Change a node's payload in place and refresh its displayed content.
    pub fn update_data<F>(&mut self, key: DataKey, update: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let Some(payload) = self.data.payload_mut(key) else {
            return false;
        };
        update(payload);
        self.refresh_content(key);
        true
    }

    /// Re-run the node renderer for a node, e.g. after [`TreeView::data_mut`].
    pub fn refresh_content(&mut self, key: DataKey) {
        let Some(visual) = self.visual_of(key) else {
            return;
        };
        if let Some(payload) = self.data.payload(key) {
            let content = self.renderer.render(payload);
            self.visual.set_content(visual, content);
            self.dirty = true;
        }
    }

    /// Hide or show a node's visual for host layout reasons. Hidden nodes
    /// and their descendants leave the visible sequence.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(entry) = self.index.get(&id) {
            self.visual.set_hidden(entry.visual, hidden);
            self.dirty = true;
        }
    }

    // Traversal

    /// Depth-first walk over the data from `from` (or every root). The
    /// visitor returns `()`, a `bool` (`false` prunes the node's children)
    /// or a [`Traverse`]. Returns `false` if the walk was stopped.
    pub fn traverse<F, R>(&self, from: Option<DataKey>, visit: F) -> bool
    where
        F: FnMut(DataKey, &T) -> R,
        R: Into<Traverse>,
    {
        filter::traverse(&self.data, from, visit)
    }

    // Lookups

    pub fn data_store(&self) -> &DataStore<T> {
        &self.data
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn visual(&self) -> &VisualTree {
        &self.visual
    }

    /// Root keys of the data.
    pub fn roots(&self) -> &[DataKey] {
        self.data.roots()
    }

    pub fn entry(&self, id: NodeId) -> Option<&IndexEntry> {
        self.index.get(&id)
    }

    /// Current id of a data node, if it is materialized.
    pub fn node_id_of(&self, key: DataKey) -> Option<NodeId> {
        let id = self.data.node_id(key)?;
        self.index
            .get(&id)
            .filter(|entry| entry.data == key)
            .map(|entry| entry.id)
    }

    pub fn key_of(&self, id: NodeId) -> Option<DataKey> {
        self.index.get(&id).map(|entry| entry.data)
    }

    pub fn data(&self, key: DataKey) -> Option<&T> {
        self.data.payload(key)
    }

    /// Label of a data node under the configured label field.
    pub fn label_of(&self, key: DataKey) -> Option<String> {
        self.data.payload(key).map(|payload| self.renderer.label(payload))
    }

    /// Mutable payload access. Call [`TreeView::refresh_content`] afterwards
    /// if the displayed content depends on the change.
    pub fn data_mut(&mut self, key: DataKey) -> Option<&mut T> {
        self.data.payload_mut(key)
    }

    pub fn visual_of(&self, key: DataKey) -> Option<VisualId> {
        let id = self.node_id_of(key)?;
        self.index.get(&id).map(|entry| entry.visual)
    }

    pub fn children_of(&self, key: DataKey) -> &[DataKey] {
        self.data.children(key)
    }

    pub fn parent_of(&self, key: DataKey) -> Option<DataKey> {
        self.data.parent(key)
    }

    /// Whether a materialized parent is collapsed. `None` for leaves and
    /// unmaterialized nodes.
    pub fn is_collapsed(&self, key: DataKey) -> Option<bool> {
        let entry = self.index.get(&self.node_id_of(key)?)?;
        entry.is_parent.then_some(entry.collapsed)
    }

    pub fn is_loaded(&self, key: DataKey) -> bool {
        self.node_id_of(key)
            .and_then(|id| self.index.get(&id))
            .is_some_and(|entry| entry.loaded)
    }

    /// Clone a subtree back out as caller-facing nodes.
    pub fn to_data_node(&self, key: DataKey) -> Option<DataNode<T>>
    where
        T: Clone,
    {
        self.data.extract(key)
    }

    /// Id of the node drawn by a visual node, e.g. for hit testing.
    pub fn node_at_visual(&self, visual: VisualId) -> Option<NodeId> {
        self.index
            .ordered_entries()
            .into_iter()
            .find(|entry| entry.visual == visual)
            .map(|entry| entry.id)
    }

    pub fn node_ref(&self, id: NodeId) -> Option<NodeRef> {
        self.index.get(&id).map(|entry| NodeRef {
            id: entry.id,
            key: entry.data,
        })
    }

    // Host plumbing

    /// Take the queued events.
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether the visuals changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn selected_refs(&self) -> Vec<NodeRef> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.node_ref(*id))
            .collect()
    }
}

/// Hook argument for a data node. Borrows only the store, so hooks can be
/// run while it is alive.
fn hook_node<T>(data: &DataStore<T>, id: Option<NodeId>, key: DataKey) -> Option<HookNode<'_, T>> {
    Some(HookNode {
        id,
        key,
        data: data.payload(key)?,
    })
}

/// Split sorted ordinals into inclusive `(start, end)` runs.
fn contiguous_runs(sorted: &[u32]) -> Vec<(u32, u32)> {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for &ordinal in sorted {
        match runs.last_mut() {
            Some((_, end)) if *end + 1 == ordinal => *end = ordinal,
            _ => runs.push((ordinal, ordinal)),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_runs() {
        assert_eq!(contiguous_runs(&[]), vec![]);
        assert_eq!(contiguous_runs(&[2, 3, 4, 7, 9, 10]), vec![(2, 4), (7, 7), (9, 10)]);
    }
}
