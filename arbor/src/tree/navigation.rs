//! Focus cursor and selection over the visible sequence.
//!
//! The visible sequence is the ordinal order of the index with everything
//! below a collapsed parent pruned, minus nodes the visual tree reports as
//! not rendered. Movement steps from the focused ordinal and jumps over
//! hidden subtrees, so a move never walks the whole index. Movement clamps
//! at both ends.

use crate::data::NodeContent;
use crate::events::TreeEvent;
use crate::filter::Traverse;
use crate::id::{DataKey, NodeId, NodeRef};
use crate::index::IndexEntry;
use crate::selection::SelectionDelta;

use super::expand::Transition;
use super::{TreeView, hook_node};

/// Options for selecting a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Toggle the node in or out of the existing selection instead of
    /// replacing it. Ignored unless multi-select is on.
    pub additive: bool,
    /// Skip hooks and events.
    pub suppress_events: bool,
}

impl SelectOptions {
    pub fn additive() -> Self {
        Self {
            additive: true,
            ..Self::default()
        }
    }
}

impl<T: NodeContent> TreeView<T> {
    /// Ids of the visible sequence, in order.
    pub fn visible_ids(&self) -> Vec<NodeId> {
        let mut visible = Vec::new();
        let mut ordinal = 0;
        while let Some(id) = self.next_visible_after(ordinal) {
            visible.push(id);
            ordinal = id.ordinal();
        }
        visible
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.index
            .get(&id)
            .is_some_and(|entry| self.hiding_root(entry).is_none())
    }

    /// Topmost node that keeps `entry` out of the visible sequence: the
    /// entry itself when it is not shown, or an ancestor that is collapsed
    /// or not shown.
    fn hiding_root(&self, entry: &IndexEntry) -> Option<NodeId> {
        let mut root = (!self.visual.is_shown(entry.visual)).then_some(entry.id);
        let mut parent = entry.parent;
        while let Some(parent_id) = parent {
            let Some(ancestor) = self.index.get(&parent_id) else {
                return Some(root.unwrap_or(entry.id));
            };
            if (ancestor.is_parent && ancestor.collapsed) || !self.visual.is_shown(ancestor.visual) {
                root = Some(ancestor.id);
            }
            parent = ancestor.parent;
        }
        root
    }

    /// First visible node with an ordinal above `ordinal`.
    fn next_visible_after(&self, ordinal: u32) -> Option<NodeId> {
        let mut candidate = ordinal + 1;
        loop {
            let entry = self.index.at(candidate)?;
            match self.hiding_root(entry) {
                None => return Some(entry.id),
                Some(root) => candidate = self.index.subtree_end(&root)? + 1,
            }
        }
    }

    /// Last visible node with an ordinal below `ordinal`.
    fn prev_visible_before(&self, ordinal: u32) -> Option<NodeId> {
        let mut candidate = ordinal.checked_sub(1)?;
        while candidate >= 1 {
            let entry = self.index.at(candidate)?;
            match self.hiding_root(entry) {
                None => return Some(entry.id),
                Some(root) if root == entry.id => candidate -= 1,
                Some(root) => candidate = root.ordinal(),
            }
        }
        None
    }

    fn first_visible(&self) -> Option<NodeId> {
        self.next_visible_after(0)
    }

    fn last_visible(&self) -> Option<NodeId> {
        self.prev_visible_before(self.index.counter() + 1)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus
    }

    pub fn focused_key(&self) -> Option<DataKey> {
        self.focus.and_then(|id| self.key_of(id))
    }

    /// Selected ids in selection order.
    pub fn selected(&self) -> &[NodeId] {
        self.selection.ids()
    }

    pub fn selected_keys(&self) -> Vec<DataKey> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.key_of(*id))
            .collect()
    }

    pub fn is_selected(&self, key: DataKey) -> bool {
        self.node_id_of(key)
            .is_some_and(|id| self.selection.contains(&id))
    }

    // Directional movement

    /// Focus the next visible node. Without focus, focus the first one.
    pub fn next_node(&mut self) -> Option<NodeId> {
        let target = match self.focus {
            None => self.first_visible(),
            Some(focus) => self
                .next_visible_after(focus.ordinal())
                .or_else(|| self.last_visible()),
        }?;
        self.move_focus(target)
    }

    /// Focus the previous visible node. Without focus, focus the first one.
    pub fn prev_node(&mut self) -> Option<NodeId> {
        let target = match self.focus {
            None => self.first_visible(),
            Some(focus) => self
                .prev_visible_before(focus.ordinal())
                .or_else(|| self.first_visible()),
        }?;
        self.move_focus(target)
    }

    pub fn first_node(&mut self) -> Option<NodeId> {
        let target = self.first_visible()?;
        self.move_focus(target)
    }

    pub fn last_node(&mut self) -> Option<NodeId> {
        let target = self.last_visible()?;
        self.move_focus(target)
    }

    /// Expand the focused node if it is collapsed, otherwise step into its
    /// first child.
    pub fn expand_or_descend(&mut self) -> Option<NodeId> {
        let focus = self.focus?;
        let entry = self.index.get(&focus)?.clone();
        if !entry.is_parent {
            return None;
        }
        if entry.collapsed {
            self.expand_entry(entry.data, Default::default(), false);
            return self.focus;
        }
        let first_child = self
            .index
            .at(focus.ordinal() + 1)
            .filter(|child| child.parent == Some(focus))
            .map(|child| child.id)?;
        if self.is_visible(first_child) {
            self.move_focus(first_child)
        } else {
            None
        }
    }

    /// Keyboard movement: focus, and select too when configured.
    fn move_focus(&mut self, id: NodeId) -> Option<NodeId> {
        self.focus_id(id, false);
        if self.policy.select_on_navigate {
            self.set_selected(id, false);
        }
        Some(id)
    }

    // Focus

    /// Move the focus cursor. Does not change the selection.
    pub fn set_focused(&mut self, id: NodeId) -> bool {
        if self.index.get(&id).is_none() {
            return false;
        }
        self.focus_id(id, false);
        true
    }

    pub(super) fn focus_id(&mut self, id: NodeId, suppress_events: bool) {
        if self.focus == Some(id) {
            return;
        }
        let Some(current) = self.node_ref(id) else {
            return;
        };
        let previous = self.focus.and_then(|previous| self.node_ref(previous));
        if let Some(previous) = previous
            && let Some(entry) = self.index.get(&previous.id)
        {
            self.visual.set_focused(entry.visual, false);
        }
        if let Some(entry) = self.index.get(&id) {
            self.visual.set_focused(entry.visual, true);
        }
        self.focus = Some(id);
        self.dirty = true;
        log::trace!("focus {id}");
        if !suppress_events {
            self.events
                .push(TreeEvent::FocusChanged { previous, current });
        }
    }

    // Selection

    /// Select a materialized node. With `additive` (multi-select only), an
    /// already selected node is deselected and others are kept; otherwise
    /// the selection is replaced.
    pub fn set_selected(&mut self, id: NodeId, additive: bool) -> Transition {
        let Some(key) = self.key_of(id) else {
            return Transition::Unchanged;
        };
        let node = hook_node(&self.data, Some(id), key);
        if node.is_some_and(|node| self.hooks.run_before_select(&node).is_veto()) {
            log::debug!("selection of {id} vetoed");
            return Transition::Vetoed;
        }
        self.commit_selection(id, additive, false)
    }

    /// Select a data node, materializing and expanding its ancestors first
    /// when needed, and focus it. A node left out of a flat view brings the
    /// hierarchy back before it is revealed.
    pub fn select_by_data(&mut self, key: DataKey, options: SelectOptions) -> Transition {
        if !options.suppress_events {
            let node = hook_node(&self.data, self.node_id_of(key), key);
            let Some(node) = node else {
                return Transition::Unchanged;
            };
            if self.hooks.run_before_select(&node).is_veto() {
                log::debug!("selection of {key} vetoed");
                return Transition::Vetoed;
            }
        }
        if self.flat && self.node_id_of(key).is_none() && self.data.get(key).is_some() {
            log::debug!("{key} is outside the flat view, restoring the hierarchy");
            self.render();
        }
        let Some(id) = self.reveal(key, options.suppress_events) else {
            log::debug!("{key} could not be materialized for selection");
            return Transition::Unchanged;
        };
        self.focus_id(id, options.suppress_events);
        self.commit_selection(id, options.additive, options.suppress_events)
    }

    /// Select the first data node, in depth-first order, matching
    /// `predicate`. Returns its key.
    pub fn select_by_predicate<P>(
        &mut self,
        mut predicate: P,
        options: SelectOptions,
    ) -> Option<DataKey>
    where
        P: FnMut(&T) -> bool,
    {
        let mut found = None;
        self.traverse(None, |key, payload| {
            if predicate(payload) {
                found = Some(key);
                return Traverse::Stop;
            }
            Traverse::Continue
        });
        let key = found?;
        self.select_by_data(key, options);
        Some(key)
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        let before = self.selected_refs();
        let removed = self.selection.clear();
        let delta = SelectionDelta {
            added: vec![],
            removed,
        };
        self.apply_selection_delta(before, delta, false);
    }

    /// Flip the membership of every visible node between `from` and `to`
    /// (inclusive, either order). Nodes already selected become deselected.
    /// Multi-select only.
    pub fn range_select(&mut self, from: NodeId, to: NodeId) -> SelectionDelta {
        if !self.policy.multi_select {
            return SelectionDelta::default();
        }
        let visible = self.visible_ids();
        let (Some(a), Some(b)) = (
            visible.iter().position(|id| *id == from),
            visible.iter().position(|id| *id == to),
        ) else {
            return SelectionDelta::default();
        };
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let before = self.selected_refs();
        let delta = self.selection.toggle_range(&visible[start..=end]);
        log::debug!(
            "range toggle {from}..{to}: +{} -{}",
            delta.added.len(),
            delta.removed.len()
        );
        self.apply_selection_delta(before, delta.clone(), false);
        delta
    }

    /// Range-toggle from the focused node to the first visible node and
    /// focus it.
    pub fn extend_to_first(&mut self) -> SelectionDelta {
        self.extend_focus_to(self.first_visible())
    }

    /// Range-toggle from the focused node to the last visible node and
    /// focus it.
    pub fn extend_to_last(&mut self) -> SelectionDelta {
        self.extend_focus_to(self.last_visible())
    }

    fn extend_focus_to(&mut self, target: Option<NodeId>) -> SelectionDelta {
        let Some(target) = target else {
            return SelectionDelta::default();
        };
        let from = self.focus.unwrap_or(target);
        let delta = self.range_select(from, target);
        self.focus_id(target, false);
        delta
    }

    fn commit_selection(&mut self, id: NodeId, additive: bool, suppress_events: bool) -> Transition {
        let before = self.selected_refs();
        let delta = if additive && self.policy.multi_select {
            self.selection.toggle(id)
        } else {
            self.selection.select(id)
        };
        let selected = delta.added.contains(&id);
        log::debug!(
            "select {id} (additive {additive}): +{} -{}",
            delta.added.len(),
            delta.removed.len()
        );
        let changed = !delta.is_empty();
        self.apply_selection_delta(before, delta, suppress_events);

        if selected
            && !suppress_events
            && let Some(key) = self.key_of(id)
            && let Some(node) = hook_node(&self.data, Some(id), key)
        {
            self.hooks.run_on_select(&node);
        }
        if changed {
            Transition::Applied
        } else {
            Transition::Unchanged
        }
    }

    /// Mirror a selection change onto the visuals and queue its events.
    fn apply_selection_delta(
        &mut self,
        before: Vec<NodeRef>,
        delta: SelectionDelta,
        suppress_events: bool,
    ) {
        if delta.is_empty() {
            return;
        }
        for (ids, selected) in [(&delta.removed, false), (&delta.added, true)] {
            for id in ids {
                if let Some(entry) = self.index.get(id) {
                    self.visual.set_selected(entry.visual, selected);
                }
            }
        }
        self.dirty = true;
        if suppress_events {
            return;
        }
        let after = self.selected_refs();
        self.events.push(TreeEvent::SelectionChanged { before, after });
        for id in &delta.removed {
            if let Some(node) = self.node_ref(*id) {
                self.events.push(TreeEvent::Deselected(node));
            }
        }
        for id in &delta.added {
            if let Some(node) = self.node_ref(*id) {
                self.events.push(TreeEvent::Selected(node));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::{DataNode, Record};
    use crate::options::TreeOptions;

    /// `root -> [n0 .. n{count}]` followed by a collapsed `tail -> [t0 .. t{count}]`.
    fn wide(count: usize) -> TreeView<Record> {
        let children = |prefix: &str| {
            (0..count)
                .map(|i| json!({"label": format!("{prefix}{i}")}))
                .collect::<Vec<_>>()
        };
        let data = json!([
            {"label": "root", "children": children("n")},
            {"label": "tail", "collapsed": true, "children": children("t")}
        ]);
        let mut tree = TreeView::new(TreeOptions::new().initial_expand_level(1));
        tree.load(DataNode::forest_from_value(data).unwrap());
        tree
    }

    /// Index lookups spent by each of three moves from the middle.
    fn lookups_per_move(count: usize) -> Vec<usize> {
        let mut tree = wide(count);
        let middle = tree.index.at(count as u32 / 2).unwrap().id;
        tree.set_focused(middle);
        tree.index.take_lookups();

        let mut spent = Vec::new();
        tree.next_node();
        spent.push(tree.index.take_lookups());
        tree.prev_node();
        spent.push(tree.index.take_lookups());
        tree.last_node();
        spent.push(tree.index.take_lookups());
        spent
    }

    #[test]
    fn test_moves_do_not_scale_with_tree_size() {
        let small = lookups_per_move(40);
        let large = lookups_per_move(4000);
        assert_eq!(small, large);
        assert!(large.iter().all(|spent| *spent < 20), "{large:?}");
    }

    #[test]
    fn test_stepping_skips_collapsed_and_hidden_subtrees() {
        let mut tree = wide(3);
        let ids: Vec<NodeId> = tree.index.ordered_entries().iter().map(|e| e.id).collect();
        // root n0 n1 n2 tail t0 t1 t2
        assert_eq!(ids.len(), 8);
        assert_eq!(tree.visible_ids(), ids[..5].to_vec());
        assert!(!tree.is_visible(ids[5]));

        tree.set_hidden(ids[2], true);
        tree.set_focused(ids[1]);
        assert_eq!(tree.next_node(), Some(ids[3]));
        assert_eq!(tree.prev_node(), Some(ids[1]));
        assert_eq!(tree.last_node(), Some(ids[4]));
        assert_eq!(tree.next_node(), Some(ids[4]));

        tree.set_hidden(ids[0], true);
        assert_eq!(tree.visible_ids(), vec![ids[4]]);
        assert_eq!(tree.first_node(), Some(ids[4]));
        assert_eq!(tree.prev_node(), Some(ids[4]));
    }
}
