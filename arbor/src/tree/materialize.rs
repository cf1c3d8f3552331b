//! Turning data nodes into index entries and visual nodes.
//!
//! A node's children are materialized only when they are rendered at all
//! (the node has children and the view is not flat) and either the node
//! starts expanded or lazy rendering is off. New subtrees are built
//! off-screen and attached in a single pass.

use crate::data::NodeContent;
use crate::id::{DataKey, NodeId};
use crate::index::IndexEntry;
use crate::visual::{VisualId, VisualKind};

use super::TreeView;

/// How one node will be materialized.
struct Plan {
    render_children: bool,
    collapsed: bool,
    load_children: bool,
}

impl<T: NodeContent> TreeView<T> {
    fn plan(&self, key: DataKey, level: usize, flat: bool, force_collapsed: bool) -> Option<Plan> {
        let record = self.data.get(key)?;
        let render_children = !flat && self.data.has_children(key);
        let collapsed = render_children
            && (force_collapsed || self.policy.initial_expand_level <= level || record.collapsed);
        Some(Plan {
            render_children,
            collapsed,
            load_children: render_children && (!collapsed || !self.policy.lazy_render),
        })
    }

    /// Number of nodes [`TreeView::materialize_node`] would create.
    fn materialized_count(&self, key: DataKey, level: usize, flat: bool, force_collapsed: bool) -> u32 {
        let Some(plan) = self.plan(key, level, flat, force_collapsed) else {
            return 0;
        };
        let mut count = 1;
        if plan.load_children {
            for child in self.data.children(key) {
                count += self.materialized_count(*child, level + 1, flat, force_collapsed);
            }
        }
        count
    }

    /// Materialize one node and, depending on the plan, its descendants,
    /// taking ordinals from `cursor`. The visual subtree is left detached.
    fn materialize_node(
        &mut self,
        key: DataKey,
        parent: Option<NodeId>,
        level: usize,
        flat: bool,
        cursor: &mut u32,
        force_collapsed: bool,
    ) -> Option<VisualId> {
        let plan = self.plan(key, level, flat, force_collapsed)?;
        *cursor += 1;
        let id = self.index.id_at(*cursor);
        let content = self.renderer.render(self.data.payload(key)?);
        let kind = if plan.render_children {
            VisualKind::Parent
        } else {
            VisualKind::Leaf
        };
        let visual = self
            .visual
            .create(id.to_string(), content, kind, level, plan.collapsed);
        self.data.set_node_id(key, id);
        self.index.register(IndexEntry {
            id,
            visual,
            data: key,
            parent,
            level,
            is_parent: plan.render_children,
            collapsed: plan.collapsed,
            loaded: plan.load_children,
        });

        if plan.load_children {
            let children = self.data.children(key).to_vec();
            for child in children {
                if let Some(child_visual) =
                    self.materialize_node(child, Some(id), level + 1, flat, cursor, force_collapsed)
                {
                    self.visual.append_child(visual, child_visual);
                }
            }
        }
        Some(visual)
    }

    /// Materialize a list of top-level nodes into an empty index.
    pub(super) fn materialize_roots(&mut self, keys: &[DataKey], flat: bool) {
        let mut cursor = self.index.counter();
        let mut built = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(visual) = self.materialize_node(*key, None, 0, flat, &mut cursor, false) {
                built.push(visual);
            }
        }
        self.visual.attach(None, built);
        self.dirty = true;
        log::debug!(
            "materialized {} nodes from {} roots{}",
            self.index.len(),
            keys.len(),
            if flat { " (flat)" } else { "" }
        );
    }

    /// Materialize `keys` as the last children of `parent`.
    ///
    /// The new nodes go right after the parent's materialized subtree, and
    /// everything behind that point moves up first so ordinals stay
    /// contiguous. Returns the number of nodes created.
    pub(super) fn materialize_children(
        &mut self,
        parent: NodeId,
        keys: &[DataKey],
        force_collapsed: bool,
    ) -> u32 {
        let Some(entry) = self.index.get(&parent) else {
            return 0;
        };
        let (level, parent_visual) = (entry.level + 1, entry.visual);
        let Some(end) = self.index.subtree_end(&parent) else {
            return 0;
        };
        let count: u32 = keys
            .iter()
            .map(|key| self.materialized_count(*key, level, false, force_collapsed))
            .sum();
        if count == 0 {
            return 0;
        }

        let at = end + 1;
        self.shift_ordinals(at, i64::from(count));
        let mut cursor = end;
        let mut built = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(visual) =
                self.materialize_node(*key, Some(parent), level, false, &mut cursor, force_collapsed)
            {
                built.push(visual);
            }
        }
        debug_assert_eq!(cursor, end + count, "materialized count drifted");
        self.visual.attach(Some(parent_visual), built);
        self.dirty = true;
        log::debug!("materialized {count} nodes under {parent} at ordinal {at}");
        count
    }

    /// Move every node with ordinal `>= from` by `delta`, keeping data
    /// back-references, visual ids, selection and focus in step.
    pub(super) fn shift_ordinals(&mut self, from: u32, delta: i64) {
        if delta == 0 || from > self.index.counter() {
            self.index.renumber(from, delta, |_, _| {});
            return;
        }
        let data = &mut self.data;
        let visual = &mut self.visual;
        self.index.renumber(from, delta, |_, entry| {
            data.set_node_id(entry.data, entry.id);
            visual.set_dom_id(entry.visual, entry.id.to_string());
        });
        self.selection.shift(from, delta);
        self.focus = self.focus.map(|id| {
            if id.ordinal() >= from {
                id.shifted(delta)
            } else {
                id
            }
        });
    }
}
