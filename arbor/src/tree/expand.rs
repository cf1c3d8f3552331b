//! Expand/collapse state machine.

use crate::data::NodeContent;
use crate::events::TreeEvent;
use crate::id::{DataKey, NodeId, NodeRef};

use super::{TreeView, hook_node};

/// Outcome of a state transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state changed.
    Applied,
    /// A before-hook vetoed the change.
    Vetoed,
    /// Nothing to do: already in that state, not collapsible, or unknown.
    Unchanged,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Also expand every descendant, depth-first.
    pub recursive: bool,
    /// Skip hooks and events.
    pub suppress_events: bool,
}

impl ExpandOptions {
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Self::default()
        }
    }

    pub fn silent() -> Self {
        Self {
            suppress_events: true,
            ..Self::default()
        }
    }
}

impl<T: NodeContent> TreeView<T> {
    /// Expand a node. With lazy rendering, the first expansion materializes
    /// the node's children.
    pub fn expand_node(&mut self, key: DataKey, options: ExpandOptions) -> Transition {
        self.expand_entry(key, options, false)
    }

    /// Collapse a node. Materialized descendants are kept.
    pub fn collapse_node(&mut self, key: DataKey, options: ExpandOptions) -> Transition {
        self.collapse_entry(key, options)
    }

    /// Collapse an expanded parent, expand anything else.
    pub fn toggle_node(&mut self, key: DataKey, options: ExpandOptions) -> Transition {
        let expanded_parent = self
            .node_id_of(key)
            .and_then(|id| self.index.get(&id))
            .is_some_and(|entry| entry.is_parent && !entry.collapsed);
        if expanded_parent {
            self.collapse_entry(key, options)
        } else {
            self.expand_entry(key, options, false)
        }
    }

    /// Recursively expand every root.
    pub fn expand_all(&mut self) {
        let roots = self.data.roots().to_vec();
        for root in roots {
            self.expand_entry(root, ExpandOptions::recursive(), false);
        }
    }

    /// Collapse every materialized parent, then focus the first node.
    pub fn collapse_all(&mut self) {
        let parents: Vec<DataKey> = self
            .index
            .ordered_entries()
            .into_iter()
            .filter(|entry| entry.is_parent && !entry.collapsed)
            .map(|entry| entry.data)
            .collect();
        for key in parents.into_iter().rev() {
            self.collapse_entry(key, ExpandOptions::default());
        }
        self.first_node();
    }

    pub(super) fn expand_entry(
        &mut self,
        key: DataKey,
        options: ExpandOptions,
        force: bool,
    ) -> Transition {
        let Some(id) = self.node_id_of(key) else {
            return Transition::Unchanged;
        };
        let Some(entry) = self.index.get(&id).cloned() else {
            return Transition::Unchanged;
        };
        if !entry.is_parent {
            return Transition::Unchanged;
        }

        let mut result = Transition::Unchanged;
        if entry.collapsed {
            if !force && !options.suppress_events {
                let node = hook_node(&self.data, Some(id), key);
                if node.is_some_and(|node| self.hooks.run_before_expand(&node).is_veto()) {
                    log::debug!("expand of {id} vetoed");
                    return Transition::Vetoed;
                }
            }

            if let Some(entry) = self.index.get_mut(&id) {
                entry.collapsed = false;
            }
            self.visual.set_collapsed(entry.visual, false);

            if !entry.loaded {
                let children = self.data.children(key).to_vec();
                let count = self.materialize_children(id, &children, true);
                log::debug!("lazy load of {id} materialized {count} nodes");
                // The parent sits before the insertion point, so its id held.
                if let Some(entry) = self.index.get_mut(&id) {
                    entry.loaded = true;
                }
            }
            self.dirty = true;
            result = Transition::Applied;
        }

        if options.recursive {
            let children = self.data.children(key).to_vec();
            for child in children {
                if self.expand_entry(child, options, force).is_applied() {
                    result = Transition::Applied;
                }
            }
        }

        if entry.collapsed && !options.suppress_events {
            let node = NodeRef { id, key };
            self.events.push(TreeEvent::CollapseStateChanged {
                node,
                collapsed: false,
            });
            self.events.push(TreeEvent::NodeExpanded(node));
            if let Some(node) = hook_node(&self.data, Some(id), key) {
                self.hooks.run_on_expand(&node);
            }
        }
        result
    }

    pub(super) fn collapse_entry(&mut self, key: DataKey, options: ExpandOptions) -> Transition {
        let Some(id) = self.node_id_of(key) else {
            return Transition::Unchanged;
        };
        let Some(entry) = self.index.get(&id).cloned() else {
            return Transition::Unchanged;
        };
        if !entry.is_parent || entry.collapsed {
            return Transition::Unchanged;
        }

        if !options.suppress_events {
            let node = hook_node(&self.data, Some(id), key);
            if node.is_some_and(|node| self.hooks.run_before_collapse(&node).is_veto()) {
                log::debug!("collapse of {id} vetoed");
                return Transition::Vetoed;
            }
        }

        if let Some(entry) = self.index.get_mut(&id) {
            entry.collapsed = true;
        }
        self.visual.set_collapsed(entry.visual, true);
        self.dirty = true;

        // Focus inside the collapsed subtree moves up to the collapsed node.
        if self.focus.is_some_and(|focus| self.is_descendant(focus, id)) {
            self.focus_id(id, options.suppress_events);
        }

        if !options.suppress_events {
            let node = NodeRef { id, key };
            self.events.push(TreeEvent::CollapseStateChanged {
                node,
                collapsed: true,
            });
            self.events.push(TreeEvent::NodeCollapsed(node));
            if let Some(node) = hook_node(&self.data, Some(id), key) {
                self.hooks.run_on_collapse(&node);
            }
        }
        Transition::Applied
    }

    /// Expand every ancestor of a data node, root first, ignoring vetoes.
    /// Returns the node's id once it is materialized.
    pub(super) fn reveal(&mut self, key: DataKey, suppress_events: bool) -> Option<NodeId> {
        if self.data.get(key).is_none() {
            return None;
        }
        for ancestor in self.data.ancestors(key) {
            let options = ExpandOptions {
                recursive: false,
                suppress_events,
            };
            self.expand_entry(ancestor, options, true);
        }
        self.node_id_of(key)
    }

    /// Whether `id` lies strictly inside the materialized subtree of `ancestor`.
    pub(super) fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.index.get(&id).and_then(|entry| entry.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.index.get(&parent).and_then(|entry| entry.parent);
        }
        false
    }
}
