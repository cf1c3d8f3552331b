//! Key and click handling for the tree.

use crate::data::NodeContent;
use crate::events::EventResult;
use crate::id::NodeId;
use crate::keymap::{Key, KeyCombo, Modifiers, TreeAction};

use super::expand::ExpandOptions;
use super::{TreeView, hook_node};

/// Part of a node row that was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The expand/collapse marker.
    Expander,
    /// The node's content.
    Label,
}

impl<T: NodeContent> TreeView<T> {
    /// Handle a key press.
    ///
    /// Exactly one action runs for a bound key, and the key is reported as
    /// consumed so the host skips its default handling, even when the tree
    /// is empty and the action has nothing to act on. Keys without a
    /// counterpart in [`Key`] are ignored before any hook runs.
    pub fn handle_key(&mut self, key: &KeyCombo) -> EventResult {
        if key.key == Key::Unsupported {
            return EventResult::Ignored;
        }
        let action = self.keymap.action_for(key);
        if let Some(action) = action {
            log::trace!("key {key} -> {action}");
            self.run_action(action);
        }

        let focus = self.focus.and_then(|id| Some((id, self.key_of(id)?)));
        let node = focus.and_then(|(id, data_key)| hook_node(&self.data, Some(id), data_key));
        self.hooks.run_on_key_press(node.as_ref(), key);

        match action {
            Some(_) => EventResult::Consumed,
            None => EventResult::Ignored,
        }
    }

    /// Run a logical action against the focused node.
    pub fn run_action(&mut self, action: TreeAction) {
        match action {
            TreeAction::NextNode => {
                self.next_node();
            }
            TreeAction::PrevNode => {
                self.prev_node();
            }
            TreeAction::FirstNode => {
                self.first_node();
            }
            TreeAction::LastNode => {
                self.last_node();
            }
            TreeAction::Collapse => {
                if let Some(key) = self.focused_key() {
                    self.collapse_node(key, ExpandOptions::default());
                }
            }
            TreeAction::Expand => {
                if let Some(key) = self.focused_key() {
                    self.expand_node(key, ExpandOptions::default());
                }
            }
            TreeAction::ExpandOrDescend => {
                self.expand_or_descend();
            }
            TreeAction::ToggleSelection => {
                if let Some(id) = self.focus {
                    self.set_selected(id, true);
                }
            }
            TreeAction::ToggleExpansion => {
                if let Some(key) = self.focused_key() {
                    self.toggle_node(key, ExpandOptions::default());
                }
            }
            TreeAction::ExtendToFirst => {
                self.extend_to_first();
            }
            TreeAction::ExtendToLast => {
                self.extend_to_last();
            }
        }
    }

    /// Handle a click on a node.
    ///
    /// The expander toggles the node. The label focuses and selects it:
    /// Ctrl toggles it within the selection and Shift range-toggles from the
    /// selection anchor (both multi-select only). `on_click` fires for label
    /// clicks.
    pub fn click(
        &mut self,
        id: NodeId,
        target: ClickTarget,
        modifiers: Modifiers,
    ) -> EventResult {
        let Some(key) = self.key_of(id) else {
            return EventResult::Ignored;
        };
        match target {
            ClickTarget::Expander => {
                self.toggle_node(key, ExpandOptions::default());
            }
            ClickTarget::Label => {
                let anchor = self.selection.anchor().or(self.focus);
                self.focus_id(id, false);
                match anchor {
                    Some(anchor) if modifiers.shift && self.policy.multi_select => {
                        self.range_select(anchor, id);
                    }
                    _ => {
                        self.set_selected(id, modifiers.ctrl);
                    }
                }
                if let Some(node) = hook_node(&self.data, Some(id), key) {
                    self.hooks.run_on_click(&node);
                }
            }
        }
        EventResult::Consumed
    }
}
