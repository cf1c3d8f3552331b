//! Notifications emitted to the surrounding UI.

use crate::id::NodeRef;

/// An event queued by a [`TreeView`](crate::tree::TreeView) for its host.
///
/// For an expand or collapse, `CollapseStateChanged` is queued before the
/// matching `NodeExpanded`/`NodeCollapsed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// The selection set changed.
    SelectionChanged {
        before: Vec<NodeRef>,
        after: Vec<NodeRef>,
    },
    /// A node entered the selection.
    Selected(NodeRef),
    /// A node left the selection.
    Deselected(NodeRef),
    /// The keyboard cursor moved.
    FocusChanged {
        previous: Option<NodeRef>,
        current: NodeRef,
    },
    /// A node's collapsed flag flipped. Carries the new state.
    CollapseStateChanged { node: NodeRef, collapsed: bool },
    NodeExpanded(NodeRef),
    NodeCollapsed(NodeRef),
}

/// Result of offering an input event to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, try other handlers.
    Ignored,
    /// Event was consumed; the host must skip its default handling.
    Consumed,
}

impl EventResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResult::Consumed)
    }
}
