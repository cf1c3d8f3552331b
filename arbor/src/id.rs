//! Identifiers for tree instances, materialized nodes and ingested data.

use std::fmt;

use uuid::Uuid;

/// Unique identifier for a tree widget instance.
///
/// Generated at construction or supplied through
/// [`TreeOptions::instance_id`](crate::options::TreeOptions::instance_id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeInstanceId(Uuid);

impl TreeInstanceId {
    /// Create a fresh random instance id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an instance id from a fixed value (useful for deterministic ids).
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// The underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TreeInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TreeInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree-{}", self.0.simple())
    }
}

/// Key of a materialized node within one tree instance.
///
/// Ordinals are dense, 1-based and follow depth-first materialization order,
/// so the node after `n` in document order is `n + 1`. Ordinals move when a
/// subtree is inserted or removed in front of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: TreeInstanceId,
    ordinal: u32,
}

impl NodeId {
    pub const fn new(tree: TreeInstanceId, ordinal: u32) -> Self {
        Self { tree, ordinal }
    }

    /// The tree instance this id belongs to.
    pub fn tree(&self) -> TreeInstanceId {
        self.tree
    }

    /// Position of the node in materialization order.
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Same instance, different ordinal.
    pub fn with_ordinal(&self, ordinal: u32) -> Self {
        Self::new(self.tree, ordinal)
    }

    /// Shift the ordinal by `delta`, saturating at zero.
    pub fn shifted(&self, delta: i64) -> Self {
        self.with_ordinal(shift_ordinal(self.ordinal, delta))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.tree, self.ordinal)
    }
}

pub(crate) fn shift_ordinal(ordinal: u32, delta: i64) -> u32 {
    u32::try_from(i64::from(ordinal) + delta).unwrap_or(0)
}

/// Stable handle to a node of the ingested data tree.
///
/// Assigned once when the node is ingested and never reused by the same
/// tree, even across `load` calls. Unlike [`NodeId`], it does not change
/// when ordinals are renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataKey(pub(crate) u64);

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data#{}", self.0)
    }
}

/// A materialized node as reported to collaborators: its current id plus
/// its stable data key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub id: NodeId,
    pub key: DataKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display_uses_instance_and_ordinal() {
        let tree = TreeInstanceId::from_u128(7);
        let id = NodeId::new(tree, 12);
        assert_eq!(id.to_string(), format!("{}_12", tree));
        assert!(tree.to_string().starts_with("tree-"));
    }

    #[test]
    fn test_shift_saturates_at_zero() {
        let id = NodeId::new(TreeInstanceId::from_u128(1), 3);
        assert_eq!(id.shifted(4).ordinal(), 7);
        assert_eq!(id.shifted(-2).ordinal(), 1);
        assert_eq!(id.shifted(-10).ordinal(), 0);
    }

    #[test]
    fn test_fresh_instances_differ() {
        assert_ne!(TreeInstanceId::new(), TreeInstanceId::new());
    }
}
