//! Engine-owned arena holding the ingested data tree.

use std::collections::HashMap;

use crate::id::{DataKey, NodeId};

use super::DataNode;

/// One ingested data node.
#[derive(Debug, Clone)]
pub struct DataRecord<T> {
    /// Caller payload.
    pub payload: T,
    /// Child keys in order, `None` when the node never had a children field.
    pub children: Option<Vec<DataKey>>,
    /// Parent key, `None` for roots.
    pub parent: Option<DataKey>,
    /// Initial collapsed hint from the data.
    pub collapsed: bool,
    /// Back-reference to the node's id while it is materialized.
    pub(crate) node_id: Option<NodeId>,
}

/// Arena of data records keyed by [`DataKey`].
///
/// Keys are handed out from a counter that survives [`DataStore::replace`],
/// so a key is never reused by the same store.
#[derive(Debug)]
pub struct DataStore<T> {
    records: HashMap<DataKey, DataRecord<T>>,
    roots: Vec<DataKey>,
    next_key: u64,
}

impl<T> Default for DataStore<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            roots: Vec::new(),
            next_key: 0,
        }
    }
}

impl<T> DataStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root keys in order.
    pub fn roots(&self) -> &[DataKey] {
        &self.roots
    }

    /// Number of ingested nodes.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: DataKey) -> Option<&DataRecord<T>> {
        self.records.get(&key)
    }

    pub fn payload(&self, key: DataKey) -> Option<&T> {
        self.records.get(&key).map(|r| &r.payload)
    }

    pub(crate) fn payload_mut(&mut self, key: DataKey) -> Option<&mut T> {
        self.records.get_mut(&key).map(|r| &mut r.payload)
    }

    /// Child keys of a node (empty for leaves and unknown keys).
    pub fn children(&self, key: DataKey) -> &[DataKey] {
        self.records
            .get(&key)
            .and_then(|r| r.children.as_deref())
            .unwrap_or(&[])
    }

    pub fn has_children(&self, key: DataKey) -> bool {
        !self.children(key).is_empty()
    }

    pub fn parent(&self, key: DataKey) -> Option<DataKey> {
        self.records.get(&key).and_then(|r| r.parent)
    }

    /// Ancestors of a node, root first.
    pub fn ancestors(&self, key: DataKey) -> Vec<DataKey> {
        let mut path = Vec::new();
        let mut current = self.parent(key);
        while let Some(ancestor) = current {
            path.push(ancestor);
            current = self.parent(ancestor);
        }
        path.reverse();
        path
    }

    /// The id last recorded for a node. May be stale; the tree validates it
    /// against its index before use.
    pub(crate) fn node_id(&self, key: DataKey) -> Option<NodeId> {
        self.records.get(&key).and_then(|r| r.node_id)
    }

    pub(crate) fn set_node_id(&mut self, key: DataKey, id: NodeId) {
        if let Some(record) = self.records.get_mut(&key) {
            record.node_id = Some(id);
        }
    }

    pub(crate) fn clear_node_ids(&mut self) {
        for record in self.records.values_mut() {
            record.node_id = None;
        }
    }

    /// Replace all data with a new forest. Returns the new root keys.
    pub(crate) fn replace(&mut self, roots: Vec<DataNode<T>>) -> Vec<DataKey> {
        self.records.clear();
        let keys: Vec<DataKey> = roots
            .into_iter()
            .map(|node| self.ingest(node, None))
            .collect();
        self.roots = keys.clone();
        keys
    }

    /// Append children to a node's children sequence. Returns the new keys.
    pub(crate) fn append_children(
        &mut self,
        parent: DataKey,
        nodes: Vec<DataNode<T>>,
    ) -> Vec<DataKey> {
        if !self.records.contains_key(&parent) {
            return Vec::new();
        }
        let keys: Vec<DataKey> = nodes
            .into_iter()
            .map(|node| self.ingest(node, Some(parent)))
            .collect();
        if let Some(record) = self.records.get_mut(&parent) {
            record
                .children
                .get_or_insert_with(Vec::new)
                .extend(keys.iter().copied());
        }
        keys
    }

    /// Remove a node and its descendants. Returns the removed keys in
    /// depth-first order.
    pub(crate) fn remove_subtree(&mut self, key: DataKey) -> Vec<DataKey> {
        let Some(parent) = self.records.get(&key).map(|r| r.parent) else {
            return Vec::new();
        };
        match parent {
            Some(parent) => {
                if let Some(children) = self
                    .records
                    .get_mut(&parent)
                    .and_then(|p| p.children.as_mut())
                {
                    children.retain(|k| *k != key);
                }
            }
            None => self.roots.retain(|k| *k != key),
        }

        let mut removed = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(record) = self.records.remove(&current) {
                removed.push(current);
                if let Some(children) = record.children {
                    stack.extend(children.into_iter().rev());
                }
            }
        }
        removed
    }

    fn ingest(&mut self, node: DataNode<T>, parent: Option<DataKey>) -> DataKey {
        let key = DataKey(self.next_key);
        self.next_key += 1;
        let DataNode {
            data,
            children,
            collapsed,
        } = node;
        self.records.insert(
            key,
            DataRecord {
                payload: data,
                children: None,
                parent,
                collapsed,
                node_id: None,
            },
        );
        if let Some(children) = children {
            let keys: Vec<DataKey> = children
                .into_iter()
                .map(|child| self.ingest(child, Some(key)))
                .collect();
            if let Some(record) = self.records.get_mut(&key) {
                record.children = Some(keys);
            }
        }
        key
    }
}

impl<T: Clone> DataStore<T> {
    /// Rebuild the caller-facing node for a subtree.
    pub fn extract(&self, key: DataKey) -> Option<DataNode<T>> {
        let record = self.records.get(&key)?;
        let children = record
            .children
            .as_ref()
            .map(|keys| keys.iter().filter_map(|k| self.extract(*k)).collect());
        Some(DataNode {
            data: record.payload.clone(),
            children,
            collapsed: record.collapsed,
        })
    }
}
