#![allow(dead_code)]

use arbor::prelude::*;
use serde_json::{Value, json};

pub const INSTANCE: TreeInstanceId = TreeInstanceId::from_u128(0xA4B0);

/// `root -> [a, b -> [c]]`
pub fn scenario() -> Value {
    json!({
        "label": "root",
        "children": [
            {"label": "a"},
            {"label": "b", "children": [{"label": "c"}]}
        ]
    })
}

/// Two roots with nested children:
/// `x -> [x1 -> [x11, x12], x2]`, `y -> [y1]`
pub fn forest() -> Value {
    json!([
        {"label": "x", "children": [
            {"label": "x1", "children": [{"label": "x11"}, {"label": "x12"}]},
            {"label": "x2"}
        ]},
        {"label": "y", "children": [{"label": "y1"}]}
    ])
}

pub fn options() -> TreeOptions<Record> {
    TreeOptions::new().instance_id(INSTANCE)
}

pub fn loaded(options: TreeOptions<Record>, data: Value) -> TreeView<Record> {
    let mut tree = TreeView::new(options);
    tree.load(DataNode::forest_from_value(data).unwrap());
    tree
}

pub fn label(tree: &TreeView<Record>, key: DataKey) -> String {
    tree.data(key)
        .and_then(|record| record.get("label"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn key(tree: &TreeView<Record>, wanted: &str) -> DataKey {
    let mut found = None;
    tree.traverse(None, |key, record: &Record| {
        if record.get("label").and_then(Value::as_str) == Some(wanted) {
            found = Some(key);
            Traverse::Stop
        } else {
            Traverse::Continue
        }
    });
    found.unwrap_or_else(|| panic!("no node labelled {wanted}"))
}

pub fn id(tree: &TreeView<Record>, wanted: &str) -> NodeId {
    tree.node_id_of(key(tree, wanted))
        .unwrap_or_else(|| panic!("{wanted} is not materialized"))
}

pub fn labels_of(tree: &TreeView<Record>, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|id| label(tree, tree.key_of(*id).unwrap()))
        .collect()
}

pub fn visible(tree: &TreeView<Record>) -> Vec<String> {
    labels_of(tree, &tree.visible_ids())
}

pub fn selected(tree: &TreeView<Record>) -> Vec<String> {
    let mut labels = labels_of(tree, tree.selected());
    labels.sort();
    labels
}

pub fn focused(tree: &TreeView<Record>) -> Option<String> {
    tree.focused_key().map(|key| label(tree, key))
}

/// Every key that is materialized points at an index entry pointing back.
pub fn assert_consistent(tree: &TreeView<Record>) {
    assert!(tree.index().is_contiguous(), "ordinals not contiguous");
    for entry in tree.index().ordered_entries() {
        assert_eq!(tree.node_id_of(entry.data), Some(entry.id));
        let visual = tree.visual().get(entry.visual).expect("visual handle");
        assert_eq!(visual.dom_id, entry.id.to_string());
        if let Some(parent) = entry.parent {
            let parent_entry = tree.entry(parent).expect("parent entry");
            assert_eq!(tree.parent_of(entry.data), Some(parent_entry.data));
            assert_eq!(parent_entry.level + 1, entry.level);
        } else {
            assert_eq!(entry.level, 0);
        }
    }
}
