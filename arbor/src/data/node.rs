//! Caller-facing data node schema.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TreeError;

/// A JSON object used as node payload when data comes from JSON.
pub type Record = serde_json::Map<String, Value>;

/// One node of the caller's data tree.
///
/// A node with a non-empty `children` sequence is a parent node, anything else
/// is a leaf. When decoded from JSON, a `children` field that is not an array
/// is treated as absent.
///
/// # Example
///
/// ```ignore
/// let tree = DataNode::parent(
///     "root".to_string(),
///     vec![DataNode::leaf("a".to_string()), DataNode::leaf("b".to_string())],
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub struct DataNode<T> {
    /// Caller payload.
    #[serde(flatten)]
    pub data: T,
    /// Ordered children, if any.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_children"
    )]
    pub children: Option<Vec<DataNode<T>>>,
    /// Start collapsed regardless of the initial expand level.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
}

impl<T> DataNode<T> {
    /// Create a leaf node.
    pub fn leaf(data: T) -> Self {
        Self {
            data,
            children: None,
            collapsed: false,
        }
    }

    /// Create a node with children.
    pub fn parent(data: T, children: Vec<DataNode<T>>) -> Self {
        Self {
            data,
            children: Some(children),
            collapsed: false,
        }
    }

    /// Mark the node as initially collapsed.
    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Append a child.
    pub fn child(mut self, child: DataNode<T>) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Whether the node has at least one child.
    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

impl<T: DeserializeOwned> DataNode<T> {
    /// Decode a JSON document holding either one node or an array of roots.
    pub fn forest_from_json(json: &str) -> Result<Vec<Self>, TreeError> {
        let value: Value = serde_json::from_str(json).map_err(TreeError::Parse)?;
        Self::forest_from_value(value)
    }

    /// Decode a JSON value holding either one node or an array of roots.
    pub fn forest_from_value(value: Value) -> Result<Vec<Self>, TreeError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(TreeError::Parse))
                .collect(),
            other => Ok(vec![serde_json::from_value(other).map_err(TreeError::Parse)?]),
        }
    }
}

fn lenient_children<'de, D, T>(deserializer: D) -> Result<Option<Vec<DataNode<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        other => {
            log::debug!("ignoring non-sequence children field: {other}");
            Ok(None)
        }
    }
}

/// Payloads that can be turned into display text.
///
/// `field_text` backs [`LabelField`](crate::options::LabelField) lookups;
/// `text` is the fallback when no label field yields a value.
pub trait NodeContent {
    /// Display text of a named field, if the payload has a usable one.
    fn field_text(&self, _name: &str) -> Option<String> {
        None
    }

    /// Text form of the whole payload.
    fn text(&self) -> String;
}

impl NodeContent for Record {
    fn field_text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }

    fn text(&self) -> String {
        Value::Object(self.clone()).to_string()
    }
}

impl NodeContent for Value {
    fn field_text(&self, name: &str) -> Option<String> {
        match self {
            Value::Object(map) => map.field_text(name),
            _ => None,
        }
    }

    fn text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl NodeContent for String {
    fn text(&self) -> String {
        self.clone()
    }
}
