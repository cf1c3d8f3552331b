//! Data tree: the caller-facing node schema and the arena it is ingested into.

mod node;
mod store;

pub use node::{DataNode, NodeContent, Record};
pub use store::{DataRecord, DataStore};
