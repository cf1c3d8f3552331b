//! Prelude module for convenient imports.
//!
//! ```ignore
//! use arbor::prelude::*;
//! ```

pub use crate::data::{DataNode, NodeContent, Record};
pub use crate::error::{KeymapError, TreeError};
pub use crate::events::{EventResult, TreeEvent};
pub use crate::filter::Traverse;
pub use crate::hooks::{HookNode, HookOutcome, Hooks};
pub use crate::id::{DataKey, NodeId, NodeRef, TreeInstanceId};
pub use crate::keymap::{Key, KeyCombo, KeyMap, Modifiers, TreeAction};
pub use crate::options::{LabelField, TreeOptions, TreeSettings};
pub use crate::tree::{ClickTarget, ExpandOptions, SelectOptions, Transition, TreeView};
