//! State engine for hierarchical tree views.
//!
//! `arbor` keeps a caller's data tree, the visual tree drawn for it and an
//! index of materialized nodes consistent while the tree is expanded,
//! collapsed, navigated, selected and extended at runtime. Drawing and input
//! capture are left to the host: it reads [`visual::VisualTree::lines`],
//! feeds keys to [`tree::TreeView::handle_key`] and drains
//! [`events::TreeEvent`]s.
//!
//! ```ignore
//! use arbor::prelude::*;
//!
//! let mut tree = TreeView::<Record>::new(TreeOptions::new().initial_expand_level(1));
//! tree.load_json(r#"{"label": "root", "children": [{"label": "a"}]}"#)?;
//! tree.handle_key(&KeyCombo::key(Key::Down));
//! ```

pub mod data;
pub mod error;
pub mod events;
pub mod filter;
pub mod hooks;
pub mod id;
pub mod index;
pub mod keymap;
pub mod options;
pub mod prelude;
pub mod selection;
pub mod tree;
pub mod visual;

pub use error::{KeymapError, TreeError};
pub use tree::TreeView;
