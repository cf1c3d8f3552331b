//! Construction options and their serializable settings form.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::NodeContent;
use crate::error::TreeError;
use crate::hooks::Hooks;
use crate::id::TreeInstanceId;
use crate::keymap::{KeyCombo, KeyMap, TreeAction};

/// Nodes at or below this depth start collapsed. High enough to mean
/// "expand everything" for realistic trees.
pub const DEFAULT_INITIAL_EXPAND_LEVEL: usize = 99;

/// Maximum matches shown by a filtered render unless configured otherwise.
pub const DEFAULT_FILTER_LIMIT: usize = 200;

/// Which payload field provides a node's display label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LabelField {
    /// First usable of `label`, `title`, `name`.
    #[default]
    Auto,
    /// One specific field.
    Named(String),
}

impl LabelField {
    const AUTO_FIELDS: [&'static str; 3] = ["label", "title", "name"];

    /// Display label of a payload, falling back to its text form.
    pub fn resolve<T: NodeContent>(&self, payload: &T) -> String {
        let found = match self {
            LabelField::Auto => Self::AUTO_FIELDS
                .iter()
                .find_map(|field| payload.field_text(field)),
            LabelField::Named(field) => payload.field_text(field),
        };
        found.unwrap_or_else(|| payload.text())
    }
}

impl From<&str> for LabelField {
    fn from(field: &str) -> Self {
        if field.eq_ignore_ascii_case("auto") {
            LabelField::Auto
        } else {
            LabelField::Named(field.to_string())
        }
    }
}

/// Turns a payload into the content attached to its visual node.
pub type RenderFn<T> = Box<dyn Fn(&T) -> String>;

/// Behavioural switches of a tree, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreePolicy {
    pub initial_expand_level: usize,
    pub lazy_render: bool,
    pub multi_select: bool,
    pub select_on_navigate: bool,
    pub filter_limit: usize,
}

impl Default for TreePolicy {
    fn default() -> Self {
        Self {
            initial_expand_level: DEFAULT_INITIAL_EXPAND_LEVEL,
            lazy_render: false,
            multi_select: false,
            select_on_navigate: false,
            filter_limit: DEFAULT_FILTER_LIMIT,
        }
    }
}

/// Produces display content for nodes.
pub(crate) struct Renderer<T> {
    label_field: LabelField,
    node_render: Option<RenderFn<T>>,
}

impl<T: NodeContent> Renderer<T> {
    pub(crate) fn render(&self, payload: &T) -> String {
        match &self.node_render {
            Some(render) => render(payload),
            None => self.label_field.resolve(payload),
        }
    }

    /// Label used for matching, independent of custom rendering.
    pub(crate) fn label(&self, payload: &T) -> String {
        self.label_field.resolve(payload)
    }
}

/// Options for a [`TreeView`](crate::tree::TreeView), built with chained
/// setters.
///
/// # Example
///
/// ```ignore
/// let options = TreeOptions::new()
///     .initial_expand_level(1)
///     .lazy_render(true)
///     .multi_select(true)
///     .label_field("title");
/// let tree = TreeView::<Record>::new(options);
/// ```
pub struct TreeOptions<T> {
    pub instance_id: Option<TreeInstanceId>,
    pub policy: TreePolicy,
    pub label_field: LabelField,
    pub keymap: KeyMap,
    node_render: Option<RenderFn<T>>,
    hooks: Hooks<T>,
}

impl<T> Default for TreeOptions<T> {
    fn default() -> Self {
        Self {
            instance_id: None,
            policy: TreePolicy::default(),
            label_field: LabelField::Auto,
            keymap: KeyMap::default(),
            node_render: None,
            hooks: Hooks::default(),
        }
    }
}

impl<T> fmt::Debug for TreeOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeOptions")
            .field("instance_id", &self.instance_id)
            .field("policy", &self.policy)
            .field("label_field", &self.label_field)
            .field("keymap", &self.keymap)
            .field("node_render", &self.node_render.is_some())
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl<T> TreeOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from a settings document, with defaults for unset fields.
    pub fn from_settings(settings: &TreeSettings) -> Result<Self, TreeError> {
        Self::new().apply_settings(settings)
    }

    /// Use a fixed instance id instead of a random one.
    pub fn instance_id(mut self, id: TreeInstanceId) -> Self {
        self.instance_id = Some(id);
        self
    }

    pub fn initial_expand_level(mut self, level: usize) -> Self {
        self.policy.initial_expand_level = level;
        self
    }

    /// Defer materializing collapsed subtrees until they are first expanded.
    pub fn lazy_render(mut self, lazy: bool) -> Self {
        self.policy.lazy_render = lazy;
        self
    }

    pub fn multi_select(mut self, multi: bool) -> Self {
        self.policy.multi_select = multi;
        self
    }

    /// Also select nodes reached by keyboard navigation.
    pub fn select_on_navigate(mut self, select: bool) -> Self {
        self.policy.select_on_navigate = select;
        self
    }

    pub fn filter_limit(mut self, limit: usize) -> Self {
        self.policy.filter_limit = limit;
        self
    }

    pub fn label_field(mut self, field: impl Into<LabelField>) -> Self {
        self.label_field = field.into();
        self
    }

    /// Custom content for each node, replacing label lookup.
    pub fn node_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&T) -> String + 'static,
    {
        self.node_render = Some(Box::new(render));
        self
    }

    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn hooks(mut self, hooks: Hooks<T>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Overlay the fields a settings document sets.
    pub fn apply_settings(mut self, settings: &TreeSettings) -> Result<Self, TreeError> {
        if let Some(level) = settings.initial_expand_level {
            self.policy.initial_expand_level = level;
        }
        if let Some(lazy) = settings.lazy_render {
            self.policy.lazy_render = lazy;
        }
        if let Some(multi) = settings.multi_select {
            self.policy.multi_select = multi;
        }
        if let Some(select) = settings.select_on_navigate {
            self.policy.select_on_navigate = select;
        }
        if let Some(limit) = settings.filter_limit {
            self.policy.filter_limit = limit;
        }
        if let Some(field) = &settings.label_field {
            self.label_field = field.as_str().into();
        }
        for (name, keys) in &settings.keys {
            let action: TreeAction = name.parse()?;
            let combos = keys
                .iter()
                .map(|key| key.parse::<KeyCombo>())
                .collect::<Result<Vec<_>, _>>()?;
            log::debug!("rebinding {action} to {} keys", combos.len());
            self.keymap.rebind(action, combos);
        }
        Ok(self)
    }

    pub(crate) fn into_parts(self) -> (TreeInstanceId, TreePolicy, Renderer<T>, KeyMap, Hooks<T>) {
        let renderer = Renderer {
            label_field: self.label_field,
            node_render: self.node_render,
        };
        (
            self.instance_id.unwrap_or_default(),
            self.policy,
            renderer,
            self.keymap,
            self.hooks,
        )
    }
}

/// Plain-data form of the non-closure options, read from JSON.
///
/// Every field is optional; unset fields keep their defaults. `keys` maps an
/// action name to the full list of keys bound to it.
///
/// ```json
/// {
///   "initial_expand_level": 1,
///   "lazy_render": true,
///   "label_field": "title",
///   "keys": { "next_node": ["Down", "j"], "extend_to_last": ["Shift+End"] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    #[serde(alias = "initialExpandLevel", alias = "initialLevel")]
    pub initial_expand_level: Option<usize>,
    #[serde(alias = "lazyRender")]
    pub lazy_render: Option<bool>,
    #[serde(alias = "multiSelect")]
    pub multi_select: Option<bool>,
    #[serde(alias = "selectOnNavigate")]
    pub select_on_navigate: Option<bool>,
    #[serde(alias = "filterLimit")]
    pub filter_limit: Option<usize>,
    #[serde(alias = "labelField")]
    pub label_field: Option<String>,
    pub keys: BTreeMap<String, Vec<String>>,
}

impl TreeSettings {
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        serde_json::from_str(json).map_err(TreeError::Settings)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::Record;
    use crate::keymap::Key;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_label_field_auto_order() {
        let auto = LabelField::Auto;
        assert_eq!(auto.resolve(&record(json!({"name": "n", "title": "t"}))), "t");
        assert_eq!(auto.resolve(&record(json!({"label": "", "name": "n"}))), "n");
        assert_eq!(auto.resolve(&record(json!({"id": 1}))), r#"{"id":1}"#);
    }

    #[test]
    fn test_label_field_named() {
        let field = LabelField::from("path");
        assert_eq!(field.resolve(&record(json!({"path": "/a", "label": "x"}))), "/a");
        assert_eq!(LabelField::from("AUTO"), LabelField::Auto);
    }

    #[test]
    fn test_settings_apply() {
        let settings = TreeSettings::from_json(
            r#"{"initialLevel": 2, "lazy_render": true, "label_field": "title",
                "keys": {"nextNode": ["j", "Down"]}}"#,
        )
        .unwrap();
        let options = TreeOptions::<Record>::from_settings(&settings).unwrap();
        assert_eq!(options.policy.initial_expand_level, 2);
        assert!(options.policy.lazy_render);
        assert!(!options.policy.multi_select);
        assert_eq!(options.label_field, LabelField::Named("title".into()));
        assert_eq!(
            options.keymap.action_for(&Key::Char('j').into()),
            Some(TreeAction::NextNode)
        );
    }

    #[test]
    fn test_settings_errors() {
        assert!(matches!(
            TreeSettings::from_json("[1, 2]"),
            Err(TreeError::Settings(_))
        ));
        let settings = TreeSettings {
            keys: BTreeMap::from([("next_node".to_string(), vec!["Hyper+X".to_string()])]),
            ..Default::default()
        };
        assert!(matches!(
            TreeOptions::<Record>::from_settings(&settings),
            Err(TreeError::Keymap(_))
        ));
    }
}
