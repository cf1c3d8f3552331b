//! Lifecycle hooks.
//!
//! Before-hooks may veto the transition they precede by returning `false`
//! or [`HookOutcome::Veto`]; returning `()` or `true` lets it proceed.
//! After-hooks only observe.

use std::fmt;

use crate::id::{DataKey, NodeId};
use crate::keymap::KeyCombo;

/// Verdict of a before-hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HookOutcome {
    #[default]
    Proceed,
    Veto,
}

impl HookOutcome {
    pub fn is_veto(&self) -> bool {
        matches!(self, HookOutcome::Veto)
    }
}

impl From<()> for HookOutcome {
    fn from(_: ()) -> Self {
        HookOutcome::Proceed
    }
}

impl From<bool> for HookOutcome {
    fn from(proceed: bool) -> Self {
        if proceed {
            HookOutcome::Proceed
        } else {
            HookOutcome::Veto
        }
    }
}

/// The node a hook is invoked for.
#[derive(Debug, Clone, Copy)]
pub struct HookNode<'a, T> {
    /// Current id, `None` when the node is not materialized yet.
    pub id: Option<NodeId>,
    pub key: DataKey,
    pub data: &'a T,
}

type GuardFn<T> = Box<dyn FnMut(&HookNode<'_, T>) -> HookOutcome>;
type ObserverFn<T> = Box<dyn FnMut(&HookNode<'_, T>)>;
type KeyFn<T> = Box<dyn FnMut(Option<&HookNode<'_, T>>, &KeyCombo)>;

/// Set of optional lifecycle hooks, built with chained setters.
///
/// # Example
///
/// ```ignore
/// let hooks = Hooks::new()
///     .before_expand(|node: &HookNode<Record>| node.data.get("locked").is_none())
///     .on_select(|node| log::info!("selected {}", node.key));
/// ```
pub struct Hooks<T> {
    before_select: Option<GuardFn<T>>,
    on_select: Option<ObserverFn<T>>,
    before_expand: Option<GuardFn<T>>,
    on_expand: Option<ObserverFn<T>>,
    before_collapse: Option<GuardFn<T>>,
    on_collapse: Option<ObserverFn<T>>,
    on_click: Option<ObserverFn<T>>,
    on_key_press: Option<KeyFn<T>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            before_select: None,
            on_select: None,
            before_expand: None,
            on_expand: None,
            before_collapse: None,
            on_collapse: None,
            on_click: None,
            on_key_press: None,
        }
    }
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_select", &self.before_select.is_some())
            .field("on_select", &self.on_select.is_some())
            .field("before_expand", &self.before_expand.is_some())
            .field("on_expand", &self.on_expand.is_some())
            .field("before_collapse", &self.before_collapse.is_some())
            .field("on_collapse", &self.on_collapse.is_some())
            .field("on_click", &self.on_click.is_some())
            .field("on_key_press", &self.on_key_press.is_some())
            .finish()
    }
}

fn guard<T, F, R>(mut f: F) -> GuardFn<T>
where
    F: FnMut(&HookNode<'_, T>) -> R + 'static,
    R: Into<HookOutcome>,
{
    Box::new(move |node| f(node).into())
}

impl<T> Hooks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before a node is selected. Can veto.
    pub fn before_select<F, R>(mut self, f: F) -> Self
    where
        F: FnMut(&HookNode<'_, T>) -> R + 'static,
        R: Into<HookOutcome>,
    {
        self.before_select = Some(guard(f));
        self
    }

    pub fn on_select<F>(mut self, f: F) -> Self
    where
        F: FnMut(&HookNode<'_, T>) + 'static,
    {
        self.on_select = Some(Box::new(f));
        self
    }

    /// Runs before a node is expanded. Can veto.
    pub fn before_expand<F, R>(mut self, f: F) -> Self
    where
        F: FnMut(&HookNode<'_, T>) -> R + 'static,
        R: Into<HookOutcome>,
    {
        self.before_expand = Some(guard(f));
        self
    }

    pub fn on_expand<F>(mut self, f: F) -> Self
    where
        F: FnMut(&HookNode<'_, T>) + 'static,
    {
        self.on_expand = Some(Box::new(f));
        self
    }

    /// Runs before a node is collapsed. Can veto.
    pub fn before_collapse<F, R>(mut self, f: F) -> Self
    where
        F: FnMut(&HookNode<'_, T>) -> R + 'static,
        R: Into<HookOutcome>,
    {
        self.before_collapse = Some(guard(f));
        self
    }

    pub fn on_collapse<F>(mut self, f: F) -> Self
    where
        F: FnMut(&HookNode<'_, T>) + 'static,
    {
        self.on_collapse = Some(Box::new(f));
        self
    }

    /// Runs when a node's label is clicked.
    pub fn on_click<F>(mut self, f: F) -> Self
    where
        F: FnMut(&HookNode<'_, T>) + 'static,
    {
        self.on_click = Some(Box::new(f));
        self
    }

    /// Runs after every key offered to the tree, with the focused node.
    pub fn on_key_press<F>(mut self, f: F) -> Self
    where
        F: FnMut(Option<&HookNode<'_, T>>, &KeyCombo) + 'static,
    {
        self.on_key_press = Some(Box::new(f));
        self
    }

    pub(crate) fn run_before_select(&mut self, node: &HookNode<'_, T>) -> HookOutcome {
        self.before_select.as_mut().map_or(HookOutcome::Proceed, |f| f(node))
    }

    pub(crate) fn run_on_select(&mut self, node: &HookNode<'_, T>) {
        if let Some(f) = self.on_select.as_mut() {
            f(node);
        }
    }

    pub(crate) fn run_before_expand(&mut self, node: &HookNode<'_, T>) -> HookOutcome {
        self.before_expand.as_mut().map_or(HookOutcome::Proceed, |f| f(node))
    }

    pub(crate) fn run_on_expand(&mut self, node: &HookNode<'_, T>) {
        if let Some(f) = self.on_expand.as_mut() {
            f(node);
        }
    }

    pub(crate) fn run_before_collapse(&mut self, node: &HookNode<'_, T>) -> HookOutcome {
        self.before_collapse.as_mut().map_or(HookOutcome::Proceed, |f| f(node))
    }

    pub(crate) fn run_on_collapse(&mut self, node: &HookNode<'_, T>) {
        if let Some(f) = self.on_collapse.as_mut() {
            f(node);
        }
    }

    pub(crate) fn run_on_click(&mut self, node: &HookNode<'_, T>) {
        if let Some(f) = self.on_click.as_mut() {
            f(node);
        }
    }

    pub(crate) fn run_on_key_press(&mut self, node: Option<&HookNode<'_, T>>, key: &KeyCombo) {
        if let Some(f) = self.on_key_press.as_mut() {
            f(node, key);
        }
    }
}
