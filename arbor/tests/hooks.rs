mod common;

use std::cell::RefCell;
use std::rc::Rc;

use arbor::prelude::*;
use common::*;
use serde_json::Value;

type Log = Rc<RefCell<Vec<String>>>;

fn text(node: &HookNode<'_, Record>) -> String {
    node.data
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Hooks that record every call and veto nothing.
fn recording(log: &Log) -> Hooks<Record> {
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    Hooks::new()
        .before_expand(move |node: &HookNode<'_, Record>| {
            a.borrow_mut().push(format!("before_expand {}", text(node)));
        })
        .on_expand(move |node: &HookNode<'_, Record>| {
            b.borrow_mut().push(format!("on_expand {}", text(node)));
        })
        .before_collapse(move |node: &HookNode<'_, Record>| {
            c.borrow_mut().push(format!("before_collapse {}", text(node)));
        })
        .on_collapse(move |node: &HookNode<'_, Record>| {
            d.borrow_mut().push(format!("on_collapse {}", text(node)));
        })
}

#[test]
fn test_before_expand_veto_keeps_node_collapsed() {
    let hooks = Hooks::new().before_expand(|node: &HookNode<'_, Record>| {
        if text(node) == "b" {
            HookOutcome::Veto
        } else {
            HookOutcome::Proceed
        }
    });
    let mut tree = loaded(options().initial_expand_level(1).hooks(hooks), scenario());
    let b = key(&tree, "b");

    assert_eq!(tree.expand_node(b, ExpandOptions::default()), Transition::Vetoed);
    assert_eq!(tree.is_collapsed(b), Some(true));
    assert!(tree.drain_events().is_empty());
    assert_eq!(visible(&tree), vec!["root", "a", "b"]);
}

#[test]
fn test_before_collapse_veto() {
    let hooks = Hooks::new().before_collapse(|_: &HookNode<'_, Record>| false);
    let mut tree = loaded(options().hooks(hooks), scenario());
    let b = key(&tree, "b");

    assert_eq!(tree.toggle_node(b, ExpandOptions::default()), Transition::Vetoed);
    assert_eq!(tree.is_collapsed(b), Some(false));
}

#[test]
fn test_vetoed_lazy_expand_loads_nothing() {
    let hooks = Hooks::new().before_expand(|_: &HookNode<'_, Record>| false);
    let mut tree = loaded(options().initial_expand_level(0).lazy_render(true).hooks(hooks), scenario());
    tree.expand_node(key(&tree, "root"), ExpandOptions::default());
    assert_eq!(tree.index().len(), 1);
}

#[test]
fn test_expand_and_collapse_event_order() {
    let log = Log::default();
    let mut tree = loaded(options().initial_expand_level(1).hooks(recording(&log)), scenario());
    let b = key(&tree, "b");
    let node = NodeRef {
        id: id(&tree, "b"),
        key: b,
    };

    tree.expand_node(b, ExpandOptions::default());
    tree.collapse_node(b, ExpandOptions::default());
    assert_eq!(
        tree.drain_events(),
        vec![
            TreeEvent::CollapseStateChanged {
                node,
                collapsed: false,
            },
            TreeEvent::NodeExpanded(node),
            TreeEvent::CollapseStateChanged {
                node,
                collapsed: true,
            },
            TreeEvent::NodeCollapsed(node),
        ]
    );
    assert_eq!(
        *log.borrow(),
        vec!["before_expand b", "on_expand b", "before_collapse b", "on_collapse b"]
    );
}

#[test]
fn test_suppressed_transitions_skip_hooks_and_events() {
    let log = Log::default();
    let mut tree = loaded(options().hooks(recording(&log)), scenario());
    let b = key(&tree, "b");

    assert!(tree.collapse_node(b, ExpandOptions::silent()).is_applied());
    assert!(tree.expand_node(b, ExpandOptions::silent()).is_applied());
    assert!(tree.drain_events().is_empty());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_noop_transitions_do_not_call_hooks() {
    let log = Log::default();
    let mut tree = loaded(options().hooks(recording(&log)), scenario());

    assert_eq!(
        tree.expand_node(key(&tree, "b"), ExpandOptions::default()),
        Transition::Unchanged
    );
    assert_eq!(
        tree.collapse_node(key(&tree, "a"), ExpandOptions::default()),
        Transition::Unchanged
    );
    assert!(log.borrow().is_empty());
}

#[test]
fn test_recursive_expand_fires_per_node() {
    let log = Log::default();
    let mut tree = loaded(
        options().initial_expand_level(0).lazy_render(true).hooks(recording(&log)),
        forest(),
    );
    tree.expand_node(key(&tree, "x"), ExpandOptions::recursive());
    assert_eq!(
        *log.borrow(),
        vec!["before_expand x", "before_expand x1", "on_expand x1", "on_expand x"]
    );
    assert_eq!(visible(&tree), vec!["x", "x1", "x11", "x12", "x2", "y"]);
}

#[test]
fn test_reveal_expands_ancestors_despite_veto() {
    let hooks = Hooks::new().before_expand(|_: &HookNode<'_, Record>| false);
    let mut tree = loaded(options().initial_expand_level(0).lazy_render(true).hooks(hooks), scenario());

    let c = key(&tree, "c");
    assert!(tree.select_by_data(c, SelectOptions::default()).is_applied());
    assert_eq!(visible(&tree), vec!["root", "a", "b", "c"]);
    assert!(tree.is_selected(c));
}

#[test]
fn test_before_select_sees_unmaterialized_node() {
    let seen: Rc<RefCell<Vec<Option<NodeId>>>> = Rc::default();
    let log = seen.clone();
    let hooks = Hooks::new().before_select(move |node: &HookNode<'_, Record>| {
        log.borrow_mut().push(node.id);
    });
    let mut tree = loaded(options().initial_expand_level(0).lazy_render(true).hooks(hooks), scenario());

    tree.select_by_data(key(&tree, "c"), SelectOptions::default());
    assert_eq!(*seen.borrow(), vec![None]);
}

#[test]
fn test_key_press_hook_sees_every_key() {
    let keys: Rc<RefCell<Vec<(Option<DataKey>, String)>>> = Rc::default();
    let log = keys.clone();
    let hooks = Hooks::new().on_key_press(move |node: Option<&HookNode<'_, Record>>, key: &KeyCombo| {
        log.borrow_mut().push((node.map(|n| n.key), key.to_string()));
    });
    let mut tree = loaded(options().hooks(hooks), scenario());

    tree.handle_key(&KeyCombo::key(Key::Char('z')));
    tree.handle_key(&KeyCombo::key(Key::Down));
    tree.handle_key(&KeyCombo::key(Key::F(2)));

    let root = key(&tree, "root");
    assert_eq!(
        *keys.borrow(),
        vec![
            (None, "z".to_string()),
            (Some(root), "Down".to_string()),
            (Some(root), "F2".to_string()),
        ]
    );
}

#[test]
fn test_unsupported_key_is_ignored_without_hooks() {
    let keys: Rc<RefCell<Vec<String>>> = Rc::default();
    let log = keys.clone();
    let hooks = Hooks::new().on_key_press(move |_: Option<&HookNode<'_, Record>>, key: &KeyCombo| {
        log.borrow_mut().push(key.to_string());
    });
    let mut tree = loaded(options().hooks(hooks), scenario());
    tree.set_focused(id(&tree, "root"));

    let result = tree.handle_key(&KeyCombo::key(Key::Unsupported));
    assert_eq!(result, EventResult::Ignored);
    assert_eq!(result, tree.handle_key(&KeyCombo::key(Key::Unsupported).ctrl()));
    assert!(keys.borrow().is_empty());
    assert_eq!(focused(&tree).as_deref(), Some("root"));

    assert_eq!(tree.handle_key(&KeyCombo::key(Key::Down)), EventResult::Consumed);
    assert_eq!(*keys.borrow(), vec!["Down".to_string()]);
}

#[test]
fn test_click_hook_only_for_labels() {
    let clicks: Rc<RefCell<Vec<DataKey>>> = Rc::default();
    let log = clicks.clone();
    let hooks = Hooks::new().on_click(move |node: &HookNode<'_, Record>| {
        log.borrow_mut().push(node.key);
    });
    let mut tree = loaded(options().hooks(hooks), scenario());

    tree.click(id(&tree, "b"), ClickTarget::Expander, Modifiers::NONE);
    tree.click(id(&tree, "a"), ClickTarget::Label, Modifiers::NONE);
    assert_eq!(*clicks.borrow(), vec![key(&tree, "a")]);
    assert_eq!(focused(&tree).as_deref(), Some("a"));
}

#[test]
fn test_set_hooks_replaces_all() {
    let mut tree = loaded(options(), scenario());
    tree.set_hooks(Hooks::new().before_select(|_: &HookNode<'_, Record>| false));
    assert_eq!(tree.set_selected(id(&tree, "a"), false), Transition::Vetoed);
    tree.set_hooks(Hooks::new());
    assert_eq!(tree.set_selected(id(&tree, "a"), false), Transition::Applied);
}
