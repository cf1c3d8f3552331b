mod common;

use arbor::prelude::*;
use common::*;

fn press(tree: &mut TreeView<Record>, key: Key) -> EventResult {
    tree.handle_key(&KeyCombo::key(key))
}

#[test]
fn test_keys_on_empty_tree_are_consumed() {
    let mut tree: TreeView<Record> = TreeView::new(options());
    assert_eq!(press(&mut tree, Key::Down), EventResult::Consumed);
    assert_eq!(press(&mut tree, Key::Space), EventResult::Consumed);
    assert_eq!(tree.next_node(), None);
    assert_eq!(tree.focused(), None);
    assert!(tree.drain_events().is_empty());
}

#[test]
fn test_unbound_key_is_ignored() {
    let mut tree = loaded(options(), scenario());
    assert_eq!(press(&mut tree, Key::Char('q')), EventResult::Ignored);
    assert_eq!(tree.focused(), None);
}

#[test]
fn test_first_move_without_focus_lands_on_first_node() {
    let mut tree = loaded(options(), scenario());
    tree.prev_node();
    assert_eq!(focused(&tree).as_deref(), Some("root"));

    tree.clear();
    tree.render();
    tree.next_node();
    assert_eq!(focused(&tree).as_deref(), Some("root"));
}

#[test]
fn test_movement_clamps_at_both_ends() {
    let mut tree = loaded(options(), scenario());
    press(&mut tree, Key::Home);
    press(&mut tree, Key::Up);
    assert_eq!(focused(&tree).as_deref(), Some("root"));

    press(&mut tree, Key::End);
    assert_eq!(focused(&tree).as_deref(), Some("c"));
    press(&mut tree, Key::Down);
    assert_eq!(focused(&tree).as_deref(), Some("c"));
}

#[test]
fn test_navigation_skips_collapsed_subtrees() {
    let mut tree = loaded(options().initial_expand_level(1), forest());
    assert_eq!(visible(&tree), vec!["x", "x1", "x2", "y", "y1"]);

    let mut path = Vec::new();
    for _ in 0..5 {
        tree.next_node();
        path.push(focused(&tree).unwrap());
    }
    assert_eq!(path, vec!["x", "x1", "x2", "y", "y1"]);
}

#[test]
fn test_visible_ids_match_rendered_lines() {
    let mut tree = loaded(options().initial_expand_level(1), forest());
    tree.expand_node(key(&tree, "x1"), ExpandOptions::default());
    tree.collapse_node(key(&tree, "y"), ExpandOptions::default());

    let lines: Vec<String> = tree
        .visual()
        .lines()
        .into_iter()
        .map(|line| line.dom_id)
        .collect();
    let ids: Vec<String> = tree.visible_ids().iter().map(|id| id.to_string()).collect();
    assert_eq!(lines, ids);
}

#[test]
fn test_hidden_nodes_are_skipped() {
    let mut tree = loaded(options(), forest());
    tree.set_hidden(id(&tree, "x1"), true);
    assert_eq!(visible(&tree), vec!["x", "x2", "y", "y1"]);

    tree.set_focused(id(&tree, "x"));
    tree.next_node();
    assert_eq!(focused(&tree).as_deref(), Some("x2"));

    tree.set_hidden(id(&tree, "x1"), false);
    tree.prev_node();
    assert_eq!(focused(&tree).as_deref(), Some("x12"));
}

#[test]
fn test_next_from_hidden_focus_moves_forward() {
    let mut tree = loaded(options(), forest());
    tree.set_focused(id(&tree, "x2"));
    tree.set_hidden(id(&tree, "x2"), true);
    tree.next_node();
    assert_eq!(focused(&tree).as_deref(), Some("y"));
}

#[test]
fn test_expand_or_descend() {
    let mut tree = loaded(options().initial_expand_level(1), forest());
    tree.set_focused(id(&tree, "x1"));

    press(&mut tree, Key::Right);
    assert_eq!(tree.is_collapsed(key(&tree, "x1")), Some(false));
    assert_eq!(focused(&tree).as_deref(), Some("x1"));

    press(&mut tree, Key::Right);
    assert_eq!(focused(&tree).as_deref(), Some("x11"));

    assert_eq!(tree.expand_or_descend(), None);
    assert_eq!(focused(&tree).as_deref(), Some("x11"));
}

#[test]
fn test_collapse_moves_focus_out_of_hidden_subtree() {
    let mut tree = loaded(options(), forest());
    tree.set_focused(id(&tree, "x12"));

    tree.collapse_node(key(&tree, "x1"), ExpandOptions::default());
    assert_eq!(focused(&tree).as_deref(), Some("x1"));

    tree.collapse_node(key(&tree, "x"), ExpandOptions::default());
    assert_eq!(focused(&tree).as_deref(), Some("x"));
    assert!(tree.is_visible(tree.focused().unwrap()));
}

#[test]
fn test_minus_collapses_focused_node() {
    let mut tree = loaded(options(), scenario());
    tree.set_focused(id(&tree, "b"));
    press(&mut tree, Key::Char('-'));
    assert_eq!(visible(&tree), vec!["root", "a", "b"]);
    press(&mut tree, Key::Char('+'));
    assert_eq!(visible(&tree), vec!["root", "a", "b", "c"]);
    press(&mut tree, Key::Left);
    assert_eq!(tree.is_collapsed(key(&tree, "b")), Some(true));
}

#[test]
fn test_collapse_all_then_expand_all() {
    let mut tree = loaded(options().lazy_render(true).initial_expand_level(1), forest());
    tree.set_focused(id(&tree, "y1"));

    tree.collapse_all();
    assert_eq!(visible(&tree), vec!["x", "y"]);
    assert_eq!(focused(&tree).as_deref(), Some("x"));

    tree.expand_all();
    assert_eq!(
        visible(&tree),
        vec!["x", "x1", "x11", "x12", "x2", "y", "y1"]
    );
    assert_consistent(&tree);
}

#[test]
fn test_focus_events_carry_previous_node() {
    let mut tree = loaded(options(), scenario());
    tree.next_node();
    tree.next_node();
    let events = tree.drain_events();
    let root = NodeRef {
        id: id(&tree, "root"),
        key: key(&tree, "root"),
    };
    let a = NodeRef {
        id: id(&tree, "a"),
        key: key(&tree, "a"),
    };
    assert_eq!(
        events,
        vec![
            TreeEvent::FocusChanged {
                previous: None,
                current: root,
            },
            TreeEvent::FocusChanged {
                previous: Some(root),
                current: a,
            },
        ]
    );
}

#[test]
fn test_focus_alone_does_not_select() {
    let mut tree = loaded(options(), scenario());
    press(&mut tree, Key::Down);
    assert!(tree.selected().is_empty());
}

#[test]
fn test_select_on_navigate() {
    let mut tree = loaded(options().select_on_navigate(true), scenario());
    press(&mut tree, Key::Down);
    press(&mut tree, Key::Down);
    assert_eq!(selected(&tree), vec!["a"]);
    assert_eq!(focused(&tree).as_deref(), Some("a"));
}

#[test]
fn test_focus_follows_renumbering() {
    let mut tree = loaded(options(), forest());
    tree.set_focused(id(&tree, "y1"));
    tree.add_children(
        DataNode::forest_from_value(serde_json::json!([{"label": "x3"}])).unwrap(),
        key(&tree, "x"),
    );
    assert_eq!(focused(&tree).as_deref(), Some("y1"));
    assert_eq!(tree.focused().unwrap().ordinal(), 8);
}
