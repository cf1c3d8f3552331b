//! In-memory visual tree.
//!
//! This is the boundary to whatever actually draws the tree. Nodes are built
//! off-screen (detached), linked into a subtree, and attached to the live tree
//! in one step so a structural change costs a single layout pass. Hosts read
//! the result through [`VisualTree::lines`] and may hide nodes for their own
//! layout reasons with [`VisualTree::set_hidden`].

/// Handle to a node in the visual tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualId(usize);

/// Leaf or parent styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Leaf,
    Parent,
}

#[derive(Debug, Clone)]
pub struct VisualNode {
    /// Identifier mirrored from the node id (`<instance>_<ordinal>`).
    pub dom_id: String,
    /// Display content produced by the node renderer.
    pub content: String,
    pub kind: VisualKind,
    pub level: usize,
    pub collapsed: bool,
    pub selected: bool,
    pub focused: bool,
    /// Hidden by the host, independent of collapse state.
    pub hidden: bool,
    parent: Option<VisualId>,
    children: Vec<VisualId>,
    attached: bool,
}

/// A visible row, as projected for drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualLine {
    pub id: VisualId,
    pub dom_id: String,
    pub content: String,
    pub kind: VisualKind,
    pub level: usize,
    pub collapsed: bool,
    pub selected: bool,
    pub focused: bool,
}

#[derive(Debug, Default)]
pub struct VisualTree {
    nodes: Vec<Option<VisualNode>>,
    roots: Vec<VisualId>,
    layout_passes: usize,
}

impl VisualTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node.
    pub(crate) fn create(
        &mut self,
        dom_id: String,
        content: String,
        kind: VisualKind,
        level: usize,
        collapsed: bool,
    ) -> VisualId {
        let id = VisualId(self.nodes.len());
        self.nodes.push(Some(VisualNode {
            dom_id,
            content,
            kind,
            level,
            collapsed,
            selected: false,
            focused: false,
            hidden: false,
            parent: None,
            children: Vec::new(),
            attached: false,
        }));
        id
    }

    /// Link a detached child under a detached parent while building off-screen.
    pub(crate) fn append_child(&mut self, parent: VisualId, child: VisualId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Attach built subtrees at the end of `parent`'s children (or as roots).
    /// Counts as one layout pass.
    pub(crate) fn attach(&mut self, parent: Option<VisualId>, subtrees: Vec<VisualId>) {
        if subtrees.is_empty() {
            return;
        }
        for &root in &subtrees {
            if let Some(node) = self.node_mut(root) {
                node.parent = parent;
            }
            self.mark_attached(root);
        }
        match parent {
            Some(parent) => {
                if let Some(node) = self.node_mut(parent) {
                    node.children.extend(subtrees);
                }
            }
            None => self.roots.extend(subtrees),
        }
        self.layout_passes += 1;
    }

    /// Remove a node and its descendants. Returns how many nodes were removed.
    pub(crate) fn detach(&mut self, id: VisualId) -> usize {
        let Some(parent) = self.get(id).map(|n| n.parent) else {
            return 0;
        };
        match parent {
            Some(parent) => {
                if let Some(node) = self.node_mut(parent) {
                    node.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|c| *c != id),
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                removed += 1;
                stack.extend(node.children);
            }
        }
        self.layout_passes += 1;
        removed
    }

    pub fn get(&self, id: VisualId) -> Option<&VisualNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: VisualId) -> Option<&mut VisualNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn roots(&self) -> &[VisualId] {
        &self.roots
    }

    pub fn children(&self, id: VisualId) -> &[VisualId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: VisualId) -> Option<VisualId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of structural attach/detach passes so far.
    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    /// Whether a node is actually on screen: attached, not hidden, and no
    /// ancestor hidden or collapsed.
    pub fn is_rendered(&self, id: VisualId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        if !node.attached || node.hidden {
            return false;
        }
        let mut current = node.parent;
        while let Some(ancestor_id) = current {
            match self.get(ancestor_id) {
                Some(ancestor) if !ancestor.hidden && !ancestor.collapsed => {
                    current = ancestor.parent;
                }
                _ => return false,
            }
        }
        true
    }

    /// Whether the node itself is attached and not hidden, ignoring its
    /// ancestors.
    pub fn is_shown(&self, id: VisualId) -> bool {
        self.get(id).is_some_and(|node| node.attached && !node.hidden)
    }

    /// Hide or show a node for host layout reasons.
    pub fn set_hidden(&mut self, id: VisualId, hidden: bool) {
        if let Some(node) = self.node_mut(id) {
            node.hidden = hidden;
        }
    }

    pub(crate) fn set_collapsed(&mut self, id: VisualId, collapsed: bool) {
        if let Some(node) = self.node_mut(id) {
            node.collapsed = collapsed;
        }
    }

    pub(crate) fn set_selected(&mut self, id: VisualId, selected: bool) {
        if let Some(node) = self.node_mut(id) {
            node.selected = selected;
        }
    }

    pub(crate) fn set_focused(&mut self, id: VisualId, focused: bool) {
        if let Some(node) = self.node_mut(id) {
            node.focused = focused;
        }
    }

    pub(crate) fn set_kind(&mut self, id: VisualId, kind: VisualKind) {
        if let Some(node) = self.node_mut(id) {
            node.kind = kind;
        }
    }

    pub(crate) fn set_dom_id(&mut self, id: VisualId, dom_id: String) {
        if let Some(node) = self.node_mut(id) {
            node.dom_id = dom_id;
        }
    }

    pub(crate) fn set_content(&mut self, id: VisualId, content: String) {
        if let Some(node) = self.node_mut(id) {
            node.content = content;
        }
    }

    /// Rendered rows in document order.
    pub fn lines(&self) -> Vec<VisualLine> {
        let mut out = Vec::new();
        let mut stack: Vec<VisualId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            if node.hidden {
                continue;
            }
            out.push(VisualLine {
                id,
                dom_id: node.dom_id.clone(),
                content: node.content.clone(),
                kind: node.kind,
                level: node.level,
                collapsed: node.collapsed,
                selected: node.selected,
                focused: node.focused,
            });
            if !node.collapsed {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.layout_passes += 1;
    }

    fn mark_attached(&mut self, root: VisualId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node_mut(id) {
                node.attached = true;
                stack.extend(node.children.iter().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (VisualTree, VisualId, VisualId, VisualId) {
        let mut tree = VisualTree::new();
        let root = tree.create("r".into(), "root".into(), VisualKind::Parent, 0, false);
        let a = tree.create("a".into(), "a".into(), VisualKind::Leaf, 1, false);
        let b = tree.create("b".into(), "b".into(), VisualKind::Leaf, 1, false);
        tree.append_child(root, a);
        tree.append_child(root, b);
        (tree, root, a, b)
    }

    #[test]
    fn test_offscreen_build_attaches_in_one_pass() {
        let (mut tree, root, a, _) = build();
        assert!(!tree.is_rendered(a));
        assert_eq!(tree.layout_passes(), 0);
        tree.attach(None, vec![root]);
        assert_eq!(tree.layout_passes(), 1);
        assert!(tree.is_rendered(a));
        assert_eq!(tree.lines().len(), 3);
    }

    #[test]
    fn test_collapsed_and_hidden_ancestors_hide_descendants() {
        let (mut tree, root, a, b) = build();
        tree.attach(None, vec![root]);
        tree.set_collapsed(root, true);
        assert!(tree.is_rendered(root));
        assert!(!tree.is_rendered(a));
        assert_eq!(tree.lines().len(), 1);

        tree.set_collapsed(root, false);
        tree.set_hidden(b, true);
        assert!(!tree.is_rendered(b));
        assert!(tree.is_rendered(a));
        let contents: Vec<String> = tree.lines().into_iter().map(|l| l.content).collect();
        assert_eq!(contents, vec!["root", "a"]);
    }

    #[test]
    fn test_detach_removes_subtree() {
        let (mut tree, root, a, _) = build();
        tree.attach(None, vec![root]);
        assert_eq!(tree.detach(root), 3);
        assert!(tree.get(a).is_none());
        assert!(tree.roots().is_empty());
        assert_eq!(tree.detach(root), 0);
    }
}
