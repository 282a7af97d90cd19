use thiserror::Error;

use crate::dom::{Dom, NodeKind};

/// Index of a node inside a [`Tree`].
///
/// Ids are only meaningful for the tree that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("cannot append {child:?} under {parent:?}, which is itself or one of its descendants")]
    WouldCycle { parent: NodeId, child: NodeId },
}

/// Owned payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Text(String),
    LineBreak,
    Element { tag: String, editable: bool },
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed tree implementing [`Dom`].
///
/// Nodes are created detached and attached with [`Tree::append`]. Nothing is
/// ever freed; a detached node simply stops being reachable from its old
/// parent.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Slot>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Creates a detached, editable element. The tag is stored lowercase.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        if tag == "br" {
            return self.create_line_break();
        }
        self.push(NodeData::Element {
            tag,
            editable: true,
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_line_break(&mut self) -> NodeId {
        self.push(NodeData::LineBreak)
    }

    /// Marks an element as (not) eligible for text placement. No-op for
    /// text and line-break nodes.
    pub fn set_editable(&mut self, node: NodeId, value: bool) {
        if let NodeData::Element { editable, .. } = &mut self.nodes[node.0].data {
            *editable = value;
        }
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    ///
    /// # Errors
    ///
    /// [`TreeError::WouldCycle`] when `parent` is `child` or lies inside
    /// `child`'s subtree. The tree is left unchanged.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.is_inclusive_ancestor(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }
        self.detach(child);
        self.attach(parent, child);
        Ok(())
    }

    /// Links a detached `child` under `parent`.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Removes `node` from its parent's child list.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Creates an element and appends it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        self.attach(parent, node);
        node
    }

    /// Creates a text node and appends it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let node = self.create_text(text);
        self.attach(parent, node);
        node
    }

    /// Creates a line break and appends it to `parent`.
    pub fn append_line_break(&mut self, parent: NodeId) -> NodeId {
        let node = self.create_line_break();
        self.attach(parent, node);
        node
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    pub fn child_ids(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Concatenated text of all descendant text nodes. Line breaks render as
    /// `\n`.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.data(node) {
            NodeData::Text(text) => out.push_str(text),
            NodeData::LineBreak => out.push('\n'),
            NodeData::Element { .. } => {
                for &child in self.child_ids(node) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Child indices leading from the topmost ancestor down to `node`.
    pub fn path(&self, node: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            path.push(self.index_in_parent(current));
            current = parent;
        }
        path.reverse();
        path
    }

    /// Short human-readable label, e.g. `<p>` or `#text "Milk"`.
    pub fn describe(&self, node: NodeId) -> String {
        match self.data(node) {
            NodeData::Text(text) => format!("#text {text:?}"),
            NodeData::LineBreak => "<br>".to_string(),
            NodeData::Element { tag, .. } => format!("<{tag}>"),
        }
    }

    /// Serializes `node` and its subtree back to markup.
    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    /// Serializes only the children of `node`.
    pub fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.child_ids(node) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        match self.data(node) {
            NodeData::Text(text) => out.push_str(&html_escape::encode_text(text)),
            NodeData::LineBreak => out.push_str("<br>"),
            NodeData::Element { tag, editable } => {
                out.push('<');
                out.push_str(tag);
                if !editable {
                    out.push_str(r#" contenteditable="false""#);
                }
                out.push('>');
                for &child in self.child_ids(node) {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn sibling(&self, node: NodeId, step: isize) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let index = siblings.iter().position(|&c| c == node)?;
        let target = index.checked_add_signed(step)?;
        siblings.get(target).copied()
    }
}

impl Dom for Tree {
    type Node = NodeId;

    fn kind(&self, node: NodeId) -> NodeKind<'_> {
        match self.data(node) {
            NodeData::Text(text) => NodeKind::Text(text),
            NodeData::LineBreak => NodeKind::LineBreak,
            NodeData::Element { tag, editable } => NodeKind::Element {
                tag,
                editable: *editable,
            },
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.child_ids(node).first().copied()
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.child_ids(node).last().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling(node, 1)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling(node, -1)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.child_ids(node).len()
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.child_ids(node).get(index).copied()
    }

    fn index_in_parent(&self, node: NodeId) -> usize {
        self.nodes[node.0]
            .parent
            .and_then(|parent| self.child_ids(parent).iter().position(|&c| c == node))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph() -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.create_element("div");
        let p = tree.append_element(root, "P");
        tree.append_text(p, "One ");
        let strong = tree.append_element(p, "strong");
        tree.append_text(strong, "two");
        tree.append_line_break(p);
        tree.append_text(p, "three");
        (tree, root, p)
    }

    #[test]
    fn tags_are_lowercased() {
        let (tree, _, p) = paragraph();
        assert_eq!(
            tree.kind(p),
            NodeKind::Element {
                tag: "p",
                editable: true
            }
        );
    }

    #[test]
    fn br_element_becomes_line_break() {
        let mut tree = Tree::new();
        let br = tree.create_element("BR");
        assert_eq!(tree.kind(br), NodeKind::LineBreak);
    }

    #[test]
    fn sibling_navigation() {
        let (tree, _, p) = paragraph();
        let first = tree.first_child(p).unwrap();
        let second = tree.next_sibling(first).unwrap();
        assert_eq!(tree.previous_sibling(second), Some(first));
        assert_eq!(tree.previous_sibling(first), None);
        let last = tree.last_child(p).unwrap();
        assert_eq!(tree.next_sibling(last), None);
        assert_eq!(tree.index_in_parent(last), 3);
        assert_eq!(tree.child_count(p), 4);
    }

    #[test]
    fn children_iterator_matches_child_ids() {
        let (tree, _, p) = paragraph();
        let collected: Vec<_> = tree.children(p).collect();
        assert_eq!(collected, tree.child_ids(p));
    }

    #[test]
    fn default_child_at_walks_siblings() {
        // Exercise the trait default through a wrapper that hides the override.
        struct Plain<'a>(&'a Tree);
        impl Dom for Plain<'_> {
            type Node = NodeId;
            fn kind(&self, node: NodeId) -> NodeKind<'_> {
                self.0.kind(node)
            }
            fn parent(&self, node: NodeId) -> Option<NodeId> {
                self.0.parent(node)
            }
            fn first_child(&self, node: NodeId) -> Option<NodeId> {
                self.0.first_child(node)
            }
            fn last_child(&self, node: NodeId) -> Option<NodeId> {
                self.0.last_child(node)
            }
            fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
                self.0.next_sibling(node)
            }
            fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
                self.0.previous_sibling(node)
            }
            fn child_count(&self, node: NodeId) -> usize {
                self.0.child_count(node)
            }
        }

        let (tree, _, p) = paragraph();
        let plain = Plain(&tree);
        for (i, &child) in tree.child_ids(p).iter().enumerate() {
            assert_eq!(plain.child_at(p, i), Some(child));
            assert_eq!(plain.index_in_parent(child), i);
        }
        assert_eq!(plain.child_at(p, 4), None);
    }

    #[test]
    fn append_moves_node_between_parents() {
        let mut tree = Tree::new();
        let a = tree.create_element("p");
        let b = tree.create_element("p");
        let text = tree.append_text(a, "moving");
        tree.append(b, text).unwrap();
        assert!(tree.child_ids(a).is_empty());
        assert_eq!(tree.child_ids(b), &[text]);
        assert_eq!(tree.parent(text), Some(b));
    }

    #[test]
    fn append_under_itself_is_rejected() {
        let mut tree = Tree::new();
        let root = tree.create_element("div");
        let p = tree.append_element(root, "p");

        assert_eq!(
            tree.append(p, p),
            Err(TreeError::WouldCycle { parent: p, child: p })
        );
        assert_eq!(tree.parent(p), Some(root));
        assert_eq!(tree.child_ids(root), &[p]);
        assert!(tree.child_ids(p).is_empty());
    }

    #[test]
    fn append_under_a_descendant_is_rejected() {
        let (mut tree, root, p) = paragraph();
        let strong = tree.child_at(p, 1).unwrap();
        let two = tree.first_child(strong).unwrap();

        assert_eq!(
            tree.append(strong, p),
            Err(TreeError::WouldCycle {
                parent: strong,
                child: p
            })
        );
        assert_eq!(
            tree.append(two, root).unwrap_err(),
            TreeError::WouldCycle {
                parent: two,
                child: root
            }
        );

        // Still a tree: every node reaches the root.
        assert_eq!(tree.parent(p), Some(root));
        assert_eq!(tree.path(two), vec![0, 1, 0]);
        assert_eq!(tree.text_content(root), "One two\nthree");
    }

    #[test]
    fn text_content_renders_breaks_as_newlines() {
        let (tree, root, _) = paragraph();
        assert_eq!(tree.text_content(root), "One two\nthree");
    }

    #[test]
    fn path_lists_child_indices_from_the_top() {
        let (tree, root, p) = paragraph();
        let strong = tree.child_at(p, 1).unwrap();
        let two = tree.first_child(strong).unwrap();
        assert_eq!(tree.path(two), vec![0, 1, 0]);
        assert_eq!(tree.path(p), vec![0]);
        assert!(tree.path(root).is_empty());
    }

    #[test]
    fn to_markup_includes_the_node_itself() {
        let (tree, _, p) = paragraph();
        assert_eq!(tree.to_markup(p), "<p>One <strong>two</strong><br>three</p>");
    }

    #[test]
    fn markup_output_escapes_text_and_marks_non_editable() {
        let mut tree = Tree::new();
        let root = tree.create_element("div");
        let p = tree.append_element(root, "p");
        tree.append_text(p, "Milk & <Honey>");
        let island = tree.append_element(p, "span");
        tree.set_editable(island, false);
        tree.append_line_break(p);

        assert_eq!(
            tree.inner_markup(root),
            r#"<p>Milk &amp; &lt;Honey&gt;<span contenteditable="false"></span><br></p>"#
        );
    }

    #[test]
    fn describe_labels() {
        let (tree, _, p) = paragraph();
        assert_eq!(tree.describe(p), "<p>");
        assert_eq!(tree.describe(tree.first_child(p).unwrap()), "#text \"One \"");
        assert_eq!(tree.describe(tree.child_at(p, 2).unwrap()), "<br>");
    }
}
