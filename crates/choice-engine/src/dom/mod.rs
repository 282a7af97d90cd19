//! # Tree access
//!
//! The encoder and decoder never own the tree they walk. They read it through
//! the [`Dom`] trait, which exposes just enough navigation to do a
//! document-order walk: parent, first/last child, siblings and indexed child
//! lookup.
//!
//! Every node reports a [`NodeKind`]:
//!
//! - **`Text`**: a leaf carrying literal characters
//! - **`LineBreak`**: a childless forced break (`<br>`), worth one character
//! - **`Element`**: anything structural; may be marked as not editable
//!
//! [`Tree`] is the in-memory implementation used by tests, benches and the
//! CLI. A browser binding would implement [`Dom`] over its own node handles.

pub mod classify;
pub mod markup;
pub mod tree;

pub use classify::{BlockTags, is_line_break, is_text_bearing, node_length, text_len};
pub use markup::{Fixture, MarkupError};
pub use tree::{NodeData, NodeId, Tree, TreeError};

/// Borrowed view of what a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// Text leaf with its character data.
    Text(&'a str),
    /// Forced line break with no children and no text of its own.
    LineBreak,
    /// Structural element.
    Element {
        /// Lowercase tag name.
        tag: &'a str,
        /// False when the element is excluded from text placement
        /// (`contenteditable="false"`).
        editable: bool,
    },
}

/// Read-only navigation over a DOM-like tree.
///
/// `child_at` and `index_in_parent` have default implementations in terms of
/// the sibling links; implementors with indexed child storage should override
/// them.
pub trait Dom {
    /// Handle to a node. Cheap to copy and compare.
    type Node: Copy + Eq + std::fmt::Debug;

    fn kind(&self, node: Self::Node) -> NodeKind<'_>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn child_count(&self, node: Self::Node) -> usize;

    fn child_at(&self, node: Self::Node, index: usize) -> Option<Self::Node> {
        let mut child = self.first_child(node);
        for _ in 0..index {
            child = self.next_sibling(child?);
        }
        child
    }

    /// Position of `node` among its parent's children (0 for a detached node).
    fn index_in_parent(&self, node: Self::Node) -> usize {
        let mut index = 0;
        let mut current = node;
        while let Some(prev) = self.previous_sibling(current) {
            index += 1;
            current = prev;
        }
        index
    }

    /// Iterates over the direct children of `node` in order.
    fn children(&self, node: Self::Node) -> Children<'_, Self>
    where
        Self: Sized,
    {
        Children {
            dom: self,
            next: self.first_child(node),
        }
    }
}

/// Iterator returned by [`Dom::children`].
pub struct Children<'a, D: Dom> {
    dom: &'a D,
    next: Option<D::Node>,
}

impl<D: Dom> Iterator for Children<'_, D> {
    type Item = D::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.dom.next_sibling(current);
        Some(current)
    }
}
