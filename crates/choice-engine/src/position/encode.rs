use log::trace;

use crate::dom::{BlockTags, Dom, NodeKind, is_line_break, is_text_bearing, node_length};
use crate::position::Point;

/// Where the descent from a live boundary ended up.
#[derive(Debug)]
struct Leaf<N> {
    node: N,
    offset: usize,
    /// The leaf is a line break reached by stepping into a last child, so the
    /// boundary sits after it.
    after_break: bool,
}

/// Encodes a live `(node, offset)` boundary as a [`Point`].
///
/// `blocks` is the caller's ordered block list. Returns `None` when the
/// boundary does not sit inside any of them (for example a selection in a
/// sibling editor, or stray text directly under the root).
pub fn encode<D: Dom>(
    dom: &D,
    tags: &BlockTags,
    blocks: &[D::Node],
    node: D::Node,
    offset: usize,
) -> Option<Point> {
    let leaf = descend(dom, node, offset);

    let Some((index, block)) = owning_block(dom, tags, blocks, leaf.node) else {
        trace!("boundary {node:?}@{offset} is outside every block");
        return None;
    };

    let mut offset = text_before(dom, block, leaf.node) + leaf.offset;

    // A trailing <br> renders no line of its own, so the end of the block is
    // the position before it.
    if leaf.after_break && is_last_in_block(dom, block, leaf.node) {
        offset -= 1;
    }

    Some(Point::new(index, offset))
}

/// Resolves a boundary on a structural node down to a text node, a line break
/// or an empty element.
fn descend<D: Dom>(dom: &D, mut node: D::Node, mut offset: usize) -> Leaf<D::Node> {
    let mut after_break = false;

    while let NodeKind::Element { editable, .. } = dom.kind(node) {
        if !editable {
            match dom.next_sibling(node) {
                Some(next) => {
                    node = next;
                    offset = 0;
                    continue;
                }
                None => {
                    offset = 0;
                    break;
                }
            }
        }

        if let Some(child) = dom.child_at(node, offset) {
            node = child;
            offset = 0;
            continue;
        }

        let Some(last) = dom.last_child(node) else {
            offset = 0;
            break;
        };
        offset = node_length(dom, last);
        after_break = is_line_break(dom.kind(last));
        node = last;
    }

    Leaf {
        node,
        offset,
        after_break,
    }
}

/// Nearest ancestor-or-self that is a block boundary or a listed block,
/// together with its index in `blocks`.
fn owning_block<D: Dom>(
    dom: &D,
    tags: &BlockTags,
    blocks: &[D::Node],
    leaf: D::Node,
) -> Option<(usize, D::Node)> {
    let mut current = Some(leaf);
    while let Some(node) = current {
        if let Some(index) = blocks.iter().position(|&block| block == node) {
            return Some((index, node));
        }
        if tags.is_block_boundary(dom.kind(node)) {
            return None;
        }
        current = dom.parent(node);
    }
    None
}

/// Text length of everything before `node` inside `block`, in document order.
fn text_before<D: Dom>(dom: &D, block: D::Node, node: D::Node) -> usize {
    let mut length = 0;
    let mut current = node;

    while current != block {
        let Some(prev) = dom.previous_sibling(current) else {
            match dom.parent(current) {
                Some(parent) => {
                    current = parent;
                    continue;
                }
                None => break,
            }
        };

        current = prev;
        while let Some(last) = last_child_of_element(dom, current) {
            current = last;
        }

        let kind = dom.kind(current);
        if is_text_bearing(kind) || is_line_break(kind) {
            length += node_length(dom, current);
        }
    }

    length
}

fn last_child_of_element<D: Dom>(dom: &D, node: D::Node) -> Option<D::Node> {
    let kind = dom.kind(node);
    if is_text_bearing(kind) || is_line_break(kind) {
        return None;
    }
    dom.last_child(node)
}

/// True when nothing follows `node` inside `block`.
fn is_last_in_block<D: Dom>(dom: &D, block: D::Node, node: D::Node) -> bool {
    let mut current = node;
    while current != block {
        if dom.next_sibling(current).is_some() {
            return false;
        }
        match dom.parent(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    true
}
