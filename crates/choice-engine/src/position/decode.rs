use log::trace;

use crate::dom::{Dom, is_line_break, is_text_bearing, node_length};
use crate::error::ChoiceError;
use crate::position::Boundary;

/// Decodes a text offset inside `block` into a live boundary.
///
/// Offsets at the seam between two text nodes resolve to the end of the
/// earlier one. An offset sitting on a line break resolves to the parent of
/// the break, just before it. A block without any text or line breaks
/// accepts offset 0 and resolves to its own end.
///
/// The block may itself be a text node or a line break, as the default
/// [`child_blocks`](crate::child_blocks) lists stray text under the root.
///
/// # Errors
///
/// [`ChoiceError::OffsetOutOfRange`] when `offset` is larger than the
/// block's text length, which means the caller paired a stale offset with a
/// reshaped tree.
pub fn decode<D: Dom>(
    dom: &D,
    block: D::Node,
    offset: usize,
) -> Result<Boundary<D::Node>, ChoiceError> {
    let kind = dom.kind(block);
    if is_text_bearing(kind) || is_line_break(kind) {
        return decode_leaf(dom, block, offset);
    }

    let mut remaining = offset;
    let mut current = dom.first_child(block);

    while let Some(node) = current {
        let kind = dom.kind(node);
        if is_line_break(kind) {
            if remaining == 0 {
                let parent = dom.parent(node).unwrap_or(block);
                return Ok(Boundary::new(parent, dom.index_in_parent(node)));
            }
            remaining -= 1;
        } else if is_text_bearing(kind) {
            let len = node_length(dom, node);
            if remaining <= len {
                return Ok(Boundary::new(node, remaining));
            }
            remaining -= len;
        } else if let Some(child) = dom.first_child(node) {
            current = Some(child);
            continue;
        }
        current = next_in_block(dom, block, node);
    }

    if remaining == 0 {
        return Ok(Boundary::new(block, dom.child_count(block)));
    }

    trace!("offset {offset} overruns block {block:?} by {remaining}");
    Err(ChoiceError::OffsetOutOfRange {
        offset,
        length: offset - remaining,
    })
}

/// Decodes inside a block that is a single text node or line break. A line
/// break resolves to its parent, before or after the break.
fn decode_leaf<D: Dom>(
    dom: &D,
    block: D::Node,
    offset: usize,
) -> Result<Boundary<D::Node>, ChoiceError> {
    let length = node_length(dom, block);
    if offset > length {
        trace!("offset {offset} overruns leaf block {block:?} of length {length}");
        return Err(ChoiceError::OffsetOutOfRange { offset, length });
    }

    match dom.parent(block) {
        Some(parent) if is_line_break(dom.kind(block)) => Ok(Boundary::new(
            parent,
            dom.index_in_parent(block) + offset,
        )),
        _ => Ok(Boundary::new(block, offset)),
    }
}

/// Next node in document order after `node`'s subtree, without leaving
/// `block`.
fn next_in_block<D: Dom>(dom: &D, block: D::Node, node: D::Node) -> Option<D::Node> {
    let mut current = node;
    loop {
        if let Some(next) = dom.next_sibling(current) {
            return Some(next);
        }
        let parent = dom.parent(current)?;
        if parent == block {
            return None;
        }
        current = parent;
    }
}
