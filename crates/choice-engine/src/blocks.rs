//! Block list builders.
//!
//! The encoder only needs an ordered list of block nodes; deciding what a
//! block is belongs to the caller. These are the two usual choices.

use crate::dom::{Dom, NodeKind};

const LIST_CONTAINERS: &[&str] = &["ul", "ol"];
const LIST_ITEM: &str = "li";

/// Every direct child of `root`, text nodes included.
pub fn child_blocks<D: Dom>(dom: &D, root: D::Node) -> Vec<D::Node> {
    dom.children(root).collect()
}

/// Element children of `root`, with each `ul`/`ol` replaced by its list
/// items so every item is its own block. Lists nested inside an item follow
/// that item.
pub fn flatten_lists<D: Dom>(dom: &D, root: D::Node) -> Vec<D::Node> {
    let mut blocks = Vec::new();
    for child in dom.children(root) {
        match dom.kind(child) {
            NodeKind::Element { tag, .. } if LIST_CONTAINERS.contains(&tag) => {
                push_list_items(dom, child, &mut blocks);
            }
            NodeKind::Element { .. } => blocks.push(child),
            NodeKind::Text(_) | NodeKind::LineBreak => {}
        }
    }
    blocks
}

fn push_list_items<D: Dom>(dom: &D, list: D::Node, blocks: &mut Vec<D::Node>) {
    for item in dom.children(list) {
        if !matches!(dom.kind(item), NodeKind::Element { tag, .. } if tag == LIST_ITEM) {
            continue;
        }
        blocks.push(item);
        for nested in dom.children(item) {
            if matches!(dom.kind(nested), NodeKind::Element { tag, .. } if LIST_CONTAINERS.contains(&tag))
            {
                push_list_items(dom, nested, blocks);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Tree, markup};
    use pretty_assertions::assert_eq;

    fn texts(tree: &Tree, blocks: &[crate::dom::NodeId]) -> Vec<String> {
        blocks.iter().map(|&b| tree.text_content(b)).collect()
    }

    #[test]
    fn child_blocks_keeps_every_child() {
        let fixture = markup::parse("<p>A</p>Stray<p>B</p>").unwrap();
        let blocks = child_blocks(&fixture.tree, fixture.root);
        assert_eq!(texts(&fixture.tree, &blocks), vec!["A", "Stray", "B"]);
    }

    #[test]
    fn lists_expand_into_items() {
        let fixture =
            markup::parse("<ol><li>Things</li></ol><p>Para</p><ul><li>One</li><li>Two</li></ul>")
                .unwrap();
        let blocks = flatten_lists(&fixture.tree, fixture.root);
        assert_eq!(
            texts(&fixture.tree, &blocks),
            vec!["Things", "Para", "One", "Two"]
        );
    }

    #[test]
    fn empty_lists_contribute_nothing() {
        let fixture = markup::parse("<ol></ol><ul><li>One</li></ul>").unwrap();
        let blocks = flatten_lists(&fixture.tree, fixture.root);
        assert_eq!(texts(&fixture.tree, &blocks), vec!["One"]);
    }

    #[test]
    fn nested_lists_follow_their_item() {
        let fixture =
            markup::parse("<ul><li>A<ul><li>A1</li></ul></li><li>B</li></ul>").unwrap();
        let blocks = flatten_lists(&fixture.tree, fixture.root);
        assert_eq!(texts(&fixture.tree, &blocks), vec!["AA1", "A1", "B"]);
    }

    #[test]
    fn stray_text_is_not_a_block_when_flattening() {
        let fixture = markup::parse("<p>A</p>Stray<p>B</p>").unwrap();
        let blocks = flatten_lists(&fixture.tree, fixture.root);
        assert_eq!(texts(&fixture.tree, &blocks), vec!["A", "B"]);
    }
}
