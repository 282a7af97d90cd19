use std::collections::BTreeSet;

use crate::dom::{Dom, NodeKind};

/// Tags treated as visual blocks unless the caller says otherwise.
///
/// The HTML block-level element list, plus `li` so that list items stop the
/// upward block search on their own.
pub const DEFAULT_BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "audio",
    "blockquote",
    "canvas",
    "dd",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "nav",
    "noscript",
    "ol",
    "output",
    "p",
    "pre",
    "section",
    "table",
    "tfoot",
    "ul",
    "video",
    "li",
];

/// Length of a text run in UTF-16 code units, the unit host selection
/// offsets are measured in.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn is_text_bearing(kind: NodeKind<'_>) -> bool {
    matches!(kind, NodeKind::Text(_))
}

pub fn is_line_break(kind: NodeKind<'_>) -> bool {
    matches!(kind, NodeKind::LineBreak)
}

/// The offset that places a boundary at the very end of `node`: its text
/// length, 1 for a line break, otherwise its child count.
pub fn node_length<D: Dom>(dom: &D, node: D::Node) -> usize {
    match dom.kind(node) {
        NodeKind::Text(text) => text_len(text),
        NodeKind::LineBreak => 1,
        NodeKind::Element { .. } => dom.child_count(node),
    }
}

/// Set of element tags that count as block boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTags {
    tags: BTreeSet<String>,
}

impl Default for BlockTags {
    fn default() -> Self {
        Self::from_tags(DEFAULT_BLOCK_TAGS.iter().copied())
    }
}

impl BlockTags {
    /// A set containing exactly `tags` (case-insensitive).
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// The default set extended with `extra`.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags = Self::default();
        for tag in extra {
            tags.insert(tag.as_ref());
        }
        tags
    }

    pub fn insert(&mut self, tag: &str) {
        self.tags.insert(tag.to_ascii_lowercase());
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    pub fn is_block_boundary(&self, kind: NodeKind<'_>) -> bool {
        match kind {
            NodeKind::Element { tag, .. } => self.contains(tag),
            NodeKind::Text(_) | NodeKind::LineBreak => false,
        }
    }
}
