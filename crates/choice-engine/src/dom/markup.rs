//! Small HTML-subset reader for building fixtures.
//!
//! Understands open/close tags, `<br>` and other void elements, the
//! `contenteditable` attribute and HTML entities. A `|` outside a tag marks a
//! selection boundary. Markers resolve the way a browser resolves a range
//! placed around a marker element that is then removed and the parent
//! normalized: inside a text run they land in the text node, at either edge of
//! a run (or between elements) they land on the parent with a child index.
//!
//! ```
//! use choice_engine::dom::{markup, Dom};
//!
//! let fixture = markup::parse("<p>Mil|k</p>").unwrap();
//! let p = fixture.tree.first_child(fixture.root).unwrap();
//! let text = fixture.tree.first_child(p).unwrap();
//! assert_eq!(fixture.markers[0].node, text);
//! assert_eq!(fixture.markers[0].offset, 3);
//! ```
//!
//! Unclosed elements are closed at the end of input, and a close tag
//! implicitly closes anything opened inside the matching element.

use thiserror::Error;

use crate::dom::{Dom, NodeData, NodeId, Tree, text_len};
use crate::host::{LiveSelection, MemoryHost};
use crate::position::Boundary;

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "wbr"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unterminated tag starting at byte {position}")]
    UnterminatedTag { position: usize },

    #[error("Empty tag name at byte {position}")]
    EmptyTag { position: usize },

    #[error("Closing tag </{tag}> at byte {position} has no matching open element")]
    UnexpectedClose { tag: String, position: usize },
}

/// A parsed tree together with the boundaries its `|` markers resolved to.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub tree: Tree,
    /// Editable `div` wrapping the parsed content.
    pub root: NodeId,
    /// Marker boundaries in input order.
    pub markers: Vec<Boundary<NodeId>>,
}

impl Fixture {
    /// The live selection described by the markers: the first marker is the
    /// start, the second (or the first again) the end. `backwards` swaps
    /// anchor and focus. `None` when the input had no markers.
    pub fn live_selection(&self, backwards: bool) -> Option<LiveSelection<NodeId>> {
        let start = *self.markers.first()?;
        let end = self.markers.get(1).copied().unwrap_or(start);
        Some(if backwards {
            LiveSelection::new(end, start)
        } else {
            LiveSelection::new(start, end)
        })
    }

    /// A host with the root focused and the marker selection applied.
    pub fn host(&self, backwards: bool) -> MemoryHost<NodeId> {
        let mut host = MemoryHost::new();
        host.focused = Some(self.root);
        host.selection = self.live_selection(backwards);
        host
    }
}

/// Parses `input` as the content of a fresh editable root.
pub fn parse(input: &str) -> Result<Fixture, MarkupError> {
    let mut tree = Tree::new();
    let root = tree.create_element("div");
    let mut reader = Reader {
        tree,
        stack: vec![root],
        run: TextRun::default(),
        markers: Vec::new(),
    };

    let mut pos = 0;
    while pos < input.len() {
        let rest = &input[pos..];
        if rest.starts_with('<') {
            let end = rest
                .find('>')
                .ok_or(MarkupError::UnterminatedTag { position: pos })?;
            reader.flush_text();
            reader.tag(&rest[1..end], pos)?;
            pos += end + 1;
        } else if rest.starts_with('|') {
            reader.run.mark();
            pos += 1;
        } else {
            let len = rest.find(['<', '|']).unwrap_or(rest.len());
            reader.run.raw.push_str(&rest[..len]);
            pos += len;
        }
    }
    reader.flush_text();

    Ok(Fixture {
        tree: reader.tree,
        root,
        markers: reader.markers,
    })
}

/// Text between two tags, with the decoded offsets of any markers inside it.
#[derive(Debug, Default)]
struct TextRun {
    raw: String,
    decoded: String,
    markers: Vec<usize>,
}

impl TextRun {
    fn settle(&mut self) {
        if !self.raw.is_empty() {
            self.decoded
                .push_str(&html_escape::decode_html_entities(&self.raw));
            self.raw.clear();
        }
    }

    fn mark(&mut self) {
        self.settle();
        self.markers.push(text_len(&self.decoded));
    }
}

struct Reader {
    tree: Tree,
    stack: Vec<NodeId>,
    run: TextRun,
    markers: Vec<Boundary<NodeId>>,
}

impl Reader {
    fn parent(&self) -> NodeId {
        // The root is pushed first and never popped.
        self.stack[self.stack.len() - 1]
    }

    fn flush_text(&mut self) {
        self.run.settle();
        let parent = self.parent();
        let index = self.tree.child_count(parent);
        let text = std::mem::take(&mut self.run.decoded);
        let pending = std::mem::take(&mut self.run.markers);

        if text.is_empty() {
            self.markers
                .extend(pending.iter().map(|_| Boundary::new(parent, index)));
            return;
        }

        let len = text_len(&text);
        let node = self.tree.append_text(parent, text);
        self.markers.extend(pending.into_iter().map(|at| {
            if at == 0 {
                Boundary::new(parent, index)
            } else if at == len {
                Boundary::new(parent, index + 1)
            } else {
                Boundary::new(node, at)
            }
        }));
    }

    fn tag(&mut self, body: &str, position: usize) -> Result<(), MarkupError> {
        let body = body.trim();
        if body.starts_with('!') {
            // Comments and doctypes.
            return Ok(());
        }
        if let Some(name) = body.strip_prefix('/') {
            return self.close(name.trim(), position);
        }

        let self_closing = body.ends_with('/');
        let body = body.trim_end_matches('/');
        let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
        let name = body[..name_end].to_ascii_lowercase();
        if name.is_empty() {
            return Err(MarkupError::EmptyTag { position });
        }

        let parent = self.parent();
        let node = self.tree.append_element(parent, &name);
        let editable = parse_attributes(&body[name_end..])
            .iter()
            .find(|(key, _)| key == "contenteditable")
            .is_none_or(|(_, value)| !value.eq_ignore_ascii_case("false"));
        self.tree.set_editable(node, editable);

        if !self_closing && !VOID_TAGS.contains(&name.as_str()) {
            self.stack.push(node);
        }
        Ok(())
    }

    fn close(&mut self, name: &str, position: usize) -> Result<(), MarkupError> {
        let name = name.to_ascii_lowercase();
        let open = self.stack.iter().rposition(|&node| {
            matches!(self.tree.data(node), NodeData::Element { tag, .. } if *tag == name)
        });
        match open {
            Some(index) if index > 0 => {
                self.stack.truncate(index);
                Ok(())
            }
            _ => Err(MarkupError::UnexpectedClose {
                tag: name,
                position,
            }),
        }
    }
}

fn parse_attributes(mut s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    loop {
        s = s.trim_start();
        if s.is_empty() {
            break;
        }
        let name_end = s
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(s.len());
        let name = s[..name_end].to_ascii_lowercase();
        s = s[name_end..].trim_start();

        let mut value = String::new();
        if let Some(after) = s.strip_prefix('=') {
            let after = after.trim_start();
            let (raw, rest) = match after.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let inner = &after[1..];
                    let close = inner.find(quote).unwrap_or(inner.len());
                    (&inner[..close], inner.get(close + 1..).unwrap_or(""))
                }
                _ => {
                    let end = after.find(char::is_whitespace).unwrap_or(after.len());
                    (&after[..end], &after[end..])
                }
            };
            value = raw.to_string();
            s = rest;
        }
        attrs.push((name, value));
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_markup_round_trips() {
        let input = "<h1>Title</h1><p>Once <strong>upon</strong> a<br>time</p>";
        let fixture = parse(input).unwrap();
        assert_eq!(fixture.tree.inner_markup(fixture.root), input);
        assert!(fixture.markers.is_empty());
        assert!(fixture.live_selection(false).is_none());
    }

    #[test]
    fn marker_inside_text_lands_in_text_node() {
        let fixture = parse("<p>Photo|graph</p>").unwrap();
        let p = fixture.tree.first_child(fixture.root).unwrap();
        let text = fixture.tree.first_child(p).unwrap();
        assert_eq!(fixture.tree.child_count(p), 1);
        assert_eq!(fixture.markers, vec![Boundary::new(text, 5)]);
    }

    #[test]
    fn marker_at_run_edges_lands_on_parent() {
        let fixture = parse("<p>|Things</p><h2>Words|</h2>").unwrap();
        let p = fixture.tree.child_at(fixture.root, 0).unwrap();
        let h2 = fixture.tree.child_at(fixture.root, 1).unwrap();
        assert_eq!(
            fixture.markers,
            vec![Boundary::new(p, 0), Boundary::new(h2, 1)]
        );
    }

    #[test]
    fn marker_between_elements() {
        let fixture = parse("|<p>One</p><p>Two</p>|").unwrap();
        assert_eq!(
            fixture.markers,
            vec![
                Boundary::new(fixture.root, 0),
                Boundary::new(fixture.root, 2)
            ]
        );
    }

    #[test]
    fn marker_next_to_line_break() {
        let fixture = parse("<p>Words|<br>|Stuff</p>").unwrap();
        let p = fixture.tree.first_child(fixture.root).unwrap();
        assert_eq!(
            fixture.markers,
            vec![Boundary::new(p, 1), Boundary::new(p, 2)]
        );
        assert_eq!(
            fixture.tree.kind(fixture.tree.child_at(p, 1).unwrap()),
            NodeKind::LineBreak
        );
    }

    #[test]
    fn two_markers_in_one_run() {
        let fixture = parse("<p>W|he|e</p>").unwrap();
        let p = fixture.tree.first_child(fixture.root).unwrap();
        let text = fixture.tree.first_child(p).unwrap();
        assert_eq!(
            fixture.markers,
            vec![Boundary::new(text, 1), Boundary::new(text, 3)]
        );
    }

    #[test]
    fn backwards_swaps_anchor_and_focus() {
        let fixture = parse("<p>|One</p><p>Two|</p>").unwrap();
        let forward = fixture.live_selection(false).unwrap();
        let backward = fixture.live_selection(true).unwrap();
        assert_eq!(forward.anchor, backward.focus);
        assert_eq!(forward.focus, backward.anchor);
    }

    #[test]
    fn single_marker_is_collapsed() {
        let fixture = parse("<p>A|B</p>").unwrap();
        assert!(fixture.live_selection(false).unwrap().is_collapsed());
    }

    #[test]
    fn entities_are_decoded_before_offsets() {
        let fixture = parse("<p>&lt;a&gt;|b</p>").unwrap();
        let p = fixture.tree.first_child(fixture.root).unwrap();
        let text = fixture.tree.first_child(p).unwrap();
        assert_eq!(fixture.tree.text_content(p), "<a>b");
        assert_eq!(fixture.markers, vec![Boundary::new(text, 3)]);
    }

    #[test]
    fn contenteditable_false_is_recorded() {
        let fixture = parse(r#"<p>a<span contenteditable="false">x</span></p>"#).unwrap();
        let p = fixture.tree.first_child(fixture.root).unwrap();
        let span = fixture.tree.child_at(p, 1).unwrap();
        assert_eq!(
            fixture.tree.kind(span),
            NodeKind::Element {
                tag: "span",
                editable: false
            }
        );
    }

    #[test]
    fn unclosed_elements_close_at_end() {
        let fixture = parse("<h1>Title</h1><p>Once <strong>upon</strong> time").unwrap();
        assert_eq!(
            fixture.tree.inner_markup(fixture.root),
            "<h1>Title</h1><p>Once <strong>upon</strong> time</p>"
        );
    }

    #[test]
    fn close_tag_closes_nested_elements() {
        let fixture = parse("<ul><li>One<li>Two</ul><p>x</p>").unwrap();
        assert_eq!(
            fixture.tree.inner_markup(fixture.root),
            "<ul><li>One<li>Two</li></li></ul><p>x</p>"
        );
    }

    #[test]
    fn errors() {
        assert_eq!(
            parse("<p>oops").map(|_| ()),
            Ok(()),
            "missing close tags are tolerated"
        );
        assert_eq!(
            parse("<p").unwrap_err(),
            MarkupError::UnterminatedTag { position: 0 }
        );
        assert_eq!(
            parse("a</p>").unwrap_err(),
            MarkupError::UnexpectedClose {
                tag: "p".to_string(),
                position: 1
            }
        );
        assert_eq!(parse("<>").unwrap_err(), MarkupError::EmptyTag { position: 0 });
    }

    #[test]
    fn attribute_parsing() {
        assert_eq!(
            parse_attributes(r#" id="s" class='a b' hidden data-x=1"#),
            vec![
                ("id".to_string(), "s".to_string()),
                ("class".to_string(), "a b".to_string()),
                ("hidden".to_string(), String::new()),
                ("data-x".to_string(), "1".to_string()),
            ]
        );
    }
}
