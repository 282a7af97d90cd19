//! Saves and restores a text selection inside an editable tree as
//! `(block index, text offset)` pairs, so the selection survives a re-render
//! that replaces every node.

pub mod blocks;
pub mod choice;
pub mod dom;
pub mod error;
pub mod host;
pub mod position;
pub mod selection;

// Re-export key types for easier usage
pub use blocks::{child_blocks, flatten_lists};
pub use choice::Choice;
pub use dom::{BlockTags, Dom, NodeKind};
pub use error::ChoiceError;
pub use host::{LiveSelection, MemoryHost, RestoreStrategy, SelectionHost};
pub use position::{Boundary, Point, decode, encode};
pub use selection::Selection;
