//! # Position encoding
//!
//! Two walks that must agree on how text is measured:
//!
//! - [`encode`] turns a live `(node, offset)` boundary into a [`Point`]
//!   (block index + text offset within that block)
//! - [`decode`] turns a block and a text offset back into a live boundary
//!
//! Text is measured in UTF-16 code units and every line break counts as one
//! character, so a block's text offset reads like an index into its
//! `innerText` with `\n` for each `<br>`.

mod decode;
mod encode;

pub use decode::decode;
pub use encode::encode;

use serde::{Deserialize, Serialize};

/// A block index plus a text offset inside that block.
///
/// Ordering is document order: block first, then offset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

impl From<(usize, usize)> for Point {
    fn from((block, offset): (usize, usize)) -> Self {
        Self::new(block, offset)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.block, self.offset)
    }
}

/// A live position as the host selection API reports it.
///
/// For a text node `offset` is a character index into it; for anything else
/// it is a child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> Boundary<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}
