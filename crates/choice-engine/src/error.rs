use thiserror::Error;

/// Contract violations reported by [`crate::Choice`] and [`crate::position::decode`].
///
/// A boundary outside the root is not an error: encoding just yields `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("Choice requires an editable root element")]
    NotEditable,

    #[error("Block index {index} is out of range ({len} blocks)")]
    BlockOutOfRange { index: usize, len: usize },

    #[error("Offset {offset} is past the end of a block with {length} characters")]
    OffsetOutOfRange { offset: usize, length: usize },
}
