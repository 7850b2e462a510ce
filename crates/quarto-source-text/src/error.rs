//! Error types for text views

use thiserror::Error;

use crate::types::FileId;

/// Errors raised while building or reading text views
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// A view was requested with `start > end` or a bound past the end of
    /// the source text. Raised when the view is built, never clamped.
    #[error("Invalid range {start}..{end} for text of length {length}")]
    InvalidRange {
        start: usize,
        end: usize,
        length: usize,
    },

    /// A character was requested outside `0..length`.
    #[error("Index {index} out of bounds for text of length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    /// An injection point has no location to inherit (the text it was
    /// inserted into has no characters and no segments).
    #[error("No location available at position {position}")]
    MissingAnchor { position: usize },

    #[error("Unknown file {0:?}")]
    UnknownFile(FileId),
}

impl TextError {
    pub(crate) fn check_range(start: usize, end: usize, length: usize) -> Result<()> {
        if start > end || end > length {
            return Err(TextError::InvalidRange { start, end, length });
        }
        Ok(())
    }

    pub(crate) fn check_index(index: usize, length: usize) -> Result<()> {
        if index >= length {
            return Err(TextError::IndexOutOfBounds { index, length });
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, TextError>;
