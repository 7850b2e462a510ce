//! Core value types for source locations

use serde::{Deserialize, Serialize};

/// A unique identifier for a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub usize);

/// A position in an original, untransformed source file
///
/// Lines and columns are 1-based; `offset` is the 0-based character offset
/// from the start of the file. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextLocation {
    /// The file this location belongs to
    pub file: FileId,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    /// Character offset from the start of the file (0-based)
    pub offset: usize,
}

impl TextLocation {
    pub fn new(file: FileId, line: usize, column: usize, offset: usize) -> Self {
        TextLocation {
            file,
            line,
            column,
            offset,
        }
    }

    /// The first position of a file
    pub fn start_of(file: FileId) -> Self {
        TextLocation::new(file, 1, 1, 0)
    }
}

impl std::fmt::Display for TextLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
