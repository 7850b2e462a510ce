//! Source text with provenance
//!
//! This crate provides zero-copy views over source code that remember where
//! every character came from. A pipeline can slice, splice and rewrite the
//! text it hands to later stages, and any character of the result still maps
//! back to its file, line and column in the untouched original.
//!
//! # Overview
//!
//! The core types are:
//! - [`Text`]: an immutable, shareable sequence of characters with provenance
//! - [`TextCursor`]: reads a text by index and builds sub-views
//! - [`TextLocation`]: file, line, column and offset in an original file
//! - [`RewriteBuilder`]: builds a rewritten text from retain/delete/insert edits
//! - [`SourceContext`]: registers original files and renders locations
//!
//! Texts form a tree: root texts own the characters of a file, slices and
//! rewrites reference the texts they were built from. Lookups walk down that
//! tree, one step per layer.
//!
//! # Example
//!
//! ```rust
//! use quarto_source_text::*;
//!
//! let mut ctx = SourceContext::new();
//! let root = ctx.add_file("main.c", "int a;\nint b;");
//!
//! // Slice out the second line
//! let line = root.sub_text(7, 13).unwrap();
//! let cursor = line.cursor();
//! assert_eq!(cursor.char_at(4).unwrap(), 'b');
//!
//! let loc = cursor.location(4).unwrap();
//! assert_eq!(ctx.display_location(&loc).unwrap(), "main.c:2:5");
//! ```

pub mod context;
pub mod cursor;
pub mod error;
pub mod line_index;
pub mod rewrite;
pub mod text;
pub mod types;

// Re-export main types
pub use context::{FileMetadata, SourceContext, SourceFile};
pub use cursor::TextCursor;
pub use error::{Result, TextError};
pub use line_index::LineIndex;
pub use rewrite::RewriteBuilder;
pub use text::{Chars, RewrittenText, Segment, SourceText, SubText, Text, TextKind};
pub use types::{FileId, TextLocation};
