//! Building rewritten texts from edits

use crate::error::{Result, TextError};
use crate::text::{Segment, Text};
use crate::types::TextLocation;

/// Builds a rewrite of a base text from a left-to-right sequence of edits
///
/// The builder walks the base text once. `retain` keeps characters with
/// their provenance, `delete` skips them, and `insert` adds characters that
/// exist in no original file. Whatever is left of the base text when the
/// builder finishes is retained.
///
/// Inserted characters report the location of the base character right
/// after the insertion point, or the end-of-text position when inserting at
/// the very end. Use [`RewriteBuilder::insert_at`] to give an insertion an
/// explicit location instead.
///
/// # Example
///
/// ```
/// use quarto_source_text::{FileId, RewriteBuilder, Text};
///
/// let base = Text::from_source(FileId(0), "let x = MAX;");
/// let mut builder = RewriteBuilder::new(base);
/// builder.retain(8).unwrap();
/// builder.replace(3, "255").unwrap();
/// let rewritten = builder.finish().unwrap();
///
/// assert_eq!(rewritten.to_string(), "let x = 255;");
/// // The expansion points at the macro it replaced
/// assert_eq!(rewritten.cursor().location(9).unwrap().column, 9);
/// ```
#[derive(Debug)]
pub struct RewriteBuilder {
    base: Text,
    position: usize,
    segments: Vec<Segment>,
}

impl RewriteBuilder {
    pub fn new(base: Text) -> Self {
        RewriteBuilder {
            base,
            position: 0,
            segments: Vec::new(),
        }
    }

    /// Position in the base text of the next edit
    pub fn position(&self) -> usize {
        self.position
    }

    fn advance(&mut self, count: usize) -> Result<usize> {
        let start = self.position;
        let end = start + count;
        TextError::check_range(start, end, self.base.len())?;
        self.position = end;
        Ok(start)
    }

    /// Keep the next `count` characters of the base text
    pub fn retain(&mut self, count: usize) -> Result<&mut Self> {
        let start = self.advance(count)?;
        self.segments
            .push(Segment::retained(self.base.clone(), start, self.position));
        Ok(self)
    }

    /// Drop the next `count` characters of the base text
    pub fn delete(&mut self, count: usize) -> Result<&mut Self> {
        self.advance(count)?;
        Ok(self)
    }

    /// Insert `literal` at the current position
    pub fn insert(&mut self, literal: &str) -> Result<&mut Self> {
        let location = self
            .base
            .boundary_location(self.position)
            .ok_or(TextError::MissingAnchor {
                position: self.position,
            })?;
        Ok(self.insert_at(literal, location))
    }

    /// Insert `literal` at the current position, reporting `location` for
    /// each of its characters
    pub fn insert_at(&mut self, literal: &str, location: TextLocation) -> &mut Self {
        self.segments.push(Segment::injected(literal, location));
        self
    }

    /// Replace the next `count` characters of the base text with `literal`
    ///
    /// The replacement reports the location of the first replaced character.
    pub fn replace(&mut self, count: usize, literal: &str) -> Result<&mut Self> {
        TextError::check_range(self.position, self.position + count, self.base.len())?;
        self.insert(literal)?;
        self.delete(count)
    }

    /// Retain the rest of the base text and build the rewritten text
    pub fn finish(mut self) -> Result<Text> {
        let rest = self.base.len() - self.position;
        self.retain(rest)?;
        Text::rewritten(self.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextKind;
    use crate::types::FileId;

    fn root(content: &str) -> Text {
        Text::from_source(FileId(0), content)
    }

    #[test]
    fn test_untouched_rewrite_keeps_one_segment() {
        let base = root("abc\ndef");
        let rewritten = RewriteBuilder::new(base.clone()).finish().unwrap();
        assert_eq!(rewritten.to_string(), "abc\ndef");
        let TextKind::Rewritten(inner) = rewritten.kind() else {
            panic!("Expected a rewritten text");
        };
        assert_eq!(inner.segments().len(), 1);
    }

    #[test]
    fn test_delete_keeps_provenance_of_survivors() {
        let base = root("ab\n#skip\ncd");
        let mut builder = RewriteBuilder::new(base);
        builder.retain(3).unwrap();
        builder.delete(6).unwrap();
        let rewritten = builder.finish().unwrap();

        assert_eq!(rewritten.to_string(), "ab\ncd");
        let cursor = rewritten.cursor();
        let loc = cursor.location(3).unwrap();
        assert_eq!((loc.line, loc.column, loc.offset), (3, 1, 9));
    }

    #[test]
    fn test_insert_takes_location_of_following_character() {
        let base = root("a\nb");
        let mut builder = RewriteBuilder::new(base);
        builder.retain(2).unwrap();
        builder.insert("XY").unwrap();
        let rewritten = builder.finish().unwrap();

        assert_eq!(rewritten.to_string(), "a\nXYb");
        let cursor = rewritten.cursor();
        let injected = cursor.location(2).unwrap();
        let following = cursor.location(4).unwrap();
        assert_eq!(injected, following);
        assert_eq!((injected.line, injected.column), (2, 1));
        assert!(cursor.is_injected(3).unwrap());
        assert!(!cursor.is_injected(4).unwrap());
    }

    #[test]
    fn test_insert_at_end_uses_end_of_text() {
        let base = root("ab");
        let mut builder = RewriteBuilder::new(base);
        builder.retain(2).unwrap();
        builder.insert(";").unwrap();
        let rewritten = builder.finish().unwrap();

        let loc = rewritten.cursor().location(2).unwrap();
        assert_eq!((loc.line, loc.column, loc.offset), (1, 3, 2));
    }

    #[test]
    fn test_insert_at_explicit_location() {
        let base = root("body");
        let header = TextLocation::new(FileId(9), 4, 2, 30);
        let mut builder = RewriteBuilder::new(base);
        builder.insert_at("#include ", header);
        let rewritten = builder.finish().unwrap();

        assert_eq!(rewritten.to_string(), "#include body");
        assert_eq!(rewritten.cursor().location(0).unwrap(), header);
    }

    #[test]
    fn test_edits_past_end_fail() {
        let mut builder = RewriteBuilder::new(root("abc"));
        builder.retain(2).unwrap();
        assert!(matches!(
            builder.retain(2),
            Err(TextError::InvalidRange { .. })
        ));
        assert!(builder.delete(5).is_err());
        assert!(builder.replace(2, "x").is_err());
        // Failed edits do not move the builder
        assert_eq!(builder.position(), 2);
    }

    #[test]
    fn test_insert_into_empty_rewrite_has_no_anchor() {
        let empty = Text::rewritten(Vec::new()).unwrap();
        let mut builder = RewriteBuilder::new(empty);
        assert_eq!(
            builder.insert("x").unwrap_err(),
            TextError::MissingAnchor { position: 0 }
        );
    }

    #[test]
    fn test_rewrite_of_rewrite() {
        let base = root("f(A)");
        let mut first = RewriteBuilder::new(base);
        first.retain(2).unwrap();
        first.replace(1, "B+B").unwrap();
        let expanded = first.finish().unwrap();
        assert_eq!(expanded.to_string(), "f(B+B)");

        let mut second = RewriteBuilder::new(expanded);
        second.retain(2).unwrap();
        second.replace(1, "1").unwrap();
        let twice = second.finish().unwrap();

        assert_eq!(twice.to_string(), "f(1+B)");
        assert_eq!(twice.transformation_depth(), 2);
        let cursor = twice.cursor();
        // Every expansion character points at the original `A`
        for index in 2..5 {
            assert_eq!(cursor.location(index).unwrap().offset, 2);
        }
        assert_eq!(cursor.location(5).unwrap().offset, 3);
    }
}
