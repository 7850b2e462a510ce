//! Texts with provenance
//!
//! A [`Text`] is an immutable sequence of characters that knows where each
//! character came from. Root texts own the characters of an original file;
//! every other text is a view that references the texts it was built from
//! and never copies their characters.

use std::sync::Arc;

use crate::cursor::TextCursor;
use crate::error::{Result, TextError};
use crate::line_index::LineIndex;
use crate::types::{FileId, TextLocation};

/// Shared handle to an immutable text
///
/// Cloning a `Text` is cheap and yields the same text: [`Text::ptr_eq`]
/// holds between the clones.
#[derive(Clone)]
pub struct Text(Arc<TextKind>);

/// The closed set of text variants
pub enum TextKind {
    /// Characters of an original file
    Source(SourceText),
    /// A contiguous slice of another text
    Sub(SubText),
    /// Retained slices of other texts spliced with injected literals
    Rewritten(RewrittenText),
}

/// Root text owning the characters of an original file
pub struct SourceText {
    pub(crate) file: FileId,
    pub(crate) chars: Box<[char]>,
    pub(crate) lines: LineIndex,
}

/// A slice `start..start + length` of a source text
pub struct SubText {
    pub(crate) source: Text,
    pub(crate) start: usize,
    pub(crate) length: usize,
    pub(crate) depth: usize,
}

/// A text assembled from an ordered list of segments
pub struct RewrittenText {
    pub(crate) segments: Vec<Segment>,
    /// Offset of each segment in this text. Strictly increasing because
    /// empty segments are never stored.
    pub(crate) starts: Vec<usize>,
    pub(crate) length: usize,
    pub(crate) depth: usize,
}

/// One piece of a [`RewrittenText`]
#[derive(Clone)]
pub enum Segment {
    /// Characters `start..end` of `text`, keeping their provenance
    Retained { text: Text, start: usize, end: usize },
    /// Characters with no counterpart in any original file. Every character
    /// of the literal reports `location`.
    Injected {
        literal: Arc<[char]>,
        location: TextLocation,
    },
}

impl Segment {
    pub fn retained(text: Text, start: usize, end: usize) -> Self {
        Segment::Retained { text, start, end }
    }

    pub fn injected(literal: &str, location: TextLocation) -> Self {
        Segment::Injected {
            literal: literal.chars().collect(),
            location,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Segment::Retained { start, end, .. } => end - start,
            Segment::Injected { literal, .. } => literal.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn depth(&self) -> usize {
        match self {
            Segment::Retained { text, .. } => text.transformation_depth(),
            Segment::Injected { .. } => 0,
        }
    }

    /// Extend `self` with `next` when the two describe one contiguous run
    fn merge(&mut self, next: &Segment) -> bool {
        match (self, next) {
            (
                Segment::Retained { text, end, .. },
                Segment::Retained {
                    text: next_text,
                    start: next_start,
                    end: next_end,
                },
            ) if text.ptr_eq(next_text) && *end == *next_start => {
                *end = *next_end;
                true
            }
            (
                Segment::Injected { literal, location },
                Segment::Injected {
                    literal: next_literal,
                    location: next_location,
                },
            ) if *location == *next_location => {
                *literal = literal.iter().chain(next_literal.iter()).copied().collect();
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Retained { text, start, end } => f
                .debug_struct("Retained")
                .field("text", text)
                .field("start", start)
                .field("end", end)
                .finish(),
            Segment::Injected { literal, location } => f
                .debug_struct("Injected")
                .field("literal", &literal.iter().collect::<String>())
                .field("location", location)
                .finish(),
        }
    }
}

impl SourceText {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }
}

impl SubText {
    /// The text this slice reads from
    pub fn source(&self) -> &Text {
        &self.source
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

impl RewrittenText {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Find the segment holding `index` and the offset of `index` inside it
    ///
    /// `index` must be below the text length.
    pub(crate) fn locate(&self, index: usize) -> (usize, usize) {
        let segment = match self.starts.binary_search(&index) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        (segment, index - self.starts[segment])
    }
}

impl Text {
    fn new(kind: TextKind) -> Self {
        Text(Arc::new(kind))
    }

    /// Create a root text over the content of an original file
    ///
    /// The root is the only text that owns characters; its transformation
    /// depth is 0.
    pub fn from_source(file: FileId, content: &str) -> Text {
        let chars: Box<[char]> = content.chars().collect();
        let lines = LineIndex::new(&chars);
        Text::new(TextKind::Source(SourceText { file, chars, lines }))
    }

    /// Wrap `source` in a new slice view `start..end`
    ///
    /// Unlike [`Text::sub_text`], this always creates a new layer, even when
    /// `source` is itself a slice or the range covers all of it.
    pub fn slice_of(source: &Text, start: usize, end: usize) -> Result<Text> {
        TextError::check_range(start, end, source.len())?;
        Ok(Text::sub_unchecked(source.clone(), start, end))
    }

    pub(crate) fn sub_unchecked(source: Text, start: usize, end: usize) -> Text {
        let depth = source.transformation_depth() + 1;
        Text::new(TextKind::Sub(SubText {
            source,
            start,
            length: end - start,
            depth,
        }))
    }

    /// Assemble a text from an ordered list of segments
    ///
    /// Retained ranges are validated against their texts. Empty segments are
    /// dropped and adjacent segments describing one contiguous run are
    /// merged, so the result holds one segment per edit.
    pub fn rewritten(segments: impl IntoIterator<Item = Segment>) -> Result<Text> {
        let mut merged: Vec<Segment> = Vec::new();
        for segment in segments {
            if let Segment::Retained { text, start, end } = &segment {
                TextError::check_range(*start, *end, text.len())?;
            }
            if segment.is_empty() {
                continue;
            }
            if let Some(last) = merged.last_mut() {
                if last.merge(&segment) {
                    continue;
                }
            }
            merged.push(segment);
        }

        let mut starts = Vec::with_capacity(merged.len());
        let mut length = 0;
        for segment in &merged {
            starts.push(length);
            length += segment.len();
        }
        let depth = 1 + merged.iter().map(Segment::depth).max().unwrap_or(0);

        Ok(Text::new(TextKind::Rewritten(RewrittenText {
            segments: merged,
            starts,
            length,
            depth,
        })))
    }

    pub fn kind(&self) -> &TextKind {
        &self.0
    }

    pub fn len(&self) -> usize {
        match self.kind() {
            TextKind::Source(source) => source.chars.len(),
            TextKind::Sub(sub) => sub.length,
            TextKind::Rewritten(rewritten) => rewritten.length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of layers between this text and the roots it reads from
    pub fn transformation_depth(&self) -> usize {
        match self.kind() {
            TextKind::Source(_) => 0,
            TextKind::Sub(sub) => sub.depth,
            TextKind::Rewritten(rewritten) => rewritten.depth,
        }
    }

    /// Create a cursor for reading this text
    pub fn cursor(&self) -> TextCursor {
        TextCursor::new(self.clone())
    }

    /// View of `start..end` of this text
    ///
    /// Returns this very text when the range covers all of it, and otherwise
    /// lets the text that owns the range build the view, so slicing a slice
    /// does not stack layers.
    pub fn sub_text(&self, start: usize, end: usize) -> Result<Text> {
        self.cursor().sub_text(start, end)
    }

    /// Whether both handles refer to the same text
    pub fn ptr_eq(&self, other: &Text) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Copy `dest.len()` characters starting at `src_pos` into `dest`
    pub fn copy_chars(&self, src_pos: usize, dest: &mut [char]) -> Result<()> {
        let end = src_pos + dest.len();
        TextError::check_range(src_pos, end, self.len())?;

        match self.kind() {
            TextKind::Source(source) => {
                dest.copy_from_slice(&source.chars[src_pos..end]);
                Ok(())
            }
            TextKind::Sub(sub) => sub.source.copy_chars(sub.start + src_pos, dest),
            TextKind::Rewritten(rewritten) => {
                if dest.is_empty() {
                    return Ok(());
                }
                let (mut segment, mut offset) = rewritten.locate(src_pos);
                let mut written = 0;
                while written < dest.len() {
                    let piece = &rewritten.segments[segment];
                    let count = (piece.len() - offset).min(dest.len() - written);
                    let target = &mut dest[written..written + count];
                    match piece {
                        Segment::Retained { text, start, .. } => {
                            text.copy_chars(start + offset, target)?;
                        }
                        Segment::Injected { literal, .. } => {
                            target.copy_from_slice(&literal[offset..offset + count]);
                        }
                    }
                    written += count;
                    segment += 1;
                    offset = 0;
                }
                Ok(())
            }
        }
    }

    /// Iterate over the characters of this text
    pub fn chars(&self) -> Chars {
        Chars {
            cursor: self.cursor(),
            position: 0,
        }
    }

    /// Location of the boundary before character `position`
    ///
    /// Accepts `position == len()`, which resolves to the position just past
    /// the last character. This is where injected spans take their location
    /// from. None only for a rewritten text without any segment.
    pub(crate) fn boundary_location(&self, position: usize) -> Option<TextLocation> {
        match self.kind() {
            TextKind::Source(source) => source.lines.location(source.file, position),
            TextKind::Sub(sub) => sub.source.boundary_location(sub.start + position),
            TextKind::Rewritten(rewritten) => {
                if position < rewritten.length {
                    let (segment, offset) = rewritten.locate(position);
                    return match &rewritten.segments[segment] {
                        Segment::Retained { text, start, .. } => {
                            text.boundary_location(start + offset)
                        }
                        Segment::Injected { location, .. } => Some(*location),
                    };
                }
                match rewritten.segments.last()? {
                    Segment::Retained { text, end, .. } => text.boundary_location(*end),
                    Segment::Injected { location, .. } => Some(*location),
                }
            }
        }
    }
}

impl std::fmt::Debug for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind() {
            TextKind::Source(_) => "source",
            TextKind::Sub(_) => "sub",
            TextKind::Rewritten(_) => "rewritten",
        };
        f.debug_struct("Text")
            .field("kind", &kind)
            .field("len", &self.len())
            .field("depth", &self.transformation_depth())
            .finish()
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buffer = vec!['\0'; self.len()];
        self.copy_chars(0, &mut buffer)
            .map_err(|_| std::fmt::Error)?;
        let content: String = buffer.into_iter().collect();
        f.write_str(&content)
    }
}

/// Iterator over the characters of a [`Text`]
pub struct Chars {
    cursor: TextCursor,
    position: usize,
}

impl Iterator for Chars {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let ch = self.cursor.char_at(self.position).ok()?;
        self.position += 1;
        Some(ch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chars {}
