//! Cursors for reading texts and mapping positions to original locations

use once_cell::unsync::OnceCell;

use crate::error::{Result, TextError};
use crate::text::{RewrittenText, Segment, Text, TextKind};
use crate::types::TextLocation;

/// Read handle bound to one [`Text`]
///
/// Indices are in the text's own index space. Every lookup is translated
/// down through the layers the text wraps until it reaches the root text
/// that owns the character, which costs at most one step per layer.
///
/// Cursors are cheap to create. The cursors of wrapped texts are created on
/// first use and kept, so a cursor is not `Sync`; take one cursor per
/// thread.
pub struct TextCursor {
    text: Text,
    /// Cursor over the source of a sub text
    inner: OnceCell<Box<TextCursor>>,
    /// Cursors over retained segments of a rewritten text, by segment index.
    /// Allocated on the first segment lookup.
    segments: OnceCell<Box<[OnceCell<TextCursor>]>>,
}

impl TextCursor {
    pub(crate) fn new(text: Text) -> Self {
        TextCursor {
            text,
            inner: OnceCell::new(),
            segments: OnceCell::new(),
        }
    }

    /// The text this cursor reads
    pub fn text(&self) -> &Text {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn inner_cursor(&self, source: &Text) -> &TextCursor {
        self.inner.get_or_init(|| Box::new(source.cursor()))
    }

    fn segment_cursor(
        &self,
        rewritten: &RewrittenText,
        segment: usize,
        text: &Text,
    ) -> &TextCursor {
        let cells = self.segments.get_or_init(|| {
            rewritten
                .segments
                .iter()
                .map(|_| OnceCell::new())
                .collect()
        });
        cells[segment].get_or_init(|| text.cursor())
    }

    /// Character at `index`
    pub fn char_at(&self, index: usize) -> Result<char> {
        TextError::check_index(index, self.len())?;

        match self.text.kind() {
            TextKind::Source(source) => Ok(source.chars[index]),
            TextKind::Sub(sub) => self.inner_cursor(&sub.source).char_at(sub.start + index),
            TextKind::Rewritten(rewritten) => {
                let (segment, offset) = rewritten.locate(index);
                match &rewritten.segments[segment] {
                    Segment::Retained { text, start, .. } => {
                        self.segment_cursor(rewritten, segment, text)
                            .char_at(start + offset)
                    }
                    Segment::Injected { literal, .. } => Ok(literal[offset]),
                }
            }
        }
    }

    /// Location in the original file of the character at `index`
    ///
    /// Characters of an injected span report the location the span was
    /// given when it was built; see [`crate::RewriteBuilder`] for how that
    /// location is chosen.
    pub fn location(&self, index: usize) -> Result<TextLocation> {
        TextError::check_index(index, self.len())?;

        match self.text.kind() {
            TextKind::Source(source) => source
                .lines
                .location(source.file, index)
                .ok_or(TextError::IndexOutOfBounds {
                    index,
                    length: source.chars.len(),
                }),
            TextKind::Sub(sub) => self.inner_cursor(&sub.source).location(sub.start + index),
            TextKind::Rewritten(rewritten) => {
                let (segment, offset) = rewritten.locate(index);
                match &rewritten.segments[segment] {
                    Segment::Retained { text, start, .. } => {
                        self.segment_cursor(rewritten, segment, text)
                            .location(start + offset)
                    }
                    Segment::Injected { location, .. } => Ok(*location),
                }
            }
        }
    }

    /// Whether the character at `index` was injected rather than read from
    /// an original file
    pub fn is_injected(&self, index: usize) -> Result<bool> {
        TextError::check_index(index, self.len())?;

        match self.text.kind() {
            TextKind::Source(_) => Ok(false),
            TextKind::Sub(sub) => self.inner_cursor(&sub.source).is_injected(sub.start + index),
            TextKind::Rewritten(rewritten) => {
                let (segment, offset) = rewritten.locate(index);
                match &rewritten.segments[segment] {
                    Segment::Retained { text, start, .. } => {
                        self.segment_cursor(rewritten, segment, text)
                            .is_injected(start + offset)
                    }
                    Segment::Injected { .. } => Ok(true),
                }
            }
        }
    }

    /// View of `start..end` of this cursor's text
    ///
    /// The full range returns the cursor's own text. Otherwise the view is
    /// built by the text that owns the range: a slice of a slice becomes a
    /// slice of the underlying source, and a range inside one retained
    /// segment of a rewritten text becomes a slice of that segment's text.
    pub fn sub_text(&self, start: usize, end: usize) -> Result<Text> {
        TextError::check_range(start, end, self.len())?;
        if start == 0 && end == self.len() {
            return Ok(self.text.clone());
        }

        match self.text.kind() {
            TextKind::Source(_) => Ok(Text::sub_unchecked(self.text.clone(), start, end)),
            TextKind::Sub(sub) => self
                .inner_cursor(&sub.source)
                .sub_text(sub.start + start, sub.start + end),
            TextKind::Rewritten(rewritten) => {
                if start < end {
                    let (segment, offset) = rewritten.locate(start);
                    if let Segment::Retained {
                        text,
                        start: seg_start,
                        end: seg_end,
                    } = &rewritten.segments[segment]
                    {
                        let from = seg_start + offset;
                        let to = from + (end - start);
                        if to <= *seg_end {
                            return self
                                .segment_cursor(rewritten, segment, text)
                                .sub_text(from, to);
                        }
                    }
                }
                Ok(Text::sub_unchecked(self.text.clone(), start, end))
            }
        }
    }

    /// Cursor over `start..end` of this cursor's text
    pub fn sub_sequence(&self, start: usize, end: usize) -> Result<TextCursor> {
        Ok(self.sub_text(start, end)?.cursor())
    }
}

impl std::fmt::Debug for TextCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCursor").field("text", &self.text).finish()
    }
}

impl std::fmt::Display for TextCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.text, f)
    }
}
