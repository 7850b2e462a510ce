//! Line index for offset to line/column lookups

use crate::types::{FileId, TextLocation};

/// Start offsets of every line of a file
///
/// Built once per original file so that converting a character offset to a
/// line and column is a binary search instead of a scan. `\n`, `\r\n` and a
/// lone `\r` all terminate a line; a terminator belongs to the line it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Character offset at which each line starts. Always begins with 0.
    line_starts: Vec<usize>,

    /// Total length of the file in characters
    total_length: usize,
}

impl LineIndex {
    pub fn new(chars: &[char]) -> Self {
        let mut line_starts = vec![0];
        let mut idx = 0;
        while idx < chars.len() {
            match chars[idx] {
                '\n' => line_starts.push(idx + 1),
                '\r' => {
                    if chars.get(idx + 1) == Some(&'\n') {
                        idx += 1;
                    }
                    line_starts.push(idx + 1);
                }
                _ => {}
            }
            idx += 1;
        }

        LineIndex {
            line_starts,
            total_length: chars.len(),
        }
    }

    /// Convert a character offset to a location in `file`
    ///
    /// `offset == total_length()` is accepted and yields the position just
    /// past the last character. Returns None past that.
    ///
    /// # Example
    ///
    /// ```
    /// use quarto_source_text::{FileId, LineIndex};
    ///
    /// let chars: Vec<char> = "hello\nworld".chars().collect();
    /// let index = LineIndex::new(&chars);
    /// let loc = index.location(FileId(0), 6).unwrap();
    /// assert_eq!((loc.line, loc.column), (2, 1));
    /// ```
    pub fn location(&self, file: FileId, offset: usize) -> Option<TextLocation> {
        if offset > self.total_length {
            return None;
        }

        // line_starts[0] == 0, so Err(0) cannot happen
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };

        Some(TextLocation {
            file,
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
            offset,
        })
    }

    /// Convert a 1-based line and column back to a character offset
    ///
    /// Returns None if the line does not exist or the column lies past the
    /// end of that line (its terminator included).
    pub fn offset(&self, line: usize, column: usize) -> Option<usize> {
        if line == 0 || column == 0 {
            return None;
        }
        let start = *self.line_starts.get(line - 1)?;
        let offset = start + column - 1;
        match self.line_starts.get(line) {
            // The next line starts right after this line's terminator
            Some(&next_start) if offset >= next_start => None,
            // The last line also holds the end-of-file position
            None if offset > self.total_length => None,
            _ => Some(offset),
        }
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(content: &str) -> LineIndex {
        let chars: Vec<char> = content.chars().collect();
        LineIndex::new(&chars)
    }

    fn line_col(index: &LineIndex, offset: usize) -> (usize, usize) {
        let loc = index.location(FileId(0), offset).unwrap();
        (loc.line, loc.column)
    }

    #[test]
    fn test_empty_file() {
        let info = index("");
        assert_eq!(info.total_length(), 0);
        assert_eq!(info.line_count(), 1);
        assert_eq!(line_col(&info, 0), (1, 1));
    }

    #[test]
    fn test_single_line() {
        let info = index("hello world");
        assert_eq!(info.line_count(), 1);
        assert_eq!(line_col(&info, 0), (1, 1));
        assert_eq!(line_col(&info, 6), (1, 7));
        assert_eq!(line_col(&info, 11), (1, 12));
    }

    #[test]
    fn test_multiple_lines() {
        let info = index("line 1\nline 2\nline 3");
        assert_eq!(info.line_count(), 3);

        assert_eq!(line_col(&info, 0), (1, 1));
        // The newline belongs to the line it terminates
        assert_eq!(line_col(&info, 6), (1, 7));
        assert_eq!(line_col(&info, 7), (2, 1));
        assert_eq!(line_col(&info, 13), (2, 7));
        assert_eq!(line_col(&info, 14), (3, 1));
        assert_eq!(line_col(&info, 20), (3, 7));
    }

    #[test]
    fn test_crlf_and_lone_cr() {
        let info = index("a\r\nb\rc");
        assert_eq!(info.line_count(), 3);
        assert_eq!(line_col(&info, 1), (1, 2));
        assert_eq!(line_col(&info, 2), (1, 3));
        assert_eq!(line_col(&info, 3), (2, 1));
        assert_eq!(line_col(&info, 4), (2, 2));
        assert_eq!(line_col(&info, 5), (3, 1));
    }

    #[test]
    fn test_offsets_count_characters() {
        // 'é' is a single character even though it is two bytes in UTF-8
        let info = index("café\nwörld");
        assert_eq!(line_col(&info, 4), (1, 5));
        assert_eq!(line_col(&info, 5), (2, 1));
        assert_eq!(line_col(&info, 7), (2, 3));
    }

    #[test]
    fn test_out_of_bounds() {
        let info = index("hello");
        assert!(info.location(FileId(0), 6).is_none());
    }

    #[test]
    fn test_consecutive_newlines() {
        let info = index("a\n\n\nb");
        assert_eq!(info.line_count(), 4);
        assert_eq!(line_col(&info, 2), (2, 1));
        assert_eq!(line_col(&info, 3), (3, 1));
        assert_eq!(line_col(&info, 4), (4, 1));
    }

    #[test]
    fn test_offset_roundtrip() {
        let info = index("hello\nworld\r\ntest");
        for offset in [0, 3, 5, 6, 10, 12, 13, 17] {
            let loc = info.location(FileId(0), offset).unwrap();
            assert_eq!(info.offset(loc.line, loc.column), Some(offset));
        }
    }

    #[test]
    fn test_offset_out_of_bounds() {
        let info = index("hello\nworld");
        assert_eq!(info.offset(0, 1), None);
        assert_eq!(info.offset(3, 1), None);
        assert_eq!(info.offset(1, 8), None);
    }

    #[test]
    fn test_offset_stops_at_line_terminator() {
        let info = index("hello\nworld");
        // The newline itself
        assert_eq!(info.offset(1, 6), Some(5));
        // One past it is the start of line 2, not a column of line 1
        assert_eq!(info.offset(1, 7), None);
        // End of file on the last line
        assert_eq!(info.offset(2, 6), Some(11));
        assert_eq!(info.offset(2, 7), None);

        let info = index("a\r\nb\rc");
        assert_eq!(info.offset(1, 2), Some(1));
        assert_eq!(info.offset(1, 3), Some(2));
        assert_eq!(info.offset(1, 4), None);
        assert_eq!(info.offset(2, 2), Some(4));
        assert_eq!(info.offset(2, 3), None);
        assert_eq!(info.offset(3, 2), Some(6));
        assert_eq!(info.offset(3, 3), None);
    }
}
