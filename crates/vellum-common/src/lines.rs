//! Text and position mapping.
//!
//! [`Lines`] owns a piece of source text together with an index of line
//! starts, and converts between byte offsets, `(line, column)` pairs with
//! character-based columns, and UTF-16 offsets. The UTF-16 surface exists
//! for editor protocols, which address positions in UTF-16 code units.
//!
//! All line and column indices start at zero; add one for user display.

use std::ops::Range;

/// A newline as understood by this front-end: LF, VT, FF, CR (optionally
/// followed by LF), NEL, LS, or PS.
pub fn is_newline(character: char) -> bool {
    matches!(
        character,
        '\n' | '\x0B' | '\x0C' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Metadata about a line.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Line {
    /// The UTF-8 byte offset where the line starts.
    byte_idx: usize,
    /// The UTF-16 codepoint offset where the line starts.
    utf16_idx: usize,
}

/// Source text with a line index.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Lines {
    text: String,
    lines: Vec<Line>,
}

impl Lines {
    /// Index the given text.
    pub fn new(text: String) -> Self {
        let lines = std::iter::once(Line { byte_idx: 0, utf16_idx: 0 })
            .chain(lines_from(0, 0, &text))
            .collect();
        Self { text, lines }
    }

    /// The underlying text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The length of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The length of the text in UTF-16 code units.
    pub fn utf16_len(&self) -> usize {
        let last = self.lines.last().copied().unwrap_or(Line { byte_idx: 0, utf16_idx: 0 });
        last.utf16_idx + len_utf16(&self.text[last.byte_idx..])
    }

    /// The number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Slice out a part of the text.
    pub fn get(&self, range: Range<usize>) -> Option<&str> {
        self.text.get(range)
    }

    /// The contents of the line with the given index, without its
    /// terminator.
    pub fn line(&self, line_idx: usize) -> Option<&str> {
        let range = self.line_to_range(line_idx)?;
        let line = self.text.get(range)?;
        Some(line.trim_end_matches(is_newline))
    }

    /// The byte position at which the given line starts.
    pub fn line_start(&self, line_idx: usize) -> Option<usize> {
        self.lines.get(line_idx).map(|line| line.byte_idx)
    }

    /// The byte position at which the given line ends, including its
    /// terminator.
    pub fn line_end(&self, line_idx: usize) -> Option<usize> {
        self.lines
            .get(line_idx)
            .map(|_| self.line_start(line_idx + 1).unwrap_or(self.text.len()))
    }

    /// The range which encloses the given line, terminator included.
    pub fn line_to_range(&self, line_idx: usize) -> Option<Range<usize>> {
        let start = self.line_start(line_idx)?;
        let end = self.line_end(line_idx)?;
        Some(start..end)
    }

    /// The index of the line that contains the given byte offset.
    pub fn byte_to_line(&self, byte_idx: usize) -> Option<usize> {
        (byte_idx <= self.text.len()).then(|| {
            match self.lines.binary_search_by_key(&byte_idx, |line| line.byte_idx) {
                Ok(i) => i,
                Err(i) => i - 1,
            }
        })
    }

    /// The column at the given byte offset.
    ///
    /// The column is the number of characters in the line before the byte
    /// offset.
    pub fn byte_to_column(&self, byte_idx: usize) -> Option<usize> {
        let line = self.byte_to_line(byte_idx)?;
        let start = self.line_start(line)?;
        let head = self.text.get(start..byte_idx)?;
        Some(head.chars().count())
    }

    /// Both the line and column at the given byte offset.
    pub fn byte_to_line_column(&self, byte_idx: usize) -> Option<(usize, usize)> {
        Some((self.byte_to_line(byte_idx)?, self.byte_to_column(byte_idx)?))
    }

    /// The byte offset of the given (line, column) pair.
    ///
    /// The column counts characters from the start of the line.
    pub fn line_column_to_byte(
        &self,
        line_idx: usize,
        column_idx: usize,
    ) -> Option<usize> {
        let range = self.line_to_range(line_idx)?;
        let line = self.text.get(range.clone())?;
        let mut chars = line.chars();
        for _ in 0..column_idx {
            chars.next();
        }
        Some(range.start + (line.len() - chars.as_str().len()))
    }

    /// The byte offset of the given UTF-16 code unit offset.
    pub fn utf16_to_byte_offset(&self, utf16_idx: usize) -> Option<usize> {
        let line = match self
            .lines
            .binary_search_by_key(&utf16_idx, |line| line.utf16_idx)
        {
            Ok(i) => i,
            Err(i) => i - 1,
        };

        let entry = self.lines[line];
        let head = self.text.get(entry.byte_idx..)?;
        let mut k = entry.utf16_idx;
        for (offset, c) in head.char_indices() {
            if k >= utf16_idx {
                return Some(entry.byte_idx + offset);
            }
            k += c.len_utf16();
        }

        (k == utf16_idx).then_some(self.text.len())
    }

    /// The UTF-16 (line, column) position at the given byte offset.
    pub fn byte_to_utf16_line_column(&self, byte_idx: usize) -> Option<(usize, usize)> {
        let line = self.byte_to_line(byte_idx)?;
        let start = self.line_start(line)?;
        let head = self.text.get(start..byte_idx)?;
        Some((line, len_utf16(head)))
    }

    /// The byte offset of the given UTF-16 (line, column) position.
    pub fn utf16_line_column_to_byte(
        &self,
        line_idx: usize,
        column_idx: usize,
    ) -> Option<usize> {
        let range = self.line_to_range(line_idx)?;
        let line = self.text.get(range.clone())?;
        let mut k = 0;
        for (offset, c) in line.char_indices() {
            if k >= column_idx {
                return Some(range.start + offset);
            }
            k += c.len_utf16();
        }
        (k == column_idx).then_some(range.end)
    }
}

/// Text mutation.
impl Lines {
    /// Fully replace the text, reindexing everything.
    pub fn replace(&mut self, text: String) {
        *self = Self::new(text);
    }

    /// Apply an edit, reindexing only from the line the edit starts in.
    ///
    /// # Panics
    ///
    /// If the replaced range is out of bounds or not on character
    /// boundaries.
    pub fn edit(&mut self, replace: Range<usize>, with: &str) {
        let start_byte = replace.start;
        self.text.replace_range(replace, with);

        // Remove invalidated line starts.
        let line = self.byte_to_line(start_byte).expect("edit is in bounds");
        self.lines.truncate(line + 1);

        // If the new text starts with `\n` and the text before the edit
        // ends with `\r`, the pair forms one newline and the kept index
        // would wrongly count two.
        if self.text[..start_byte].ends_with('\r') && with.starts_with('\n') {
            self.lines.pop();
        }

        // Recalculate the line starts after the edit, resuming at the
        // start of the line the edit begins in so UTF-16 offsets line up.
        let entry = self.lines.last().copied().unwrap_or(Line { byte_idx: 0, utf16_idx: 0 });
        self.lines.extend(lines_from(
            entry.byte_idx,
            entry.utf16_idx,
            &self.text[entry.byte_idx..],
        ));
    }
}

/// The number of UTF-16 code units in a string.
fn len_utf16(string: &str) -> usize {
    string.chars().map(char::len_utf16).sum()
}

/// Iterate over the line starts of the text, assuming the text begins at
/// the given byte and UTF-16 offsets.
fn lines_from(
    byte_offset: usize,
    utf16_offset: usize,
    text: &str,
) -> impl Iterator<Item = Line> + '_ {
    let mut chars = text.chars();
    let mut byte_idx = byte_offset;
    let mut utf16_idx = utf16_offset;

    std::iter::from_fn(move || {
        loop {
            let c = chars.next()?;
            byte_idx += c.len_utf8();
            utf16_idx += c.len_utf16();

            if is_newline(c) {
                if c == '\r' && chars.clone().next() == Some('\n') {
                    chars.next();
                    byte_idx += 1;
                    utf16_idx += 1;
                }
                return Some(Line { byte_idx, utf16_idx });
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST: &str = "ä\tcde\nf💛g\r\nhi\rjkl";

    #[test]
    fn line_starts() {
        let lines = Lines::new(TEST.into());
        assert_eq!(lines.line_count(), 4);
        assert_eq!(lines.line_start(0), Some(0));
        assert_eq!(lines.line_start(1), Some(7));
        assert_eq!(lines.line_start(2), Some(15));
        assert_eq!(lines.line_start(3), Some(18));
        assert_eq!(lines.line_start(4), None);
    }

    #[test]
    fn byte_to_line_bounds() {
        let lines = Lines::new(TEST.into());
        assert_eq!(lines.byte_to_line(0), Some(0));
        assert_eq!(lines.byte_to_line(2), Some(0));
        assert_eq!(lines.byte_to_line(7), Some(1));
        assert_eq!(lines.byte_to_line(8), Some(1));
        assert_eq!(lines.byte_to_line(12), Some(1));
        assert_eq!(lines.byte_to_line(21), Some(3));
        assert_eq!(lines.byte_to_line(22), None);
    }

    #[test]
    fn byte_to_column_counts_chars() {
        let lines = Lines::new(TEST.into());
        assert_eq!(lines.byte_to_column(0), Some(0));
        assert_eq!(lines.byte_to_column(2), Some(1));
        assert_eq!(lines.byte_to_column(6), Some(5));
        assert_eq!(lines.byte_to_column(7), Some(0));
        assert_eq!(lines.byte_to_column(8), Some(1));
        assert_eq!(lines.byte_to_column(12), Some(2));
    }

    #[test]
    fn line_column_round_trip() {
        let lines = Lines::new(TEST.into());
        for byte_idx in [0, 7, 12, 21] {
            let (line, column) = lines.byte_to_line_column(byte_idx).unwrap();
            assert_eq!(lines.line_column_to_byte(line, column), Some(byte_idx));
        }
    }

    #[test]
    fn utf16_equals_bytes_for_ascii() {
        let lines = Lines::new("hello\nworld".into());
        assert_eq!(lines.utf16_len(), 11);
        for i in 0..=11 {
            assert_eq!(lines.utf16_to_byte_offset(i), Some(i));
        }
    }

    #[test]
    fn utf16_positions() {
        let lines = Lines::new(TEST.into());
        // 💛 is two UTF-16 code units but four UTF-8 bytes.
        let (line, column) = lines.byte_to_utf16_line_column(12).unwrap();
        assert_eq!((line, column), (1, 3));
        assert_eq!(lines.utf16_line_column_to_byte(1, 3), Some(12));
        assert_eq!(lines.utf16_to_byte_offset(0), Some(0));
        // Per line: "ä\tcde\n" = 6, "f💛g\r\n" = 6, "hi\r" = 3, "jkl" = 3.
        assert_eq!(lines.utf16_len(), 18);
    }

    #[test]
    fn edit_refreshes_the_index() {
        #[track_caller]
        fn test(prev: &str, range: Range<usize>, with: &str, after: &str) {
            let mut lines = Lines::new(prev.into());
            lines.edit(range, with);
            assert_eq!(lines.text(), after);
            assert_eq!(lines, Lines::new(after.into()));
        }

        // Insert at the beginning.
        test("abc\n", 0..0, "hi\n", "hi\nabc\n");
        test("\nabc", 0..0, "hi\r", "hi\r\nabc");

        // Edit in the middle.
        test(TEST, 4..16, "❌", "ä\tc❌i\rjkl");

        // Append.
        test("abc\ndef", 7..7, "hi", "abc\ndefhi");
        test("abc\ndef\n", 8..8, "hi", "abc\ndef\nhi");

        // Append with adjoining `\r` and `\n`.
        test("abc\ndef\r", 8..8, "\nghi", "abc\ndef\r\nghi");

        // Remove everything.
        test(TEST, 0..21, "", "");
    }

    #[test]
    fn line_contents() {
        let lines = Lines::new("first\nsecond\nthird".into());
        assert_eq!(lines.line(0), Some("first"));
        assert_eq!(lines.line(1), Some("second"));
        assert_eq!(lines.line(2), Some("third"));
        assert_eq!(lines.line(3), None);
        assert_eq!(lines.line_end(0), Some(6));
    }
}
