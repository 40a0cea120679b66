//! Read access to the text the parser indexes.
//!
//! The parser never owns document text. It is handed something that implements
//! [`TextBuffer`] together with every edit notification, and reads back only the
//! lines around the edit.

use ropey::Rope;

/// The slice of a text buffer the structure parser needs.
///
/// Offsets are counted in Unicode scalar values, lines are 0-based and separated by `\n`.
pub trait TextBuffer {
    fn char_count(&self) -> usize;

    fn line_count(&self) -> usize;

    /// Char offset of the first character of `line`.
    ///
    /// `line == line_count()` is allowed and yields `char_count()`.
    fn line_to_char(&self, line: usize) -> usize;

    /// Text between the char offsets `start` (inclusive) and `end` (exclusive).
    fn text(&self, start: usize, end: usize) -> String;
}

impl TextBuffer for Rope {
    fn char_count(&self) -> usize {
        self.len_chars()
    }

    fn line_count(&self) -> usize {
        self.len_lines()
    }

    fn line_to_char(&self, line: usize) -> usize {
        Rope::line_to_char(self, line.min(self.len_lines()))
    }

    fn text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.len_chars());
        self.slice(start.min(end)..end).to_string()
    }
}

impl TextBuffer for str {
    fn char_count(&self) -> usize {
        self.chars().count()
    }

    fn line_count(&self) -> usize {
        self.matches('\n').count() + 1
    }

    fn line_to_char(&self, line: usize) -> usize {
        if line == 0 {
            return 0;
        }

        self.char_indices()
            .filter(|(_, c)| *c == '\n')
            .enumerate()
            .find(|(i, _)| i + 1 == line)
            .map(|(_, (byte, _))| self[..=byte].chars().count())
            .unwrap_or_else(|| self.chars().count())
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars().skip(start).take(end.saturating_sub(start)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rope_and_str_agree_on_lines() {
        let text = "first\nsécond\n\nlast";
        let rope = Rope::from_str(text);

        assert_eq!(rope.line_count(), text.line_count());
        assert_eq!(rope.char_count(), text.char_count());
        for line in 0..=text.line_count() {
            assert_eq!(
                TextBuffer::line_to_char(&rope, line),
                TextBuffer::line_to_char(text, line),
                "line {line}"
            );
        }
        assert_eq!(rope.text(6, 12), "sécond");
        assert_eq!(text.text(6, 12), "sécond");
    }

    #[test]
    fn carriage_returns_are_not_line_breaks() {
        let rope = Rope::from_str("a\r\nb\rc");

        assert_eq!(rope.line_count(), 2);
        assert_eq!(TextBuffer::line_to_char(&rope, 1), 3);
    }
}
