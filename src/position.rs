//! Conversions between char offsets and LSP positions (UTF-16 columns).

use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range};

pub fn char_to_position(rope: &Rope, offset: usize) -> Position {
    let offset = offset.min(rope.len_chars());
    let line = rope.char_to_line(offset);
    let line_start = rope.line_to_char(line);
    let character = rope.char_to_utf16_cu(offset) - rope.char_to_utf16_cu(line_start);

    Position {
        line: line as u32,
        character: character as u32,
    }
}

/// LSP range covering the chars `start..end`.
pub fn char_range(rope: &Rope, start: usize, end: usize) -> Range {
    Range {
        start: char_to_position(rope, start),
        end: char_to_position(rope, end),
    }
}

/// Char offset of an LSP position, or `None` when the line does not exist.
///
/// Columns past the end of the line clamp to the line end.
pub fn position_to_char(rope: &Rope, position: Position) -> Option<usize> {
    let line = position.line as usize;
    if line >= rope.len_lines() {
        return None;
    }

    let line_start = rope.line_to_char(line);
    let line_end = match line + 1 < rope.len_lines() {
        true => rope.line_to_char(line + 1) - 1,
        false => rope.len_chars(),
    };

    let target = rope.char_to_utf16_cu(line_start) + position.character as usize;
    let target = target.min(rope.char_to_utf16_cu(line_end));

    Some(rope.utf16_cu_to_char(target))
}
