//! Incremental structure parser for LaTeX sources.
//!
//! [`StructureParser`] keeps the raw regex matches of a document between edits. When the
//! buffer reports an insertion or deletion, only the edited lines and their immediate
//! neighbours are scanned again; matches before that region are kept as they are and
//! matches after it are moved by the edit's line and character deltas. The block tree
//! and symbol table are then rebuilt from the merged match list.
//!
//! # Example
//!
//! ```
//! use ropey::Rope;
//! use texindex::parser::StructureParser;
//!
//! let mut rope = Rope::from_str("\\begin{document}\n\\end{document}");
//! let mut parser = StructureParser::new(&rope);
//!
//! rope.insert(17, "\\label{intro}\n");
//! let index = parser.on_insert(&rope, 17, 1, "\\label{intro}\n");
//!
//! assert!(index.symbols.labels.contains("intro"));
//! assert_eq!(index.blocks.len(), 1);
//! ```

mod blocks;
mod scan;
mod symbols;

#[cfg(test)]
mod tests;

pub use blocks::{parse_blocks, Block, BlockKind, SectionLevel};
pub use scan::{
    parse_for_blocks, parse_for_symbols, PackageName, StructuralKind, StructuralMatch,
    SymbolKind, SymbolMatch,
};
pub use symbols::{parse_symbols, PackageLocation, SymbolTable};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::buffer::TextBuffer;

/// Everything derived from a document: its block tree and symbol table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureIndex {
    pub blocks: Vec<Block>,
    pub symbols: SymbolTable,
}

/// Incremental parse state for one open document.
#[derive(Debug, Clone, Default)]
pub struct StructureParser {
    char_count: usize,
    line_count: usize,
    structural: Vec<StructuralMatch>,
    symbol_matches: Vec<SymbolMatch>,
    index: StructureIndex,
}

/// An edit expressed in lines: old lines `first_line..=old_last_line` became new lines
/// `first_line..=new_last_line`, and the text grew by `char_delta` characters.
#[derive(Debug, Clone, Copy)]
struct LineEdit {
    first_line: usize,
    old_last_line: usize,
    new_last_line: usize,
    char_delta: isize,
}

impl LineEdit {
    fn line_delta(&self) -> isize {
        self.new_last_line as isize - self.old_last_line as isize
    }
}

impl StructureParser {
    /// Parses the whole buffer in one pass.
    pub fn new<B: TextBuffer + ?Sized>(buffer: &B) -> StructureParser {
        let mut parser = StructureParser::default();
        parser.reset(buffer);
        parser
    }

    /// Discards all state and parses the whole buffer again.
    pub fn reset<B: TextBuffer + ?Sized>(&mut self, buffer: &B) -> &StructureIndex {
        self.char_count = buffer.char_count();
        self.line_count = buffer.line_count();

        let text = buffer.text(0, self.char_count);
        self.structural = parse_for_blocks(&text, 0, 0);
        self.symbol_matches = parse_for_symbols(&text, 0, 0);

        debug!(
            chars = self.char_count,
            lines = self.line_count,
            structural = self.structural.len(),
            symbols = self.symbol_matches.len(),
            "parsed document"
        );

        self.rebuild_index()
    }

    /// Updates the index after `text` was inserted at `offset` on `line`.
    ///
    /// `buffer` must already contain the inserted text.
    pub fn on_insert<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &B,
        offset: usize,
        line: usize,
        text: &str,
    ) -> &StructureIndex {
        let newlines = text.matches('\n').count();
        let chars = text.chars().count();
        debug!(offset, line, chars, newlines, "insert");

        self.apply(
            buffer,
            LineEdit {
                first_line: line,
                old_last_line: line,
                new_last_line: line + newlines,
                char_delta: chars as isize,
            },
        )
    }

    /// Updates the index after the chars `start_offset..end_offset` were deleted.
    ///
    /// `start_line` and `end_line` are the lines of the two ends before the deletion;
    /// `buffer` must already reflect it.
    pub fn on_delete<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &B,
        start_offset: usize,
        start_line: usize,
        end_offset: usize,
        end_line: usize,
    ) -> &StructureIndex {
        debug!(start_offset, start_line, end_offset, end_line, "delete");

        self.apply(
            buffer,
            LineEdit {
                first_line: start_line,
                old_last_line: end_line.max(start_line),
                new_last_line: start_line,
                char_delta: -(end_offset.saturating_sub(start_offset) as isize),
            },
        )
    }

    fn apply<B: TextBuffer + ?Sized>(&mut self, buffer: &B, edit: LineEdit) -> &StructureIndex {
        let line_delta = edit.line_delta();
        self.char_count = self.char_count.saturating_add_signed(edit.char_delta);
        self.line_count = self.line_count.saturating_add_signed(line_delta);

        if self.char_count != buffer.char_count() || self.line_count != buffer.line_count() {
            warn!(
                tracked_chars = self.char_count,
                buffer_chars = buffer.char_count(),
                tracked_lines = self.line_count,
                buffer_lines = buffer.line_count(),
                "edit notification out of step with buffer, reparsing everything"
            );
            return self.reset(buffer);
        }

        // The edited lines plus one full line on either side.
        let region_start = edit.first_line.saturating_sub(1);
        let region_end = (edit.new_last_line + 1).min(self.line_count - 1);
        let old_region_end = (region_end as isize - line_delta) as usize;

        let start_char = buffer.line_to_char(region_start);
        let end_char = buffer.line_to_char(region_end + 1);
        let fragment = buffer.text(start_char, end_char);

        self.structural = splice(
            std::mem::take(&mut self.structural),
            parse_for_blocks(&fragment, region_start, start_char),
            |m| m.line,
            region_start,
            old_region_end,
            |m| m.shifted(line_delta, edit.char_delta),
        );
        self.symbol_matches = splice(
            std::mem::take(&mut self.symbol_matches),
            parse_for_symbols(&fragment, region_start, start_char),
            |m| m.line,
            region_start,
            old_region_end,
            |m| m.shifted(line_delta, edit.char_delta),
        );

        debug!(
            region_start,
            region_end,
            rescanned_chars = end_char - start_char,
            structural = self.structural.len(),
            symbols = self.symbol_matches.len(),
            "reparsed edited region"
        );

        self.rebuild_index()
    }

    fn rebuild_index(&mut self) -> &StructureIndex {
        self.index = StructureIndex {
            blocks: parse_blocks(&self.structural, self.char_count, self.line_count),
            symbols: parse_symbols(&self.symbol_matches),
        };
        &self.index
    }

    pub fn index(&self) -> &StructureIndex {
        &self.index
    }

    pub fn blocks(&self) -> &[Block] {
        &self.index.blocks
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.index.symbols.labels
    }

    pub fn included_latex_files(&self) -> &BTreeSet<String> {
        &self.index.symbols.included_latex_files
    }

    pub fn bibliography_files(&self) -> &BTreeSet<String> {
        &self.index.symbols.bibliographies
    }

    pub fn bibitems(&self) -> &BTreeSet<String> {
        &self.index.symbols.bibitems
    }

    pub fn packages(&self) -> &BTreeSet<String> {
        &self.index.symbols.packages
    }

    pub fn package_details(&self) -> &BTreeMap<String, PackageLocation> {
        &self.index.symbols.packages_detailed
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn structural_matches(&self) -> &[StructuralMatch] {
        &self.structural
    }

    pub fn symbol_matches(&self) -> &[SymbolMatch] {
        &self.symbol_matches
    }
}

/// Replaces the matches on old lines `first..=old_last` with `rescanned` and moves every
/// match after that range with `rebase`. `old` must be sorted by line.
fn splice<T>(
    old: Vec<T>,
    rescanned: Vec<T>,
    line_of: impl Fn(&T) -> usize,
    first: usize,
    old_last: usize,
    rebase: impl Fn(T) -> T,
) -> Vec<T> {
    let kept_len = old.partition_point(|m| line_of(m) < first);
    let tail_start = old.partition_point(|m| line_of(m) <= old_last);

    let mut old = old.into_iter();
    let mut merged: Vec<T> = old.by_ref().take(kept_len).collect();
    merged.extend(rescanned);
    merged.extend(old.skip(tail_start - kept_len).map(rebase));
    merged
}
