//! An open LaTeX document: a rope buffer kept in step with its structure parser.

use std::ops::Range;

use ropey::Rope;
use thiserror::Error;

use crate::buffer::TextBuffer;
use crate::parser::{StructureIndex, StructureParser};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("offset {offset} is past the end of the document ({len} chars)")]
    OutOfBounds { offset: usize, len: usize },
    #[error("edit range {start}..{end} is inverted")]
    InvertedRange { start: usize, end: usize },
    #[error("package `{0}` is not loaded by this document")]
    UnknownPackage(String),
}

/// Buffer and parser for one document.
///
/// Every mutation goes through [`Document::insert`] or [`Document::delete`], which apply
/// the change to the rope first and then notify the parser, the same order an editor's
/// "changed" signal would.
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    parser: StructureParser,
}

impl Document {
    pub fn new(text: &str) -> Document {
        let rope = Rope::from_str(text);
        let parser = StructureParser::new(&rope);
        Document { rope, parser }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn parser(&self) -> &StructureParser {
        &self.parser
    }

    pub fn index(&self) -> &StructureIndex {
        self.parser.index()
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<&StructureIndex, EditError> {
        self.check_offset(offset)?;
        if text.is_empty() {
            return Ok(self.parser.index());
        }

        let line = self.rope.char_to_line(offset);
        self.rope.insert(offset, text);
        Ok(self.parser.on_insert(&self.rope, offset, line, text))
    }

    pub fn delete(&mut self, start: usize, end: usize) -> Result<&StructureIndex, EditError> {
        if start > end {
            return Err(EditError::InvertedRange { start, end });
        }
        self.check_offset(end)?;
        if start == end {
            return Ok(self.parser.index());
        }

        let start_line = self.rope.char_to_line(start);
        let end_line = self.rope.char_to_line(end);
        self.rope.remove(start..end);
        Ok(self
            .parser
            .on_delete(&self.rope, start, start_line, end, end_line))
    }

    /// Replaces `start..end` with `text` as a deletion followed by an insertion.
    pub fn replace(
        &mut self,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<&StructureIndex, EditError> {
        self.delete(start, end)?;
        self.insert(start, text)
    }

    /// Char range to delete so that `name` is no longer loaded.
    ///
    /// The whole `\usepackage` statement when it loads only `name`, otherwise the name
    /// and one adjoining comma.
    pub fn package_removal_range(&self, name: &str) -> Option<Range<usize>> {
        let location = self.parser.package_details().get(name)?;
        if location.siblings <= 1 {
            return Some(location.start..location.end);
        }

        let after = self.rope.text(location.name_end, location.end);
        let trailing = after.trim_start();
        if trailing.starts_with(',') {
            let comma_end =
                location.name_end + after.chars().count() - trailing.chars().count() + 1;
            let spaces = trailing[1..]
                .chars()
                .take_while(|c| c.is_whitespace())
                .count();
            return Some(location.name_start..comma_end + spaces);
        }

        let before = self.rope.text(location.start, location.name_start);
        let comma = before.rfind(',')?;
        Some(location.start + before[..comma].chars().count()..location.name_end)
    }

    /// Removes `name` from the last `\usepackage` statement that loads it.
    ///
    /// Repeats of `name` inside that statement go too. Earlier statements loading `name`
    /// are left alone, so removing a package that was just added restores the text.
    pub fn remove_package(&mut self, name: &str) -> Result<&StructureIndex, EditError> {
        let unknown = || EditError::UnknownPackage(name.to_string());
        let statement = self.parser.package_details().get(name).ok_or_else(unknown)?.start;

        loop {
            let range = self.package_removal_range(name).ok_or_else(unknown)?;
            self.delete(range.start, range.end)?;

            let repeated = self
                .parser
                .package_details()
                .get(name)
                .is_some_and(|location| location.start == statement);
            if !repeated {
                return Ok(self.parser.index());
            }
        }
    }

    fn check_offset(&self, offset: usize) -> Result<(), EditError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(EditError::OutOfBounds { offset, len });
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new("")
    }
}
