//! Reconstruction of the block tree from structural matches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::scan::{StructuralKind, StructuralMatch};

/// LaTeX sectioning depth, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionLevel {
    Part,
    Chapter,
    Section,
    Subsection,
    Subsubsection,
}

impl SectionLevel {
    pub const COUNT: usize = 5;

    pub fn from_command(command: &str) -> Option<SectionLevel> {
        match command {
            "part" => Some(SectionLevel::Part),
            "chapter" => Some(SectionLevel::Chapter),
            "section" => Some(SectionLevel::Section),
            "subsection" => Some(SectionLevel::Subsection),
            "subsubsection" => Some(SectionLevel::Subsubsection),
            _ => None,
        }
    }

    pub fn command(&self) -> &'static str {
        match self {
            SectionLevel::Part => "part",
            SectionLevel::Chapter => "chapter",
            SectionLevel::Section => "section",
            SectionLevel::Subsection => "subsection",
            SectionLevel::Subsubsection => "subsubsection",
        }
    }

    /// 0 for `\part` through 4 for `\subsubsection`.
    pub fn depth(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Environment(String),
    Section(SectionLevel),
}

/// A foldable region of the document.
///
/// `end_offset` and `end_line` are inclusive: they name the last character that belongs
/// to the block and the line it sits on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub start_offset: usize,
    pub end_offset: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl Block {
    pub fn contains(&self, other: &Block) -> bool {
        self.start_offset <= other.start_offset && other.end_offset <= self.end_offset
    }

    pub fn is_multiline(&self) -> bool {
        self.end_line > self.start_line
    }
}

/// A point in the document: char offset and line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
    offset: usize,
    line: usize,
}

/// Builds the block tree from every structural match in the document.
///
/// `char_count` and `line_count` describe the whole document and bound sectioning blocks
/// that run to the end of the text.
pub fn parse_blocks(
    matches: &[StructuralMatch],
    char_count: usize,
    line_count: usize,
) -> Vec<Block> {
    let mut open: HashMap<&str, Vec<&StructuralMatch>> = HashMap::new();
    let mut document_end: Option<Mark> = None;
    let mut blocks = Vec::new();
    let mut sections = Vec::new();

    for token in matches {
        match &token.kind {
            StructuralKind::Begin(name) => open.entry(name.as_str()).or_default().push(token),
            StructuralKind::End(name) => {
                if name == "document" && document_end.is_none() {
                    document_end = Some(Mark {
                        offset: token.start,
                        line: token.line,
                    });
                }

                let Some(begin) = open.get_mut(name.as_str()).and_then(Vec::pop) else {
                    continue;
                };
                blocks.push(Block {
                    kind: BlockKind::Environment(name.clone()),
                    start_offset: begin.start,
                    end_offset: token.end.saturating_sub(1).max(begin.start),
                    start_line: begin.line,
                    end_line: token.line,
                });
            }
            StructuralKind::Section(level) => sections.push((token, *level)),
        }
    }

    let document_tail = Mark {
        offset: char_count,
        line: line_count.saturating_sub(1),
    };

    // Walking backwards, `following[d]` is the closest later sectioning command at depth d
    // or coarser.
    let mut following: [Option<Mark>; SectionLevel::COUNT] = [None; SectionLevel::COUNT];
    for (token, level) in sections.into_iter().rev() {
        let start = Mark {
            offset: token.start,
            line: token.line,
        };

        let next = following[level.depth()]
            .or_else(|| document_end.filter(|end| end.offset > start.offset));

        let (end_offset, end_line) = match next {
            Some(next) => (next.offset - 1, next.line.saturating_sub(1).max(start.line)),
            None => (
                document_tail.offset.saturating_sub(1).max(start.offset),
                document_tail.line.max(start.line),
            ),
        };

        blocks.push(Block {
            kind: BlockKind::Section(level),
            start_offset: start.offset,
            end_offset,
            start_line: start.line,
            end_line,
        });

        for slot in following.iter_mut().skip(level.depth()) {
            *slot = Some(start);
        }
    }

    blocks.sort_by_key(|block| block.start_offset);
    blocks
}
