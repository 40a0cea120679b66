//! Regex scanning of text fragments into positioned match records.
//!
//! Every pattern here is confined to a single line. The incremental parser relies on
//! that: re-scanning whole lines around an edit is enough to find every match the edit
//! could have created or destroyed.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::blocks::SectionLevel;

/// A structural token with its absolute position in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuralMatch {
    pub kind: StructuralKind,
    /// Char offset of the leading backslash.
    pub start: usize,
    /// Char offset one past the last character of the token.
    pub end: usize,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    Begin(String),
    End(String),
    Section(SectionLevel),
}

/// A symbol-defining command with its absolute position in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolMatch {
    pub kind: SymbolKind,
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Label(String),
    /// `\input` or `\include`, argument as written.
    Include(String),
    /// `\bibliography`, argument as written (comma separated).
    Bibliography(String),
    AddBibResource(String),
    UsePackage(Vec<PackageName>),
    BibItem(String),
}

/// One package named by a `\usepackage` statement, with the char span of the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Tokens recognised by the structural pass.
enum StructureToken<'t> {
    Newline,
    Begin(&'t str),
    End(&'t str),
    Section(SectionLevel),
}

static STRUCTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        (?<newline>\n)
        | \\(?<env>begin|end) \{ (?<name>[^{}\n]+) \}
        | \\(?<section>part|chapter|section|subsection|subsubsection) \*? (?:\[[^\[\]\n]*\])? \{
        ",
    )
    .expect("structure regex should compile")
});

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \\(?:
            label \{ (?<label>[^{}\n]+) \}
          | (?:input|include) \{ (?<include>[^{}\n]+) \}
          | bibliography \{ (?<bibliography>[^{}\n]+) \}
          | addbibresource (?:\[[^\[\]\n]*\])? \{ (?<addbibresource>[^{}\n]+) \}
          | usepackage (?:\[[^\[\]\n]*\])? \{ (?<usepackage>[^{}\n]+) \}
          | bibitem (?:\[[^\[\]\n]*\])? \{ (?<bibitem>[^{}\n]+) \}
        )
        ",
    )
    .expect("symbol regex should compile")
});

impl<'t> StructureToken<'t> {
    fn classify(captures: &Captures<'t>) -> Option<StructureToken<'t>> {
        if captures.name("newline").is_some() {
            return Some(StructureToken::Newline);
        }

        if let Some(level) = captures.name("section") {
            return SectionLevel::from_command(level.as_str()).map(StructureToken::Section);
        }

        let name = captures.name("name")?.as_str();
        match captures.name("env")?.as_str() {
            "begin" => Some(StructureToken::Begin(name)),
            _ => Some(StructureToken::End(name)),
        }
    }
}

/// Converts increasing byte positions in a fragment into absolute char offsets.
struct CharCursor<'t> {
    text: &'t str,
    byte: usize,
    offset: usize,
    line: usize,
}

impl<'t> CharCursor<'t> {
    fn new(text: &'t str, offset: usize, line: usize) -> Self {
        CharCursor {
            text,
            byte: 0,
            offset,
            line,
        }
    }

    fn advance_to(&mut self, byte: usize) -> usize {
        let segment = &self.text[self.byte..byte];
        self.offset += segment.chars().count();
        self.line += segment.matches('\n').count();
        self.byte = byte;
        self.offset
    }
}

/// Scans `fragment` for environment delimiters and sectioning commands.
///
/// `first_line` and `first_offset` are the absolute position of the fragment's first
/// character; the returned matches carry absolute positions.
pub fn parse_for_blocks(
    fragment: &str,
    first_line: usize,
    first_offset: usize,
) -> Vec<StructuralMatch> {
    let mut cursor = CharCursor::new(fragment, first_offset, first_line);
    let mut line = first_line;
    let mut matches = Vec::new();

    for captures in STRUCTURE_RE.captures_iter(fragment) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let Some(token) = StructureToken::classify(&captures) else {
            continue;
        };

        let kind = match token {
            StructureToken::Newline => {
                line += 1;
                continue;
            }
            StructureToken::Begin(name) => StructuralKind::Begin(name.to_string()),
            StructureToken::End(name) => StructuralKind::End(name.to_string()),
            StructureToken::Section(level) => StructuralKind::Section(level),
        };

        let start = cursor.advance_to(whole.start());
        let end = cursor.advance_to(whole.end());
        matches.push(StructuralMatch {
            kind,
            start,
            end,
            line,
        });
    }

    matches
}

/// Scans `fragment` for the symbol-defining commands.
pub fn parse_for_symbols(
    fragment: &str,
    first_line: usize,
    first_offset: usize,
) -> Vec<SymbolMatch> {
    let mut cursor = CharCursor::new(fragment, first_offset, first_line);

    SYMBOL_RE
        .captures_iter(fragment)
        .flat_map(|captures| {
            let whole = captures.get(0)?;
            let start = cursor.advance_to(whole.start());
            let line = cursor.line;

            let kind = if let Some(arg) = captures.name("label") {
                SymbolKind::Label(arg.as_str().trim().to_string())
            } else if let Some(arg) = captures.name("include") {
                SymbolKind::Include(arg.as_str().trim().to_string())
            } else if let Some(arg) = captures.name("bibliography") {
                SymbolKind::Bibliography(arg.as_str().to_string())
            } else if let Some(arg) = captures.name("addbibresource") {
                SymbolKind::AddBibResource(arg.as_str().trim().to_string())
            } else if let Some(arg) = captures.name("bibitem") {
                SymbolKind::BibItem(arg.as_str().trim().to_string())
            } else {
                let arg = captures.name("usepackage")?;
                let mut names = Vec::new();
                let mut item_byte = arg.start();
                for item in arg.as_str().split(',') {
                    let leading = item.len() - item.trim_start().len();
                    let name = item.trim();
                    if !name.is_empty() {
                        let name_start = cursor.advance_to(item_byte + leading);
                        let name_end = cursor.advance_to(item_byte + leading + name.len());
                        names.push(PackageName {
                            name: name.to_string(),
                            start: name_start,
                            end: name_end,
                        });
                    }
                    item_byte += item.len() + 1;
                }
                SymbolKind::UsePackage(names)
            };

            let end = cursor.advance_to(whole.end());
            Some(SymbolMatch {
                kind,
                start,
                end,
                line,
            })
        })
        .collect()
}

impl StructuralMatch {
    pub(crate) fn shifted(mut self, lines: isize, chars: isize) -> Self {
        self.line = shift(self.line, lines);
        self.start = shift(self.start, chars);
        self.end = shift(self.end, chars);
        self
    }
}

impl SymbolMatch {
    pub(crate) fn shifted(mut self, lines: isize, chars: isize) -> Self {
        self.line = shift(self.line, lines);
        self.start = shift(self.start, chars);
        self.end = shift(self.end, chars);
        if let SymbolKind::UsePackage(names) = &mut self.kind {
            for name in names.iter_mut() {
                name.start = shift(name.start, chars);
                name.end = shift(name.end, chars);
            }
        }
        self
    }
}

fn shift(value: usize, delta: isize) -> usize {
    value.saturating_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_tokens_carry_absolute_positions() {
        let text = "intro\n\\begin{itemize}\n  \\section*{Über}\n\\end{itemize}";

        let matches = parse_for_blocks(text, 10, 100);

        assert_eq!(
            matches,
            vec![
                StructuralMatch {
                    kind: StructuralKind::Begin("itemize".into()),
                    start: 106,
                    end: 121,
                    line: 11,
                },
                StructuralMatch {
                    kind: StructuralKind::Section(SectionLevel::Section),
                    start: 124,
                    end: 134,
                    line: 12,
                },
                StructuralMatch {
                    kind: StructuralKind::End("itemize".into()),
                    start: 140,
                    end: 153,
                    line: 13,
                },
            ]
        );
    }

    #[test]
    fn lookalike_commands_are_not_structure() {
        let text = r"\partial{x} \sectionmark{a} \beginning{b} \begin{} \subsubsection[s]{t}";

        let matches = parse_for_blocks(text, 0, 0);

        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].kind,
            StructuralKind::Section(SectionLevel::Subsubsection)
        );
    }

    #[test]
    fn symbol_commands_are_classified() {
        let text = "\\label{a}\\include{b}\\bibliography{c,d}\\addbibresource{e.bib}\n\\bibitem[X]{f}\\bibliographystyle{plain}\\includegraphics{g}";

        let kinds: Vec<_> = parse_for_symbols(text, 0, 0)
            .into_iter()
            .map(|m| (m.kind, m.line))
            .collect();

        assert_eq!(
            kinds,
            vec![
                (SymbolKind::Label("a".into()), 0),
                (SymbolKind::Include("b".into()), 0),
                (SymbolKind::Bibliography("c,d".into()), 0),
                (SymbolKind::AddBibResource("e.bib".into()), 0),
                (SymbolKind::BibItem("f".into()), 1),
            ]
        );
    }

    #[test]
    fn package_names_have_their_own_spans() {
        let text = "é\\usepackage[T1]{fontenc, amsmath}";

        let matches = parse_for_symbols(text, 3, 50);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 51);
        assert_eq!(matches[0].end, 51 + 33);
        assert_eq!(
            matches[0].kind,
            SymbolKind::UsePackage(vec![
                PackageName {
                    name: "fontenc".into(),
                    start: 51 + 16,
                    end: 51 + 23,
                },
                PackageName {
                    name: "amsmath".into(),
                    start: 51 + 25,
                    end: 51 + 32,
                },
            ])
        );
    }
}
