//! Document outline for LaTeX sources.
//!
//! Implements `textDocument/documentSymbol` from the block tree and the label matches:
//!
//! | Symbol Type | LSP Kind | Example |
//! |-------------|----------|---------|
//! | Part, chapter | `Module` | `\chapter{Results}` |
//! | Section levels | `Struct` | `\subsection{Setup}` |
//! | Environments (optional) | `Object` | `\begin{theorem}` |
//! | Labels | `Key` | `\label{eq:main}` |
//!
//! Symbols nest by containment of their char ranges, in document order.

use itertools::Itertools;
use tower_lsp::lsp_types::{DocumentSymbol, DocumentSymbolResponse, SymbolKind};

use crate::{
    buffer::TextBuffer,
    config::Settings,
    document::Document,
    parser::{BlockKind, SectionLevel, SymbolKind as MatchKind},
    position::char_range,
};

/// An outline entry before nesting. `end` is exclusive.
#[derive(Debug)]
struct FlatSymbol {
    name: String,
    detail: Option<String>,
    kind: SymbolKind,
    start: usize,
    end: usize,
}

pub fn document_symbol(
    document: &Document,
    settings: &Settings,
) -> Option<DocumentSymbolResponse> {
    if !settings.document_symbols {
        return None;
    }

    let blocks = document
        .index()
        .blocks
        .iter()
        .filter_map(|block| {
            let (name, detail, kind) = match &block.kind {
                BlockKind::Section(level) => (
                    section_title(document, block.start_offset)
                        .unwrap_or_else(|| format!("\\{}", level.command())),
                    Some(level.command().to_string()),
                    match level {
                        SectionLevel::Part | SectionLevel::Chapter => SymbolKind::MODULE,
                        _ => SymbolKind::STRUCT,
                    },
                ),
                BlockKind::Environment(name) if settings.outline_environments => {
                    (name.clone(), Some("environment".to_string()), SymbolKind::OBJECT)
                }
                BlockKind::Environment(_) => return None,
            };

            Some(FlatSymbol {
                name,
                detail,
                kind,
                start: block.start_offset,
                end: block.end_offset + 1,
            })
        });

    let labels = document
        .parser()
        .symbol_matches()
        .iter()
        .filter_map(|symbol| match &symbol.kind {
            MatchKind::Label(name) => Some(FlatSymbol {
                name: name.clone(),
                detail: Some("label".to_string()),
                kind: SymbolKind::KEY,
                start: symbol.start,
                end: symbol.end,
            }),
            _ => None,
        });

    let flat = blocks
        .merge_by(labels, |a, b| a.start <= b.start)
        .collect_vec();

    Some(DocumentSymbolResponse::Nested(nest(document, flat)))
}

/// Title of the sectioning command starting at `offset`: the braced argument on its line.
fn section_title(document: &Document, offset: usize) -> Option<String> {
    let rope = document.rope();
    let line = rope.char_to_line(offset);
    let line_end = TextBuffer::line_to_char(rope, line + 1);
    let text = rope.text(offset, line_end);

    let open = text.find('{')?;
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let title = text[open + 1..open + i].trim();
                    return (!title.is_empty()).then(|| title.to_string());
                }
            }
            _ => {}
        }
    }

    // Unclosed on this line: everything after the brace.
    let title = text[open + 1..].trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn nest(document: &Document, flat: Vec<FlatSymbol>) -> Vec<DocumentSymbol> {
    let mut roots = Vec::new();
    let mut stack: Vec<(usize, DocumentSymbol)> = Vec::new();

    for symbol in flat {
        while let Some((end, _)) = stack.last() {
            if symbol.end <= *end {
                break;
            }
            if let Some((_, finished)) = stack.pop() {
                attach(&mut stack, &mut roots, finished);
            }
        }

        let range = char_range(document.rope(), symbol.start, symbol.end);
        #[allow(deprecated)] // field deprecated has been deprecated in favor of using tags and will be removed in the future
        let lsp_symbol = DocumentSymbol {
            name: symbol.name,
            detail: symbol.detail,
            kind: symbol.kind,
            tags: None,
            deprecated: None,
            range,
            selection_range: range,
            children: None,
        };
        stack.push((symbol.end, lsp_symbol));
    }

    while let Some((_, finished)) = stack.pop() {
        attach(&mut stack, &mut roots, finished);
    }

    roots
}

fn attach(
    stack: &mut [(usize, DocumentSymbol)],
    roots: &mut Vec<DocumentSymbol>,
    symbol: DocumentSymbol,
) {
    match stack.last_mut() {
        Some((_, parent)) => parent.children.get_or_insert_with(Vec::new).push(symbol),
        None => roots.push(symbol),
    }
}
