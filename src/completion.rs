//! Completion of reference keys from the symbol table.
//!
//! | Typed context | Candidates |
//! |---------------|------------|
//! | `\ref{`, `\eqref{`, `\cref{`, ... | labels |
//! | `\cite{`, `\citep{a,`, `\parencite{`, ... | bibitems |
//! | `\input{`, `\include{` | included files, without `.tex` |

use itertools::Itertools;
use nucleo_matcher::{
    pattern::{self, Normalization},
    Matcher,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionList, CompletionResponse, Position,
};

use crate::{buffer::TextBuffer, config::Settings, document::Document, position::position_to_char};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyContext {
    Label,
    Citation,
    File,
}

/// What the cursor is completing: the kind of key and the part already typed.
#[derive(Debug, PartialEq, Eq)]
struct CompletionContext<'a> {
    kind: KeyContext,
    partial: &'a str,
}

static KEY_ARGUMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \\(?:
            (?<label>ref|eqref|pageref|autoref|nameref|vref|cref|Cref)
          | (?<citation>[A-Za-z]*cite[A-Za-z]*)
          | (?<file>input|include)
        )
        \*? (?:\[[^\[\]]*\])* \{ (?<keys>[^{}]*) $
        ",
    )
    .expect("completion regex should compile")
});

impl<'a> CompletionContext<'a> {
    /// `line` is the text of the current line up to the cursor.
    fn construct(line: &'a str) -> Option<CompletionContext<'a>> {
        let captures = KEY_ARGUMENT_RE.captures(line)?;
        let kind = if captures.name("label").is_some() {
            KeyContext::Label
        } else if captures.name("citation").is_some() {
            KeyContext::Citation
        } else {
            KeyContext::File
        };

        let keys = captures.name("keys")?.as_str();
        let partial = match kind {
            KeyContext::File => keys,
            _ => keys.rsplit(',').next().unwrap_or(keys),
        };

        Some(CompletionContext {
            kind,
            partial: partial.trim_start(),
        })
    }
}

pub fn get_completions(
    document: &Document,
    position: Position,
    settings: &Settings,
) -> Option<CompletionResponse> {
    if !settings.completions {
        return None;
    }

    let rope = document.rope();
    let cursor = position_to_char(rope, position)?;
    let line_start = TextBuffer::line_to_char(rope, position.line as usize);
    let line = rope.text(line_start, cursor);
    let context = CompletionContext::construct(&line)?;

    let symbols = &document.index().symbols;
    let (candidates, item_kind): (Vec<String>, _) = match context.kind {
        KeyContext::Label => (
            symbols.labels.iter().cloned().collect(),
            CompletionItemKind::REFERENCE,
        ),
        KeyContext::Citation => (
            symbols.bibitems.iter().cloned().collect(),
            CompletionItemKind::VALUE,
        ),
        KeyContext::File => (
            symbols
                .included_latex_files
                .iter()
                .map(|file| file.strip_suffix(".tex").unwrap_or(file).to_string())
                .collect(),
            CompletionItemKind::FILE,
        ),
    };

    let items = rank(candidates, context.partial)
        .into_iter()
        .take(settings.max_completion_items)
        .map(|label| CompletionItem {
            label,
            kind: Some(item_kind),
            ..Default::default()
        })
        .collect_vec();

    Some(CompletionResponse::List(CompletionList {
        is_incomplete: true,
        items,
    }))
}

/// Orders candidates by fuzzy score against `partial`, dropping non-matches.
fn rank(candidates: Vec<String>, partial: &str) -> Vec<String> {
    if partial.is_empty() {
        return candidates;
    }

    let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
    let pattern =
        pattern::Pattern::parse(partial, pattern::CaseMatching::Smart, Normalization::Smart);
    let mut buf = Vec::new();

    candidates
        .into_iter()
        .flat_map(|candidate| {
            let score =
                pattern.score(nucleo_matcher::Utf32Str::new(&candidate, &mut buf), &mut matcher)?;
            Some((score, candidate))
        })
        .sorted_by(|(a, _), (b, _)| Ord::cmp(b, a))
        .map(|(_, candidate)| candidate)
        .collect()
}
