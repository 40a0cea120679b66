//! Folding ranges from the block tree.

use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind};

use crate::{
    config::Settings,
    document::Document,
    parser::{Block, BlockKind},
};

/// One folding range per block spanning more than one line.
///
/// Returns `None` when folding is disabled in [`Settings::folding`].
pub fn folding_ranges(document: &Document, settings: &Settings) -> Option<Vec<FoldingRange>> {
    if !settings.folding {
        return None;
    }

    Some(
        document
            .index()
            .blocks
            .iter()
            .filter(|block| block.is_multiline())
            .map(|block| FoldingRange {
                start_line: block.start_line as u32,
                end_line: block.end_line as u32,
                kind: Some(FoldingRangeKind::Region),
                collapsed_text: Some(collapsed_text(block)),
                ..Default::default()
            })
            .collect(),
    )
}

fn collapsed_text(block: &Block) -> String {
    match &block.kind {
        BlockKind::Environment(name) => format!("\\begin{{{name}}}…"),
        BlockKind::Section(level) => format!("\\{}…", level.command()),
    }
}
