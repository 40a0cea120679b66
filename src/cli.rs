//! Command line interface for the `texindex` binary.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::{
    document::Document,
    parser::{BlockKind, StructureIndex},
};

#[derive(Parser, Debug)]
#[command(name = "texindex", version, about = "Structure and symbol index for LaTeX sources")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the language server on stdin/stdout (the default)
    Serve,
    /// Print the blocks and symbols of a LaTeX file
    Index {
        file: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Parses `file` in one pass and renders its index.
pub fn index(file: &Path, json: bool) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let document = Document::new(&text);

    if json {
        return Ok(serde_json::to_string_pretty(document.index())?);
    }

    Ok(render(document.index()))
}

/// Plain-text listing of an index.
pub fn render(index: &StructureIndex) -> String {
    let mut out = String::from("blocks:\n");

    for block in &index.blocks {
        let name = match &block.kind {
            BlockKind::Environment(name) => format!("{{{name}}}"),
            BlockKind::Section(level) => format!("\\{}", level.command()),
        };
        out.push_str(&format!(
            "  {name:<20} lines {}-{}  chars {}-{}\n",
            block.start_line + 1,
            block.end_line + 1,
            block.start_offset,
            block.end_offset
        ));
    }

    let symbols = &index.symbols;
    for (title, items) in [
        ("labels", &symbols.labels),
        ("included files", &symbols.included_latex_files),
        ("bibliographies", &symbols.bibliographies),
        ("bibitems", &symbols.bibitems),
        ("packages", &symbols.packages),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{title}:\n"));
        out.extend(items.iter().map(|item| format!("  {item}\n")));
    }

    out
}
