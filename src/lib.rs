//! texindex: an incremental structure index for LaTeX sources
//!
//! This crate keeps the structure of a LaTeX document up to date while it is being
//! edited, without rescanning the whole file on every keystroke.
//!
//! # Overview
//!
//! - **Symbol table**: labels, `\input`/`\include` files, bibliographies, bibitems and
//!   `\usepackage` packages with their locations
//! - **Block tree**: `\begin`/`\end` environments and `\part` through `\subsubsection`
//!   sectioning blocks, used for folding and the outline
//! - **Language server**: folding ranges, document symbols and key completion over LSP
//!
//! # Architecture
//!
//! - [`buffer`]: the read-only text access the parser needs ([`buffer::TextBuffer`])
//! - [`parser`]: the incremental parser and the index it maintains
//! - [`document`]: a `ropey` buffer kept in step with its parser
//! - [`folding`], [`symbol`], [`completion`]: consumers of the index
//! - [`server`]: the `tower-lsp` backend
//! - [`config`]: settings loaded with the `config` crate
//!
//! # Usage
//!
//! ```
//! use texindex::document::Document;
//!
//! let mut document = Document::new("\\begin{document}\n\\end{document}\n");
//! document.insert(17, "\\section{Intro}\\label{sec:intro}\n").unwrap();
//!
//! assert!(document.index().symbols.labels.contains("sec:intro"));
//! assert_eq!(document.index().blocks.len(), 2);
//! ```

// Core: text access, parsing, documents
pub mod buffer;
pub mod document;
pub mod parser;

// LSP feature modules
pub mod completion;
pub mod folding;
pub mod position;
pub mod server;
pub mod symbol;

// Configuration and command line
pub mod cli;
pub mod config;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
