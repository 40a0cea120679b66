//! Shared test utilities for texindex.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use crate::document::Document;
use crate::parser::StructureParser;

/// A small LaTeX document touching every kind of match the parser knows.
pub const SAMPLE: &str = r"\documentclass{article}
\usepackage[utf8]{inputenc}
\usepackage{amsmath, graphicx}
\addbibresource{library.bib}

\begin{document}
\part{Prelude}
\chapter{Introduction}\label{ch:intro}
Text with a citation.
\section{Motivation}
\begin{figure}
  \includegraphics{plot}
  \label{fig:plot}
\end{figure}
\subsection{Details}
\input{details}
\begin{itemize}
  \item one
  \begin{itemize}
    \item nested
  \end{itemize}
\end{itemize}
\section{Related work}
\subsubsection{Older}
\chapter{Results}
\begin{equation}\label{eq:main}
  e = mc^2
\end{equation}
\bibliography{refs,more.bib}
\begin{thebibliography}{9}
\bibitem{knuth} Knuth.
\bibitem[L94]{lamport} Lamport.
\end{thebibliography}
\end{document}
";

/// Builds a document by typing `text` into an empty buffer one character at a time.
pub fn type_out(text: &str) -> Document {
    let mut document = Document::default();
    for (offset, c) in text.chars().enumerate() {
        document
            .insert(offset, c.encode_utf8(&mut [0; 4]))
            .expect("typing at the end of the document");
    }
    document
}

/// Asserts that the incrementally maintained state equals a fresh parse of the text.
pub fn assert_matches_full_parse(document: &Document) {
    let fresh = StructureParser::new(document.rope());
    let incremental = document.parser();

    assert_eq!(incremental.char_count(), fresh.char_count());
    assert_eq!(incremental.line_count(), fresh.line_count());
    assert_eq!(
        incremental.structural_matches(),
        fresh.structural_matches(),
        "structural matches diverged for {:?}",
        document.text()
    );
    assert_eq!(
        incremental.symbol_matches(),
        fresh.symbol_matches(),
        "symbol matches diverged for {:?}",
        document.text()
    );
    assert_eq!(incremental.index(), fresh.index());
}

/// Deterministic pseudo-random numbers for edit sequences.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Lcg {
        Lcg(seed)
    }

    /// A number in `0..bound`; `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}
