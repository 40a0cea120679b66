use std::collections::BTreeSet;

use crate::document::Document;
use crate::parser::{BlockKind, SectionLevel};
use crate::test_utils::{assert_matches_full_parse, SAMPLE};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn article_typed_line_by_line() {
    let lines = [
        "\\documentclass{article}\n",
        "\\begin{document}\n",
        "\\section{Intro}\n",
        "\\label{sec:intro}\n",
        "\\end{document}\n",
    ];
    let mut document = Document::default();
    for line in lines {
        let end = document.rope().len_chars();
        document.insert(end, line).unwrap();
    }
    let text = lines.concat();
    let begin_document = text.find("\\begin{document}").unwrap();
    let section = text.find("\\section").unwrap();
    let end_document = text.find("\\end{document}").unwrap();

    let index = document.index();

    assert_eq!(index.symbols.labels, set(&["sec:intro"]));
    assert_eq!(index.blocks.len(), 2);

    let body = &index.blocks[0];
    assert_eq!(body.kind, BlockKind::Environment("document".into()));
    assert_eq!(body.start_offset, begin_document);
    assert_eq!(body.end_offset, end_document + "\\end{document}".len() - 1);
    assert_eq!((body.start_line, body.end_line), (1, 4));

    let intro = &index.blocks[1];
    assert_eq!(intro.kind, BlockKind::Section(SectionLevel::Section));
    assert_eq!(intro.start_offset, section);
    assert_eq!(intro.end_offset, end_document - 1);
    assert_eq!((intro.start_line, intro.end_line), (2, 3));
    assert!(body.contains(intro));
    assert_matches_full_parse(&document);
}

#[test]
fn sample_document_index() {
    let document = Document::new(SAMPLE);
    let symbols = &document.index().symbols;

    assert_eq!(symbols.labels, set(&["ch:intro", "fig:plot", "eq:main"]));
    assert_eq!(symbols.included_latex_files, set(&["details.tex"]));
    assert_eq!(
        symbols.bibliographies,
        set(&["library.bib", "refs.bib", "more.bib"])
    );
    assert_eq!(symbols.bibitems, set(&["knuth", "lamport"]));
    assert_eq!(symbols.packages, set(&["inputenc", "amsmath", "graphicx"]));
    assert_eq!(
        symbols.packages_detailed["graphicx"].start,
        SAMPLE.find("\\usepackage{amsmath").unwrap()
    );

    let kinds: Vec<_> = document
        .index()
        .blocks
        .iter()
        .map(|block| match &block.kind {
            BlockKind::Environment(name) => name.clone(),
            BlockKind::Section(level) => level.command().to_string(),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "document",
            "part",
            "chapter",
            "section",
            "figure",
            "subsection",
            "itemize",
            "itemize",
            "section",
            "subsubsection",
            "chapter",
            "equation",
            "thebibliography",
        ]
    );

    let blocks = &document.index().blocks;
    assert!(blocks
        .windows(2)
        .all(|pair| pair[0].start_offset <= pair[1].start_offset));
    assert!(blocks.iter().all(|b| b.end_offset >= b.start_offset));
    // The part runs until `\end{document}`, the first chapter until the second.
    let end_document = SAMPLE.find("\\end{document}").unwrap();
    assert_eq!(blocks[1].end_offset, end_document - 1);
    assert_eq!(
        blocks[2].end_offset,
        SAMPLE.find("\\chapter{Results}").unwrap() - 1
    );
}

#[test]
fn removing_a_freshly_typed_package() {
    let original = SAMPLE;
    let mut document = Document::new(original);
    let at = original.find("\\addbibresource").unwrap();

    for (i, c) in "\\usepackage{foo}".chars().enumerate() {
        document.insert(at + i, c.encode_utf8(&mut [0; 4])).unwrap();
    }
    assert!(document.index().symbols.packages.contains("foo"));

    document.remove_package("foo").unwrap();

    assert_eq!(document.text(), original);
    assert!(!document.index().symbols.packages.contains("foo"));
    assert_matches_full_parse(&document);
}

#[test]
fn unicode_text_keeps_char_offsets() {
    let mut document = Document::new("Ünïcödé\n\\begin{é}\n\\end{é}\n");

    document.insert(0, "日本語\n").unwrap();

    let block = &document.index().blocks[0];
    assert_eq!(block.start_offset, 12);
    assert_eq!(block.start_line, 2);
    assert_matches_full_parse(&document);
}
