//! The symbol table: labels, included files, bibliographies, bibitems and packages.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::scan::{SymbolKind, SymbolMatch};

/// Where a package is loaded.
///
/// `start`/`end` span the whole `\usepackage` statement (end exclusive). `name_start`/
/// `name_end` span this package's name inside the braces, which differs from the
/// statement when several packages share one `\usepackage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageLocation {
    pub start: usize,
    pub end: usize,
    pub name_start: usize,
    pub name_end: usize,
    /// Number of packages named by the statement.
    pub siblings: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    pub labels: BTreeSet<String>,
    pub included_latex_files: BTreeSet<String>,
    pub bibliographies: BTreeSet<String>,
    pub bibitems: BTreeSet<String>,
    pub packages: BTreeSet<String>,
    /// Last statement loading each package.
    pub packages_detailed: BTreeMap<String, PackageLocation>,
}

/// Derives the symbol table from every symbol match in the document.
pub fn parse_symbols(matches: &[SymbolMatch]) -> SymbolTable {
    let mut table = SymbolTable::default();

    for symbol in matches {
        match &symbol.kind {
            SymbolKind::Label(name) => {
                table.labels.insert(name.clone());
            }
            SymbolKind::Include(file) => {
                table.included_latex_files.insert(with_extension(file, ".tex"));
            }
            SymbolKind::Bibliography(files) => {
                table.bibliographies.extend(
                    files
                        .split(',')
                        .map(str::trim)
                        .filter(|file| !file.is_empty())
                        .map(|file| with_extension(file, ".bib")),
                );
            }
            SymbolKind::AddBibResource(file) => {
                table.bibliographies.insert(file.clone());
            }
            SymbolKind::BibItem(key) => {
                table.bibitems.insert(key.clone());
            }
            SymbolKind::UsePackage(names) => {
                for package in names {
                    table.packages.insert(package.name.clone());
                    table.packages_detailed.insert(
                        package.name.clone(),
                        PackageLocation {
                            start: symbol.start,
                            end: symbol.end,
                            name_start: package.start,
                            name_end: package.end,
                            siblings: names.len(),
                        },
                    );
                }
            }
        }
    }

    table
}

fn with_extension(file: &str, extension: &str) -> String {
    if file.ends_with(extension) {
        file.to_string()
    } else {
        format!("{file}{extension}")
    }
}
