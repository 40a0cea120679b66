use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;
use tower_lsp::lsp_types::ClientCapabilities;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Serve folding ranges for environments and sections
    pub folding: bool,
    pub document_symbols: bool,
    pub completions: bool,
    /// List environments in the outline next to sections
    pub outline_environments: bool,
    pub max_completion_items: usize,
}

impl Settings {
    pub fn new(root_dir: &Path, capabilities: &ClientCapabilities) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/texindex/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.texindex",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("folding", true)?
            .set_default("document_symbols", true)?
            .set_default("completions", true)?
            .set_default("outline_environments", false)?
            .set_default("max_completion_items", 50)?
            .set_override_option(
                "folding",
                capabilities.text_document.as_ref().and_then(|it| {
                    match it.folding_range.is_none() {
                        true => Some(false),
                        false => None,
                    }
                }),
            )?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            folding: true,
            document_symbols: true,
            completions: true,
            outline_environments: false,
            max_completion_items: 50,
        }
    }
}
