//! The `tower-lsp` front end.
//!
//! Keeps one [`Document`] per open URI. Incremental `didChange` events become
//! [`Document::replace`] calls, so the structure index is updated edit by edit rather
//! than by reparsing the whole file.

use std::{collections::HashMap, path::PathBuf};

use tokio::sync::RwLock;
use tower_lsp::{
    jsonrpc::Result,
    lsp_types::{
        CompletionOptions, CompletionParams, CompletionResponse, DidChangeTextDocumentParams,
        DidCloseTextDocumentParams, DidOpenTextDocumentParams, DocumentSymbolParams,
        DocumentSymbolResponse, FoldingRange, FoldingRangeParams,
        FoldingRangeProviderCapability, InitializeParams, InitializeResult, InitializedParams,
        MessageType, OneOf, ServerCapabilities, ServerInfo, TextDocumentContentChangeEvent,
        TextDocumentSyncCapability, TextDocumentSyncKind, Url,
    },
    Client, LanguageServer, LspService, Server,
};
use tracing::{debug, info, warn};

use crate::{
    completion, config::Settings, document::Document, folding, position::position_to_char,
    symbol,
};

pub struct Backend {
    client: Client,
    documents: RwLock<HashMap<Url, Document>>,
    settings: RwLock<Settings>,
}

impl Backend {
    pub fn new(client: Client) -> Backend {
        Backend {
            client,
            documents: RwLock::new(HashMap::new()),
            settings: RwLock::new(Settings::default()),
        }
    }
}

/// Applies one content change to `document`.
///
/// A change without a range replaces the whole text.
pub fn apply_change(document: &mut Document, change: TextDocumentContentChangeEvent) {
    let Some(range) = change.range else {
        *document = Document::new(&change.text);
        return;
    };

    let rope = document.rope();
    let (Some(start), Some(end)) = (
        position_to_char(rope, range.start),
        position_to_char(rope, range.end),
    ) else {
        warn!(?range, "change outside the document");
        return;
    };

    if let Err(err) = document.replace(start, end, &change.text) {
        warn!(%err, ?range, "rejected change");
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root_dir = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        match Settings::new(&root_dir, &params.capabilities) {
            Ok(settings) => *self.settings.write().await = settings,
            Err(err) => {
                warn!(%err, "falling back to default settings");
                self.client
                    .log_message(MessageType::WARNING, format!("texindex settings: {err}"))
                    .await;
            }
        }

        info!(root = %root_dir.display(), "initialized");

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec!["{".to_string(), ",".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "texindex ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("shutdown");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(%uri, "open");
        self.documents
            .write()
            .await
            .insert(uri, Document::new(&params.text_document.text));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let mut documents = self.documents.write().await;
        let Some(document) = documents.get_mut(&params.text_document.uri) else {
            warn!(uri = %params.text_document.uri, "change for a document that is not open");
            return;
        };

        for change in params.content_changes {
            apply_change(document, change);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        debug!(uri = %params.text_document.uri, "close");
        self.documents
            .write()
            .await
            .remove(&params.text_document.uri);
    }

    async fn folding_range(
        &self,
        params: FoldingRangeParams,
    ) -> Result<Option<Vec<FoldingRange>>> {
        let documents = self.documents.read().await;
        let settings = self.settings.read().await;
        Ok(documents
            .get(&params.text_document.uri)
            .and_then(|document| folding::folding_ranges(document, &settings)))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let documents = self.documents.read().await;
        let settings = self.settings.read().await;
        Ok(documents
            .get(&params.text_document.uri)
            .and_then(|document| symbol::document_symbol(document, &settings)))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let documents = self.documents.read().await;
        let settings = self.settings.read().await;
        Ok(documents
            .get(&position.text_document.uri)
            .and_then(|document| {
                completion::get_completions(document, position.position, &settings)
            }))
    }
}

/// Serves the language server protocol over stdin/stdout until the client exits.
pub async fn serve() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_matches_full_parse;
    use tower_lsp::lsp_types::{Position, Range};

    fn change(range: Option<Range>, text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range,
            range_length: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn ranged_changes_edit_incrementally() {
        let mut document = Document::new("\\section{A}\n\\label{x}\n");

        apply_change(
            &mut document,
            change(
                Some(Range::new(Position::new(1, 7), Position::new(1, 8))),
                "renamed",
            ),
        );
        apply_change(
            &mut document,
            change(Some(Range::new(Position::new(2, 0), Position::new(2, 0))), "\\section{B}"),
        );

        assert_eq!(document.text(), "\\section{A}\n\\label{renamed}\n\\section{B}");
        assert_eq!(
            document.index().symbols.labels,
            ["renamed".to_string()].into()
        );
        assert_eq!(document.index().blocks.len(), 2);
        assert_matches_full_parse(&document);
    }

    #[test]
    fn full_changes_replace_the_document() {
        let mut document = Document::new("\\label{old}");

        apply_change(&mut document, change(None, "\\label{new}"));

        assert_eq!(
            document.index().symbols.labels,
            ["new".to_string()].into()
        );
    }

    #[test]
    fn changes_past_the_end_are_ignored() {
        let mut document = Document::new("one line");

        apply_change(
            &mut document,
            change(Some(Range::new(Position::new(5, 0), Position::new(5, 0))), "x"),
        );

        assert_eq!(document.text(), "one line");
    }
}
