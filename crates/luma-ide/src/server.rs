mod api;
mod notifications;
mod requests;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use line_index::{LineIndex, WideEncoding, WideLineCol};
use lsp_server::{Connection, Message, ProtocolError};
use lsp_types::Uri;
use text_size::TextSize;

use crate::reparse::{FoldSink, FoldUpdate, ReparseConfig, Reparser};
use crate::{FoldRegion, OutlineEntry};

/// Language server answering folding range and document symbol requests.
///
/// Requests are served from whatever the last applied reparse produced, so a
/// request never waits for a parse.
pub struct Server {
    connection: Connection,
    reparser: Reparser<Uri>,
    documents: HashMap<Uri, Document>,
}

enum Event {
    Message(Message),
    Update(FoldUpdate<Uri>),
}

impl Server {
    fn server_capabilities() -> lsp_types::ServerCapabilities {
        lsp_types::ServerCapabilities {
            text_document_sync: Some(lsp_types::TextDocumentSyncCapability::Kind(
                lsp_types::TextDocumentSyncKind::FULL,
            )),
            folding_range_provider: Some(lsp_types::FoldingRangeProviderCapability::Simple(true)),
            document_symbol_provider: Some(lsp_types::OneOf::Left(true)),
            ..lsp_types::ServerCapabilities::default()
        }
    }

    /// Serves over stdin and stdout until the client exits.
    pub fn stdio(config: ReparseConfig) -> Result<()> {
        let (connection, io_threads) = Connection::stdio();

        if let Err(protocol_error) = Self::handshake(&connection) {
            if protocol_error.channel_is_disconnected() {
                io_threads.join()?;
            }
            return Err(protocol_error.into());
        }

        Self::new(connection, config).run()?;
        io_threads.join()?;

        Ok(())
    }

    /// Answers the client's `initialize` request.
    pub fn handshake(connection: &Connection) -> Result<(), ProtocolError> {
        let (initialize_id, _initialize_params) = connection.initialize_start()?;

        let initialize_data = serde_json::json!({
            "capabilities": Self::server_capabilities(),
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        connection.initialize_finish(initialize_id, initialize_data)
    }

    /// Wraps a connection that already completed the handshake.
    pub fn new(connection: Connection, config: ReparseConfig) -> Self {
        Self { connection, reparser: Reparser::new(config), documents: HashMap::default() }
    }

    fn respond(&self, response: lsp_server::Response) {
        if let Err(error) = self.connection.sender.send(response.into()) {
            tracing::error!("failed to send response: {error}");
        }
    }

    fn next_event(&self) -> Option<Event> {
        crossbeam_channel::select! {
            recv(self.connection.receiver) -> message => message.ok().map(Event::Message),
            recv(self.reparser.receiver()) -> update => update.ok().map(Event::Update),
        }
    }

    /// Runs until shutdown, then drops the connection so the io threads can
    /// finish.
    pub fn run(mut self) -> Result<()> {
        while let Some(event) = self.next_event() {
            match event {
                Event::Message(Message::Request(request)) => {
                    if self.connection.handle_shutdown(&request)? {
                        tracing::info!("shutting down");
                        break;
                    }
                    api::request(&mut self, request);
                }
                Event::Message(Message::Response(_response)) => {}
                Event::Message(Message::Notification(notification)) => {
                    api::notification(&mut self, notification);
                }
                Event::Update(update) => {
                    // Everything already finished goes in one batch, so a burst
                    // of edits is applied once.
                    let pending: Vec<_> = self.reparser.receiver().try_iter().collect();
                    let updates = std::iter::once(update).chain(pending);
                    self.reparser.apply_batch(updates, &mut self.documents);
                }
            }
        }

        Ok(())
    }
}

/// What the server knows about an open document.
struct Document {
    /// Text the regions were computed from, not necessarily the latest edit.
    text: Arc<str>,
    line_index: LineIndex,
    regions: Vec<FoldRegion>,
    outline: Vec<OutlineEntry>,
}

impl Document {
    fn new(text: &Arc<str>) -> Self {
        Self {
            text: Arc::clone(text),
            line_index: LineIndex::new(text),
            regions: Vec::new(),
            outline: Vec::new(),
        }
    }

    /// LSP position of `offset`, with UTF-16 columns.
    fn position(&self, offset: TextSize) -> lsp_types::Position {
        let line_col = self.line_index.line_col(offset);
        let WideLineCol { line, col } = self
            .line_index
            .to_wide(WideEncoding::Utf16, line_col)
            .unwrap_or(WideLineCol { line: line_col.line, col: line_col.col });
        lsp_types::Position::new(line, col)
    }
}

impl FoldSink for Document {
    fn update_foldings(&mut self, text: &Arc<str>, regions: &[FoldRegion]) {
        if !Arc::ptr_eq(&self.text, text) {
            self.text = Arc::clone(text);
            self.line_index = LineIndex::new(text);
        }
        self.regions = regions.to_vec();
    }

    fn update_outline(&mut self, entries: &[OutlineEntry]) {
        self.outline = entries.to_vec();
    }
}

fn from_json<T: serde::de::DeserializeOwned>(
    what: &'static str,
    json: &serde_json::Value,
) -> Result<T> {
    serde_json::from_value(json.clone())
        .map_err(|e| anyhow::format_err!("Failed to deserialize {what}: {e}; {json}"))
}

fn result_to_response<R>(
    id: lsp_server::RequestId,
    result: Result<R::Result>,
) -> lsp_server::Response
where
    R: lsp_types::request::Request,
    R::Result: serde::Serialize,
{
    match result {
        Ok(resp) => lsp_server::Response::new_ok(id, &resp),
        Err(error) => lsp_server::Response::new_err(
            id,
            lsp_server::ErrorCode::InternalError as i32,
            error.to_string(),
        ),
    }
}
