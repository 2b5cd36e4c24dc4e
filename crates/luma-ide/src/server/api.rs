use std::sync::Arc;

use anyhow::{Context as _, Result};
use text_size::TextRange;

use super::notifications::NotificationDispatcher;
use super::requests::RequestDispatcher;
use super::{Document, Server};
use crate::{FoldRegion, OutlineEntry};

pub(crate) fn request(server: &mut Server, request: lsp_server::Request) {
    RequestDispatcher::new(request, server)
        .on::<lsp_types::request::FoldingRangeRequest>(handle_folding_range)
        .on::<lsp_types::request::DocumentSymbolRequest>(handle_document_symbol)
        .finish();
}

#[expect(clippy::needless_pass_by_value)]
fn handle_folding_range(
    server: &mut Server,
    params: lsp_types::FoldingRangeParams,
) -> Result<Option<Vec<lsp_types::FoldingRange>>> {
    let Some(document) = server.documents.get(&params.text_document.uri) else {
        return Ok(None);
    };

    let ranges = document
        .regions
        .iter()
        .map(|region| {
            let range = to_lsp_range(document, region.range);
            lsp_types::FoldingRange {
                start_line: range.start.line,
                start_character: Some(range.start.character),
                end_line: range.end.line,
                end_character: Some(range.end.character),
                kind: Some(lsp_types::FoldingRangeKind::Region),
                collapsed_text: None,
            }
        })
        .collect();

    Ok(Some(ranges))
}

#[expect(clippy::needless_pass_by_value)]
fn handle_document_symbol(
    server: &mut Server,
    params: lsp_types::DocumentSymbolParams,
) -> Result<Option<lsp_types::DocumentSymbolResponse>> {
    let Some(document) = server.documents.get(&params.text_document.uri) else {
        return Ok(None);
    };

    let symbols = nest(document, &document.regions, &document.outline);
    Ok(Some(lsp_types::DocumentSymbolResponse::Nested(symbols)))
}

/// Arranges symbols by containment. Regions arrive outer first, so a region
/// belongs to the closest open region that still contains it.
fn nest(
    document: &Document,
    regions: &[FoldRegion],
    entries: &[OutlineEntry],
) -> Vec<lsp_types::DocumentSymbol> {
    let mut roots = Vec::new();
    let mut open: Vec<(TextRange, lsp_types::DocumentSymbol)> = Vec::new();

    for (region, entry) in regions.iter().zip(entries) {
        while let Some((range, _)) = open.last()
            && !range.contains_range(region.range)
        {
            close(&mut open, &mut roots);
        }

        let caret = document.position(entry.offset);
        #[allow(deprecated)]
        let symbol = lsp_types::DocumentSymbol {
            name: entry.display_name().to_owned(),
            detail: None,
            kind: lsp_types::SymbolKind::FUNCTION,
            tags: None,
            deprecated: None,
            range: to_lsp_range(document, region.range),
            selection_range: lsp_types::Range::new(caret, caret),
            children: None,
        };
        open.push((region.range, symbol));
    }

    while !open.is_empty() {
        close(&mut open, &mut roots);
    }

    roots
}

fn close(
    open: &mut Vec<(TextRange, lsp_types::DocumentSymbol)>,
    roots: &mut Vec<lsp_types::DocumentSymbol>,
) {
    let Some((_, symbol)) = open.pop() else { return };
    match open.last_mut() {
        Some((_, parent)) => parent.children.get_or_insert_with(Vec::new).push(symbol),
        None => roots.push(symbol),
    }
}

pub(crate) fn notification(server: &mut Server, notification: lsp_server::Notification) {
    NotificationDispatcher::new(notification, server)
        .on::<lsp_types::notification::DidOpenTextDocument>(handle_did_open_text_document)
        .on::<lsp_types::notification::DidChangeTextDocument>(handle_did_change_text_document)
        .on::<lsp_types::notification::DidCloseTextDocument>(handle_did_close_text_document)
        .finish();
}

fn handle_did_open_text_document(
    server: &mut Server,
    params: lsp_types::DidOpenTextDocumentParams,
) -> Result<()> {
    let lsp_types::TextDocumentItem { uri, language_id: _, version: _, text } =
        params.text_document;
    let text: Arc<str> = text.into();

    server.documents.insert(uri.clone(), Document::new(&text));
    server.reparser.schedule(uri, text);

    Ok(())
}

fn handle_did_change_text_document(
    server: &mut Server,
    params: lsp_types::DidChangeTextDocumentParams,
) -> Result<()> {
    let lsp_types::DidChangeTextDocumentParams { text_document, mut content_changes } = params;
    let uri = text_document.uri;
    if !server.documents.contains_key(&uri) {
        anyhow::bail!("change for a document that is not open: {uri:?}");
    }

    // Full sync: the last change carries the whole text.
    let change = content_changes.pop().context("change without content")?;
    server.reparser.schedule(uri, change.text);

    Ok(())
}

fn handle_did_close_text_document(
    server: &mut Server,
    params: lsp_types::DidCloseTextDocumentParams,
) -> Result<()> {
    let uri = params.text_document.uri;
    server.documents.remove(&uri);
    server.reparser.forget(&uri);

    Ok(())
}

fn to_lsp_range(document: &Document, range: TextRange) -> lsp_types::Range {
    lsp_types::Range { start: document.position(range.start()), end: document.position(range.end()) }
}
