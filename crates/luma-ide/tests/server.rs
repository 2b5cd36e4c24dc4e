use std::thread;
use std::time::Duration;

use lsp_server::{Connection, Message, Notification, Request, RequestId, Response};
use lsp_types::notification::Notification as _;
use lsp_types::request::Request as _;
use luma_ide::{ReparseConfig, Server};
use serde_json::{Value, json};

const TEXT: &str = "\
local M = {}

function M.new()
  return setmetatable({}, { __index = M })
end

local function helper(cb)
  tmr.alarm(0, 100, 0, function() cb() end)
end
";

/// `😀` takes two UTF-16 code units and `é` one.
const CHANGED: &str = "local s = '😀é'; local function g() end\n";

struct Client {
    connection: Connection,
    next_id: i32,
}

impl Client {
    fn request(&mut self, method: &str, params: Value) -> Response {
        self.next_id += 1;
        let id = RequestId::from(self.next_id);
        let request = Request { id: id.clone(), method: method.to_owned(), params };
        self.connection.sender.send(request.into()).unwrap();

        loop {
            match self.connection.receiver.recv_timeout(Duration::from_secs(10)).unwrap() {
                Message::Response(response) if response.id == id => return response,
                _ => {}
            }
        }
    }

    fn notify(&self, method: &str, params: Value) {
        let notification = Notification { method: method.to_owned(), params };
        self.connection.sender.send(notification.into()).unwrap();
    }

    fn folding_ranges(&mut self, uri: &str) -> Option<Vec<Value>> {
        let response = self.request(
            lsp_types::request::FoldingRangeRequest::METHOD,
            json!({ "textDocument": { "uri": uri } }),
        );
        match response.result {
            Some(Value::Array(ranges)) => Some(ranges),
            _ => None,
        }
    }

    /// Polls until the applied reparse satisfies `ready`.
    fn wait_for_ranges(&mut self, uri: &str, ready: impl Fn(&[Value]) -> bool) -> Vec<Value> {
        for _ in 0..500 {
            if let Some(ranges) = self.folding_ranges(uri)
                && ready(&ranges)
            {
                return ranges;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("folding ranges for {uri} never settled");
    }

    fn change(&self, uri: &str, version: i32, text: &str) {
        self.notify(
            lsp_types::notification::DidChangeTextDocument::METHOD,
            json!({
                "textDocument": { "uri": uri, "version": version },
                "contentChanges": [{ "text": text }],
            }),
        );
    }
}

#[test]
fn serves_folding_ranges_and_symbols() {
    let (server_side, client_side) = Connection::memory();
    let server = thread::spawn(move || {
        Server::handshake(&server_side).unwrap();
        Server::new(server_side, ReparseConfig { threads: 2, coalesce: true }).run()
    });

    let mut client = Client { connection: client_side, next_id: 0 };
    let initialize = client.request(
        lsp_types::request::Initialize::METHOD,
        json!({ "capabilities": {} }),
    );
    let result = initialize.result.unwrap();
    let capabilities = &result["capabilities"];
    assert_eq!(capabilities["foldingRangeProvider"], json!(true));
    assert_eq!(capabilities["documentSymbolProvider"], json!(true));
    client.notify(lsp_types::notification::Initialized::METHOD, json!({}));

    let uri = "file:///tmp/init.lua";
    client.notify(
        lsp_types::notification::DidOpenTextDocument::METHOD,
        json!({
            "textDocument": { "uri": uri, "languageId": "lua", "version": 1, "text": TEXT }
        }),
    );

    let ranges = client.wait_for_ranges(uri, |ranges| !ranges.is_empty());
    let lines: Vec<_> = ranges
        .iter()
        .map(|range| (range["startLine"].as_u64().unwrap(), range["endLine"].as_u64().unwrap()))
        .collect();
    assert_eq!(lines, [(2, 4), (6, 8), (7, 7)]);
    assert!(ranges.iter().all(|range| range["kind"] == "region"));

    let symbols = client
        .request(
            lsp_types::request::DocumentSymbolRequest::METHOD,
            json!({ "textDocument": { "uri": uri } }),
        )
        .result
        .unwrap();
    assert_eq!(symbols[0]["name"], "M.new");
    assert_eq!(symbols[1]["name"], "helper");
    assert_eq!(symbols[1]["children"][0]["name"], "<anonymous>");
    assert_eq!(symbols[1]["selectionRange"]["start"], json!({ "line": 6, "character": 0 }));

    // Only the second edit may end up applied.
    client.change(uri, 2, "function first() end\n");
    client.change(uri, 3, CHANGED);
    let ranges = client.wait_for_ranges(uri, |ranges| {
        ranges.len() == 1 && ranges[0]["startCharacter"] == 17
    });
    thread::sleep(Duration::from_millis(50));
    assert_eq!(client.folding_ranges(uri).unwrap(), ranges);
    assert_eq!(
        (&ranges[0]["startLine"], &ranges[0]["endLine"], &ranges[0]["endCharacter"]),
        (&json!(0), &json!(0), &json!(39))
    );

    let symbols = client
        .request(
            lsp_types::request::DocumentSymbolRequest::METHOD,
            json!({ "textDocument": { "uri": uri } }),
        )
        .result
        .unwrap();
    assert_eq!(symbols[0]["name"], "g");
    assert_eq!(symbols[0]["selectionRange"]["start"], json!({ "line": 0, "character": 17 }));

    // An edit to a document that was never opened changes nothing.
    client.change("file:///tmp/other.lua", 1, TEXT);
    assert_eq!(client.folding_ranges("file:///tmp/other.lua"), None);
    assert_eq!(client.folding_ranges(uri).unwrap(), ranges);

    client.notify(
        lsp_types::notification::DidCloseTextDocument::METHOD,
        json!({ "textDocument": { "uri": uri } }),
    );
    let closed = client.request(
        lsp_types::request::FoldingRangeRequest::METHOD,
        json!({ "textDocument": { "uri": uri } }),
    );
    assert_eq!(closed.result, Some(Value::Null));

    let unknown = client.request("luma/unknown", Value::Null);
    assert_eq!(unknown.error.unwrap().code, lsp_server::ErrorCode::MethodNotFound as i32);

    let shutdown = client.request(lsp_types::request::Shutdown::METHOD, Value::Null);
    assert!(shutdown.error.is_none());
    client.notify(lsp_types::notification::Exit::METHOD, Value::Null);

    server.join().unwrap().unwrap();
}
