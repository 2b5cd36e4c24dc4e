use anyhow::Result;

use super::{Server, from_json, result_to_response};

/// Routes a request to the first handler registered for its method. Every
/// request gets exactly one response, an error one if nothing handled it.
pub(crate) struct RequestDispatcher<'me> {
    request: Option<lsp_server::Request>,
    server: &'me mut Server,
}

impl<'me> RequestDispatcher<'me> {
    pub(crate) fn new(request: lsp_server::Request, server: &'me mut Server) -> Self {
        Self { request: Some(request), server }
    }

    pub(crate) fn on<R>(mut self, f: fn(&mut Server, R::Params) -> Result<R::Result>) -> Self
    where
        R: lsp_types::request::Request,
    {
        let Some(request) = self.request.take_if(|it| it.method == R::METHOD) else {
            return self;
        };

        let response = match from_json::<R::Params>(R::METHOD, &request.params) {
            Ok(params) => {
                tracing::debug!(method = R::METHOD, id = %request.id, "handling request");
                result_to_response::<R>(request.id, f(self.server, params))
            }
            Err(error) => {
                tracing::warn!(method = R::METHOD, "{error}");
                lsp_server::Response::new_err(
                    request.id,
                    lsp_server::ErrorCode::InvalidParams as i32,
                    error.to_string(),
                )
            }
        };
        self.server.respond(response);

        self
    }

    pub(crate) fn finish(self) {
        if let Some(request) = self.request {
            tracing::warn!(method = %request.method, "unknown request");
            self.server.respond(lsp_server::Response::new_err(
                request.id,
                lsp_server::ErrorCode::MethodNotFound as i32,
                "unknown request".to_owned(),
            ));
        }
    }
}
