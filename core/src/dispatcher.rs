//! Fire-and-forget request dispatch with completion handlers.
//!
//! # Design
//! Each verb method builds its request synchronously, so bad verbs and bad
//! URLs fail before anything is spawned. The request then runs as its own
//! tokio task with a single suspension point, the transport await. When the
//! task finishes, either the handler has been called with the parsed JSON
//! or the reporter has received the error, never both.
//!
//! The returned `RequestTask` resolves to the same outcome as a typed
//! result, so callers that prefer awaiting over callbacks can do so.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::client::JsonClient;
use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::http::HttpRequest;
use crate::report::{ErrorReporter, TracingReporter};
use crate::transport::{ReqwestTransport, Transport};

/// Called once with the parsed response of a successful request.
pub type CompletionHandler = Box<dyn FnOnce(Value) + Send + 'static>;

/// Handle to a dispatched request.
pub type RequestTask = JoinHandle<Result<(), RequestError>>;

/// Builds, submits, and completes JSON requests over a `Transport`.
pub struct RequestDispatcher<T: Transport = ReqwestTransport> {
    client: JsonClient,
    transport: Arc<T>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<T: Transport> Clone for RequestDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            transport: Arc::clone(&self.transport),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl RequestDispatcher<ReqwestTransport> {
    /// Dispatcher over a fresh reqwest client with default configuration.
    pub fn reqwest() -> Self {
        Self::new(ReqwestTransport::new(), ClientConfig::default())
    }
}

impl<T: Transport + 'static> RequestDispatcher<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            client: JsonClient::new(config),
            transport: Arc::new(transport),
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Replace the error channel, `TracingReporter` by default.
    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn client(&self) -> &JsonClient {
        &self.client
    }

    pub fn get(&self, url: &str, handler: Option<CompletionHandler>) -> Result<RequestTask, RequestError> {
        let request = self.client.build_get(url)?;
        self.dispatch(request, handler)
    }

    pub fn post(&self, url: &str, json: &str, handler: Option<CompletionHandler>) -> Result<RequestTask, RequestError> {
        let request = self.client.build_post(url, json)?;
        self.dispatch(request, handler)
    }

    pub fn post_form<I, K, V>(
        &self,
        url: &str,
        fields: I,
        handler: Option<CompletionHandler>,
    ) -> Result<RequestTask, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = self.client.build_post_form(url, fields)?;
        self.dispatch(request, handler)
    }

    pub fn put(&self, url: &str, json: &str, handler: Option<CompletionHandler>) -> Result<RequestTask, RequestError> {
        let request = self.client.build_put(url, json)?;
        self.dispatch(request, handler)
    }

    pub fn patch(&self, url: &str, json: &str, handler: Option<CompletionHandler>) -> Result<RequestTask, RequestError> {
        let request = self.client.build_patch(url, json)?;
        self.dispatch(request, handler)
    }

    pub fn delete(&self, url: &str, handler: Option<CompletionHandler>) -> Result<RequestTask, RequestError> {
        let request = self.client.build_delete(url)?;
        self.dispatch(request, handler)
    }

    /// Dispatch by verb name. Unknown verbs fail here, before any I/O.
    pub fn request(
        &self,
        method: &str,
        url: &str,
        json: Option<&str>,
        handler: Option<CompletionHandler>,
    ) -> Result<RequestTask, RequestError> {
        let request = self.client.build(method, url, json)?;
        self.dispatch(request, handler)
    }

    /// Submit an already-built request and await its parsed response.
    ///
    /// Failures are returned, not reported.
    pub async fn send(&self, request: HttpRequest) -> Result<Value, RequestError> {
        let response = self.transport.execute(request).await?;
        self.client.parse_response(response)
    }

    /// Spawn `request` on the current runtime.
    pub fn dispatch(&self, request: HttpRequest, handler: Option<CompletionHandler>) -> Result<RequestTask, RequestError> {
        let runtime = Handle::try_current().map_err(|_| RequestError::NoRuntime)?;
        let this = self.clone();
        Ok(runtime.spawn(async move { this.complete(request, handler).await }))
    }

    async fn complete(&self, request: HttpRequest, handler: Option<CompletionHandler>) -> Result<(), RequestError> {
        let method = request.method;
        let url = request.url.clone();
        match self.send(request).await {
            Ok(value) => {
                if let Some(handler) = handler {
                    handler(value);
                }
                Ok(())
            }
            Err(e) => {
                self.reporter.report(method, &url, &e);
                Err(e)
            }
        }
    }
}
