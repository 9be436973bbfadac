//! Convenience client for JSON REST APIs.
//!
//! # Overview
//! Issues GET/POST/PUT/PATCH/DELETE requests and hands the parsed
//! `serde_json::Value` to a completion handler, or to an awaiting caller as a
//! typed result.
//!
//! # Design
//! - `JsonClient` is stateless and I/O-free: `build_*` produces an
//!   `HttpRequest`, `parse_response` consumes an `HttpResponse`. Hosts with
//!   their own networking stack can use it on its own.
//! - `RequestDispatcher` runs each request as an independent tokio task over
//!   a `Transport` (`ReqwestTransport` by default) and routes failures to an
//!   `ErrorReporter` (`tracing` by default).
//! - Construction errors are returned synchronously; nothing is sent.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod report;
pub mod transport;

pub use client::{to_json_body, JsonClient};
pub use config::{ClientConfig, ParsePolicy, PostEncoding};
pub use dispatcher::{CompletionHandler, RequestDispatcher, RequestTask};
pub use error::RequestError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use report::{ErrorReporter, TracingReporter};
pub use transport::{ReqwestTransport, Transport};
