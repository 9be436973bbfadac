//! Error channel for dispatched requests.

use tracing::error;

use crate::error::RequestError;
use crate::http::HttpMethod;

/// Receives exactly one report for every dispatched request that fails.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, method: HttpMethod, url: &str, error: &RequestError);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, method: HttpMethod, url: &str, error: &RequestError) {
        match error.status() {
            Some(status) => error!(%method, url, status, "request failed: {error}"),
            None => error!(%method, url, "request failed: {error}"),
        }
    }
}
