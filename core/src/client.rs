//! Stateless request builder and response parser for JSON REST APIs.
//!
//! # Design
//! `JsonClient` holds only its `ClientConfig`. Each verb has a `build_*`
//! method producing an `HttpRequest`, and a single `parse_response` turns an
//! `HttpResponse` into a JSON tree. The network round-trip happens outside,
//! either in `RequestDispatcher` or in a host that owns its own transport.
//!
//! Every JSON verb sets `Content-Type: application/json`, GET and DELETE
//! included. PUT and PATCH upload the raw UTF-8 bytes of the JSON text.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use url::form_urlencoded;

use crate::config::{ClientConfig, ParsePolicy, PostEncoding};
use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Synchronous, stateless client for JSON REST APIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonClient {
    config: ClientConfig,
}

impl JsonClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn build_get(&self, url: &str) -> Result<HttpRequest, RequestError> {
        json_request(HttpMethod::Get, url, None)
    }

    pub fn build_post(&self, url: &str, json: &str) -> Result<HttpRequest, RequestError> {
        let body = match self.config.post_encoding {
            PostEncoding::Raw => json.as_bytes().to_vec(),
            PostEncoding::WwwForm => form_urlencoded::byte_serialize(json.as_bytes())
                .collect::<String>()
                .into_bytes(),
        };
        json_request(HttpMethod::Post, url, Some(body))
    }

    /// Build a form POST from `(name, value)` pairs, encoded in the order
    /// given. Unlike the JSON verbs this carries the form content type.
    pub fn build_post_form<I, K, V>(&self, url: &str, fields: I) -> Result<HttpRequest, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = validate_url(url)?;
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let mut req = HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: Vec::new(),
            body: Some(body.into_bytes()),
        };
        req.set_header(CONTENT_TYPE, FORM_CONTENT_TYPE);
        Ok(req)
    }

    pub fn build_put(&self, url: &str, json: &str) -> Result<HttpRequest, RequestError> {
        json_request(HttpMethod::Put, url, Some(json.as_bytes().to_vec()))
    }

    pub fn build_patch(&self, url: &str, json: &str) -> Result<HttpRequest, RequestError> {
        json_request(HttpMethod::Patch, url, Some(json.as_bytes().to_vec()))
    }

    pub fn build_delete(&self, url: &str) -> Result<HttpRequest, RequestError> {
        json_request(HttpMethod::Delete, url, None)
    }

    /// Build a request from a verb name.
    ///
    /// Fails with `InvalidMethod` for anything but GET, POST, PUT, PATCH and
    /// DELETE. `json` is ignored for GET and DELETE; a missing body on the
    /// other verbs is sent as an empty upload.
    pub fn build(&self, method: &str, url: &str, json: Option<&str>) -> Result<HttpRequest, RequestError> {
        let method: HttpMethod = method.parse()?;
        let json = json.unwrap_or_default();
        match method {
            HttpMethod::Get => self.build_get(url),
            HttpMethod::Post => self.build_post(url, json),
            HttpMethod::Put => self.build_put(url, json),
            HttpMethod::Patch => self.build_patch(url, json),
            HttpMethod::Delete => self.build_delete(url),
        }
    }

    /// Turn a response into a JSON tree.
    ///
    /// Non-2xx statuses become `Protocol` errors carrying status and body.
    /// Empty 2xx bodies are `null`; malformed ones, invalid UTF-8 included,
    /// follow the parse policy.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, RequestError> {
        if !response.is_success() {
            return Err(RequestError::Protocol {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        let bytes = response.body.trim_ascii();
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => Ok(value),
            Err(e) => match self.config.parse_policy {
                ParsePolicy::Strict => Err(RequestError::Parse(e.to_string())),
                ParsePolicy::Lenient => {
                    warn!(status = response.status, error = %e, "response body is not JSON, using null");
                    Ok(Value::Null)
                }
            },
        }
    }
}

/// Serialize a value into JSON text suitable for the `json` body parameters.
pub fn to_json_body<T: Serialize + ?Sized>(value: &T) -> Result<String, RequestError> {
    serde_json::to_string(value).map_err(|e| RequestError::Serialization(e.to_string()))
}

fn json_request(method: HttpMethod, url: &str, body: Option<Vec<u8>>) -> Result<HttpRequest, RequestError> {
    let url = validate_url(url)?;
    let mut req = HttpRequest {
        method,
        url,
        headers: Vec::new(),
        body,
    };
    req.set_header(CONTENT_TYPE, JSON_CONTENT_TYPE);
    Ok(req)
}

/// Accept only non-empty absolute URLs with a host. The original text is
/// kept as-is rather than the normalized form.
fn validate_url(url: &str) -> Result<String, RequestError> {
    if url.trim().is_empty() {
        return Err(RequestError::InvalidUrl("empty URL".to_string()));
    }
    let parsed = url::Url::parse(url).map_err(|e| RequestError::InvalidUrl(format!("{url}: {e}")))?;
    if !parsed.has_host() {
        return Err(RequestError::InvalidUrl(format!("{url}: missing host")));
    }
    Ok(url.to_string())
}
