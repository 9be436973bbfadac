//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` for text, pointer + length for bytes and header arrays, and
//! enums with explicit discriminants. Conversions live here so `lib.rs`
//! stays focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use jsonrest_core::{HttpMethod, ParsePolicy, PostEncoding, RequestError};

/// Opaque handle to a `JsonClient`. C callers receive a pointer to this and
/// pass it back into every FFI function.
pub struct FfiJsonClient {
    pub(crate) inner: jsonrest_core::JsonClient,
}

/// Build a C string, dropping interior NULs rather than failing.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> CString {
    let mut bytes: Vec<u8> = s.into();
    bytes.retain(|b| *b != 0);
    CString::new(bytes).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum FfiPostEncoding {
    Raw = 0,
    WwwForm = 1,
}

impl From<FfiPostEncoding> for PostEncoding {
    fn from(e: FfiPostEncoding) -> Self {
        match e {
            FfiPostEncoding::Raw => PostEncoding::Raw,
            FfiPostEncoding::WwwForm => PostEncoding::WwwForm,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum FfiParsePolicy {
    Strict = 0,
    Lenient = 1,
}

impl From<FfiParsePolicy> for ParsePolicy {
    fn from(p: FfiParsePolicy) -> Self {
        match p {
            FfiParsePolicy::Strict => ParsePolicy::Strict,
            FfiParsePolicy::Lenient => ParsePolicy::Lenient,
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `jr_build_*` functions. `method_name` is the wire verb so hosts
/// with a generic request constructor can use it directly. `body` is null
/// for bodiless requests; otherwise it holds `body_len` bytes.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub method_name: *mut c_char,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    ///
    /// Returns null when the body or header count does not fit the `u32`
    /// length fields.
    pub(crate) fn from_core(req: jsonrest_core::HttpRequest) -> *mut Self {
        let body_len = ffi_len(req.body.as_ref().map_or(0, Vec::len));
        let (Some(body_len), Some(headers_len)) = (body_len, ffi_len(req.headers.len())) else {
            return std::ptr::null_mut();
        };

        let method_name = c_string(req.method.as_str()).into_raw();
        let url = c_string(req.url).into_raw();

        let body = match req.body {
            Some(bytes) => Box::into_raw(bytes.into_boxed_slice()) as *mut u8,
            None => std::ptr::null_mut(),
        };

        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k).into_raw(),
                    value: c_string(v).into_raw(),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            method_name,
            url,
            headers,
            headers_len,
            body,
            body_len,
        }))
    }
}

/// A length as the `u32` carried across the boundary, if it fits.
pub(crate) fn ffi_len(len: usize) -> Option<u32> {
    u32::try_from(len).ok()
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller fills this in after executing a request, then passes a
/// pointer to `jr_parse_response`. The FFI layer reads but does not free
/// these fields. A null `body` is an empty body.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiJsonResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Protocol = 1,
    Parse = 2,
    InvalidMethod = 3,
    InvalidUrl = 4,
    Connection = 5,
    Panic = 6,
    NullArg = 7,
    Other = 8,
}

/// Result envelope for `jr_parse_response`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `json` is
/// the parsed value re-serialized as compact JSON text (`null` for empty
/// bodies). On failure `json` is null; for protocol errors `http_status`
/// holds the status.
#[repr(C)]
pub struct FfiJsonResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub json: *mut c_char,
}

impl FfiJsonResult {
    fn boxed(error_code: FfiErrorCode, error_message: *mut c_char, http_status: u16, json: *mut c_char) -> *mut Self {
        Box::into_raw(Box::new(FfiJsonResult {
            error_code,
            error_message,
            http_status,
            json,
        }))
    }

    /// Build a success result carrying the serialized value.
    pub(crate) fn ok(value: &serde_json::Value, status: u16) -> *mut Self {
        let json = c_string(value.to_string()).into_raw();
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), status, json)
    }

    /// Build an error result from a `RequestError`.
    pub(crate) fn from_error(err: RequestError) -> *mut Self {
        let code = match &err {
            RequestError::Protocol { .. } => FfiErrorCode::Protocol,
            RequestError::Parse(_) => FfiErrorCode::Parse,
            RequestError::InvalidMethod(_) => FfiErrorCode::InvalidMethod,
            RequestError::InvalidUrl(_) => FfiErrorCode::InvalidUrl,
            RequestError::Connection(_) => FfiErrorCode::Connection,
            RequestError::NoRuntime | RequestError::Serialization(_) => FfiErrorCode::Other,
        };
        let status = err.status().unwrap_or(0);
        let msg = c_string(err.to_string()).into_raw();
        Self::boxed(code, msg, status, std::ptr::null_mut())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let msg = c_string(format!("null argument: {name}")).into_raw();
        Self::boxed(FfiErrorCode::NullArg, msg, 0, std::ptr::null_mut())
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, c_string(msg).into_raw(), 0, std::ptr::null_mut())
    }
}
