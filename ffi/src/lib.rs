//! C-ABI wrapper around `jsonrest-core`.
//!
//! # Overview
//! Exposes request building and response parsing through `extern "C"`
//! functions so an engine or runtime that already owns an HTTP stack can
//! reuse the JSON request conventions without linking a Rust async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `jr_build_*` per verb plus `jr_build_request` for verbs chosen at
//!   runtime. Build functions return null on invalid input (null or non-UTF-8
//!   strings, unknown verb, empty or relative URL).
//! - `jr_parse_response` returns an `FfiJsonResult` envelope with the parsed
//!   JSON re-serialized as text, or an error code and message.
//! - The C caller owns all returned pointers and must release them with the
//!   matching `jr_free_*` function.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use jsonrest_core::{ClientConfig, HttpRequest, HttpResponse, JsonClient, RequestError};

use types::*;

/// Read a borrowed C string. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives 'a.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Read a borrowed C string as raw bytes; null reads as empty.
///
/// # Safety
/// Same contract as `read_str`.
unsafe fn read_bytes<'a>(ptr: *const c_char) -> &'a [u8] {
    if ptr.is_null() {
        return &[];
    }
    unsafe { CStr::from_ptr(ptr) }.to_bytes()
}

/// Shared tail of every build function: map the outcome to a pointer.
fn into_ffi(result: Result<HttpRequest, RequestError>) -> *mut FfiHttpRequest {
    match result {
        Ok(req) => FfiHttpRequest::from_core(req),
        Err(_) => std::ptr::null_mut(),
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `JsonClient` with the given POST encoding and parse policy.
///
/// The caller must free the returned pointer with `jr_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn jr_client_new(
    post_encoding: FfiPostEncoding,
    parse_policy: FfiParsePolicy,
) -> *mut FfiJsonClient {
    catch_unwind(|| {
        let config = ClientConfig {
            post_encoding: post_encoding.into(),
            parse_policy: parse_policy.into(),
        };
        Box::into_raw(Box::new(FfiJsonClient {
            inner: JsonClient::new(config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `jr_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jr_client_free(client: *mut FfiJsonClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a GET request. Returns null if `client` or `url` is null, `url` is
/// not UTF-8, or the URL is not absolute.
#[unsafe(no_mangle)]
pub extern "C" fn jr_build_get(client: *const FfiJsonClient, url: *const c_char) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(url) = (unsafe { read_str(url) }) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        into_ffi(client.inner.build_get(url))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a JSON POST request, encoded per the client's POST encoding.
#[unsafe(no_mangle)]
pub extern "C" fn jr_build_post(
    client: *const FfiJsonClient,
    url: *const c_char,
    json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let (Some(url), Some(json)) = (unsafe { read_str(url) }, unsafe { read_str(json) }) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        into_ffi(client.inner.build_post(url, json))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a form POST from `len` parallel `keys` / `values` arrays.
///
/// Returns null if any pointer is null (arrays may be null when `len` is 0)
/// or any string is not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn jr_build_post_form(
    client: *const FfiJsonClient,
    url: *const c_char,
    keys: *const *const c_char,
    values: *const *const c_char,
    len: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(url) = (unsafe { read_str(url) }) else {
            return std::ptr::null_mut();
        };
        if client.is_null() || (len > 0 && (keys.is_null() || values.is_null())) {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let mut fields = Vec::with_capacity(len as usize);
        for i in 0..len as usize {
            let (key, value) = unsafe { (*keys.add(i), *values.add(i)) };
            match unsafe { (read_str(key), read_str(value)) } {
                (Some(key), Some(value)) => fields.push((key, value)),
                _ => return std::ptr::null_mut(),
            }
        }
        into_ffi(client.inner.build_post_form(url, fields))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a PUT request carrying the JSON text as its body.
#[unsafe(no_mangle)]
pub extern "C" fn jr_build_put(
    client: *const FfiJsonClient,
    url: *const c_char,
    json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let (Some(url), Some(json)) = (unsafe { read_str(url) }, unsafe { read_str(json) }) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        into_ffi(client.inner.build_put(url, json))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a PATCH request whose body is the UTF-8 bytes of `json`.
#[unsafe(no_mangle)]
pub extern "C" fn jr_build_patch(
    client: *const FfiJsonClient,
    url: *const c_char,
    json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let (Some(url), Some(json)) = (unsafe { read_str(url) }, unsafe { read_str(json) }) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        into_ffi(client.inner.build_patch(url, json))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a DELETE request.
#[unsafe(no_mangle)]
pub extern "C" fn jr_build_delete(client: *const FfiJsonClient, url: *const c_char) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(url) = (unsafe { read_str(url) }) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        into_ffi(client.inner.build_delete(url))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request from a verb name (`"GET"`, `"patch"`, ...).
///
/// `json` may be null; a non-null `json` must be UTF-8. Returns null for
/// unknown verbs, before the URL is looked at.
#[unsafe(no_mangle)]
pub extern "C" fn jr_build_request(
    client: *const FfiJsonClient,
    method: *const c_char,
    url: *const c_char,
    json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let (Some(method), Some(url)) = (unsafe { read_str(method) }, unsafe { read_str(url) }) else {
            return std::ptr::null_mut();
        };
        let json = if json.is_null() {
            None
        } else {
            match unsafe { read_str(json) } {
                Some(json) => Some(json),
                None => return std::ptr::null_mut(),
            }
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        into_ffi(client.inner.build(method, url, json))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: unsafe { read_bytes(resp.body) }.to_vec(),
    }
}

/// Parse a response the host received for a request built by this library.
#[unsafe(no_mangle)]
pub extern "C" fn jr_parse_response(
    client: *const FfiJsonClient,
    response: *const FfiHttpResponse,
) -> *mut FfiJsonResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiJsonResult::null_arg("client");
        }
        if response.is_null() {
            return FfiJsonResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let status = resp.status;
        match client.inner.parse_response(ffi_response_to_core(resp)) {
            Ok(value) => FfiJsonResult::ok(&value, status),
            Err(e) => FfiJsonResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiJsonResult::panic("panic in jr_parse_response"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `jr_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jr_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.method_name);
        free_c_string(req.url);
        if !req.body.is_null() {
            let slice = std::ptr::slice_from_raw_parts_mut(req.body, req.body_len as usize);
            drop(unsafe { Box::from_raw(slice) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiJsonResult` returned by `jr_parse_response`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jr_free_result(result: *mut FfiJsonResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.json);
    });
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { std::ffi::CString::from_raw(s) });
    }
}
