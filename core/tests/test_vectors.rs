//! Verify request building and response parsing against the JSON vectors in
//! `test-vectors/`.
//!
//! Parsed results are compared as JSON values, not raw strings, so key order
//! in the vector files does not matter.

use jsonrest_core::{HttpMethod, HttpResponse, JsonClient, RequestError};

fn client() -> JsonClient {
    JsonClient::default()
}

fn parse_method(s: &str) -> HttpMethod {
    s.parse().unwrap_or_else(|_| panic!("unknown method: {s}"))
}

fn error_name(err: &RequestError) -> &'static str {
    match err {
        RequestError::InvalidMethod(_) => "InvalidMethod",
        RequestError::InvalidUrl(_) => "InvalidUrl",
        RequestError::NoRuntime => "NoRuntime",
        RequestError::Serialization(_) => "Serialization",
        RequestError::Connection(_) => "Connection",
        RequestError::Protocol { .. } => "Protocol",
        RequestError::Parse(_) => "Parse",
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method = case["method"].as_str().unwrap();
        let url = case["url"].as_str().unwrap();
        let json = case["json"].as_str();

        let result = c.build(method, url, json);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(error_name(&err), expected_error.as_str().unwrap(), "{name}: error kind");
            continue;
        }

        let req = result.unwrap();
        let expected = &case["expected_request"];
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, url, "{name}: url");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let expected_body = expected["body"].as_str().map(|s| s.as_bytes().to_vec());
        assert_eq!(req.body, expected_body, "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().as_bytes().to_vec(),
        };

        let result = c.parse_response(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(error_name(&err), expected_error.as_str().unwrap(), "{name}: error kind");
            if let RequestError::Protocol { status, body } = err {
                assert_eq!(u64::from(status), sim["status"].as_u64().unwrap(), "{name}: status");
                assert_eq!(body, sim["body"].as_str().unwrap(), "{name}: body kept");
            }
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
