//! Dispatcher tests over real HTTP against the in-process mock server.
//!
//! # Design
//! Each test binds the mock server to a random port on the test's own
//! runtime, then drives `RequestDispatcher` with the reqwest transport.
//! Handlers forward their value through a oneshot channel; a counting
//! reporter stands in for the log channel.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use jsonrest_core::{
    ClientConfig, CompletionHandler, ErrorReporter, HttpMethod, ParsePolicy, PostEncoding,
    ReqwestTransport, RequestDispatcher, RequestError,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

#[derive(Clone, Default)]
struct CountingReporter {
    errors: Arc<Mutex<Vec<RequestError>>>,
}

impl ErrorReporter for CountingReporter {
    fn report(&self, _method: HttpMethod, _url: &str, error: &RequestError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

impl CountingReporter {
    fn count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await.unwrap() });
    addr
}

fn dispatcher(config: ClientConfig) -> (RequestDispatcher, CountingReporter) {
    let reporter = CountingReporter::default();
    let d = RequestDispatcher::new(ReqwestTransport::new(), config).with_reporter(reporter.clone());
    (d, reporter)
}

fn channel() -> (CompletionHandler, oneshot::Receiver<Value>) {
    let (tx, rx) = oneshot::channel();
    let handler: CompletionHandler = Box::new(move |v: Value| {
        let _ = tx.send(v);
    });
    (handler, rx)
}

#[tokio::test]
async fn crud_lifecycle() {
    let addr = start_server().await;
    let base = format!("http://{addr}/items");
    let (d, reporter) = dispatcher(ClientConfig::default());

    // list: empty
    let (handler, rx) = channel();
    d.get(&base, Some(handler)).unwrap().await.unwrap().unwrap();
    assert_eq!(rx.await.unwrap(), json!([]));

    // create
    let (handler, rx) = channel();
    d.post(&base, r#"{"name":"a","count":1}"#, Some(handler))
        .unwrap()
        .await
        .unwrap()
        .unwrap();
    let created = rx.await.unwrap();
    assert_eq!(created["name"], "a");
    let id = created["id"].as_str().unwrap().to_string();
    let item_url = format!("{base}/{id}");

    // patch merges
    let (handler, rx) = channel();
    d.patch(&item_url, r#"{"count":2}"#, Some(handler))
        .unwrap()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rx.await.unwrap(), json!({"id": id, "name": "a", "count": 2}));

    // put replaces
    let (handler, rx) = channel();
    d.put(&item_url, r#"{"name":"b"}"#, Some(handler))
        .unwrap()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rx.await.unwrap(), json!({"id": id, "name": "b"}));

    // get
    let fetched = d.send(d.client().build_get(&item_url).unwrap()).await.unwrap();
    assert_eq!(fetched["name"], "b");

    // delete: 204 with no body completes with null
    let (handler, rx) = channel();
    d.delete(&item_url, Some(handler)).unwrap().await.unwrap().unwrap();
    assert_eq!(rx.await.unwrap(), Value::Null);

    assert_eq!(reporter.count(), 0);

    // get after delete: protocol error, handler dropped uncalled
    let (handler, rx) = channel();
    let err = d.get(&item_url, Some(handler)).unwrap().await.unwrap().unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(rx.await.is_err(), "handler must not run on failure");
    assert_eq!(reporter.count(), 1);
}

#[tokio::test]
async fn every_verb_sends_json_content_type() {
    let addr = start_server().await;
    let url = format!("http://{addr}/echo");
    let (d, reporter) = dispatcher(ClientConfig::default());

    for method in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
        let (handler, rx) = channel();
        d.request(method, &url, Some(r#"{"k":"v"}"#), Some(handler))
            .unwrap()
            .await
            .unwrap()
            .unwrap();
        let echoed = rx.await.unwrap();
        assert_eq!(echoed["method"], method);
        assert_eq!(echoed["content_type"], "application/json", "{method}");
    }
    assert_eq!(reporter.count(), 0);
}

#[tokio::test]
async fn patch_body_arrives_unchanged() {
    let addr = start_server().await;
    let url = format!("http://{addr}/echo");
    let (d, _) = dispatcher(ClientConfig::default());
    let json = r#"{"name":"grüß","n":[1,2]}"#;

    let (handler, rx) = channel();
    d.patch(&url, json, Some(handler)).unwrap().await.unwrap().unwrap();

    let echoed = rx.await.unwrap();
    assert_eq!(echoed["method"], "PATCH");
    assert_eq!(echoed["body"], json);
}

#[tokio::test]
async fn www_form_post_encodes_json_text() {
    let addr = start_server().await;
    let url = format!("http://{addr}/echo");
    let config = ClientConfig {
        post_encoding: PostEncoding::WwwForm,
        ..ClientConfig::default()
    };
    let (d, _) = dispatcher(config);

    let (handler, rx) = channel();
    d.post(&url, r#"{"a":1}"#, Some(handler)).unwrap().await.unwrap().unwrap();

    let echoed = rx.await.unwrap();
    assert_eq!(echoed["body"], "%7B%22a%22%3A1%7D");
    assert_eq!(echoed["content_type"], "application/json");
}

#[tokio::test]
async fn post_form_sends_form_fields() {
    let addr = start_server().await;
    let (d, reporter) = dispatcher(ClientConfig::default());

    let (handler, rx) = channel();
    d.post_form(
        &format!("http://{addr}/form"),
        [("name", "a"), ("age", "30")],
        Some(handler),
    )
    .unwrap()
    .await
    .unwrap()
    .unwrap();

    assert_eq!(rx.await.unwrap(), json!({"name": "a", "age": "30"}));
    assert_eq!(reporter.count(), 0);
}

#[tokio::test]
async fn protocol_error_ignores_body_for_handler() {
    let addr = start_server().await;
    let (d, reporter) = dispatcher(ClientConfig::default());

    let (handler, rx) = channel();
    let err = d
        .get(&format!("http://{addr}/status/404"), Some(handler))
        .unwrap()
        .await
        .unwrap()
        .unwrap_err();

    assert_eq!(
        err,
        RequestError::Protocol {
            status: 404,
            body: r#"{"error":"not found"}"#.to_string(),
        }
    );
    assert!(rx.await.is_err());
    assert_eq!(reporter.count(), 1);
}

#[tokio::test]
async fn connection_error_reports_once() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (d, reporter) = dispatcher(ClientConfig::default());
    let (handler, rx) = channel();
    let err = d
        .get(&format!("http://{addr}/items"), Some(handler))
        .unwrap()
        .await
        .unwrap()
        .unwrap_err();

    assert!(err.is_connection(), "{err:?}");
    assert!(rx.await.is_err());
    assert_eq!(reporter.count(), 1);
}

#[tokio::test]
async fn non_json_body_follows_parse_policy() {
    let addr = start_server().await;
    let url = format!("http://{addr}/text");

    let (strict, strict_reporter) = dispatcher(ClientConfig::default());
    let err = strict.get(&url, None).unwrap().await.unwrap().unwrap_err();
    assert!(matches!(err, RequestError::Parse(_)));
    assert_eq!(strict_reporter.count(), 1);

    let config = ClientConfig {
        parse_policy: ParsePolicy::Lenient,
        ..ClientConfig::default()
    };
    let (lenient, lenient_reporter) = dispatcher(config);
    let (handler, rx) = channel();
    lenient.get(&url, Some(handler)).unwrap().await.unwrap().unwrap();
    assert_eq!(rx.await.unwrap(), Value::Null);
    assert_eq!(lenient_reporter.count(), 0);
}

#[tokio::test]
async fn invalid_utf8_body_is_a_parse_error_under_strict() {
    let addr = start_server().await;
    let url = format!("http://{addr}/binary");

    let (strict, strict_reporter) = dispatcher(ClientConfig::default());
    let (handler, rx) = channel();
    let err = strict.get(&url, Some(handler)).unwrap().await.unwrap().unwrap_err();
    assert!(matches!(err, RequestError::Parse(_)), "{err:?}");
    assert!(rx.await.is_err());
    assert_eq!(strict_reporter.count(), 1);

    let config = ClientConfig {
        parse_policy: ParsePolicy::Lenient,
        ..ClientConfig::default()
    };
    let (lenient, _) = dispatcher(config);
    let (handler, rx) = channel();
    lenient.get(&url, Some(handler)).unwrap().await.unwrap().unwrap();
    assert_eq!(rx.await.unwrap(), Value::Null);
}

#[tokio::test]
async fn concurrent_requests_complete_independently() {
    let addr = start_server().await;
    let base = format!("http://{addr}/items");
    let (d, reporter) = dispatcher(ClientConfig::default());

    let tasks: Vec<_> = (0..8)
        .map(|i| d.post(&base, &format!(r#"{{"n":{i}}}"#), None).unwrap())
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let items = d.send(d.client().build_get(&base).unwrap()).await.unwrap();
    assert_eq!(items.as_array().unwrap().len(), 8);
    assert_eq!(reporter.count(), 0);
}
