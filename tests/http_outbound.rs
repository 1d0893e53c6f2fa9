//! Outbound gateway against a live local backend.
//!
//! Each test starts a recording backend on its own ephemeral port and sends
//! one message through an `HttpRequestExecutingHandler` backed by reqwest.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use message_relay::channel::{MessageHandler, PollableChannel, QueueChannel};
use message_relay::http::handler::STATUS_CODE_HEADER;
use message_relay::http::{ClientError, HttpRequestExecutingHandler, ReqwestClient};
use message_relay::message::{PackedArray, Value, XmlSource};
use message_relay::{Message, MessagingError, Payload};

mod common;

fn client() -> Arc<ReqwestClient> {
    Arc::new(ReqwestClient::new(Some(Duration::from_secs(5))).unwrap())
}

async fn post(payload: Payload) -> common::CapturedRequest {
    let (addr, mut requests) = common::start_recording_backend(200, "ok").await;
    let handler = HttpRequestExecutingHandler::new(format!("http://{}/submit", addr), client());

    handler.handle_message(Message::new(payload)).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), requests.recv())
        .await
        .expect("backend saw no request")
        .expect("backend stopped")
}

#[tokio::test]
async fn test_text_map_is_urlencoded_on_the_wire() {
    let request = post(Payload::text_map([("a", "1"), ("b", "2")])).await;

    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/submit");
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(request.body_text(), "a=1&b=2");
}

#[tokio::test]
async fn test_null_values_are_sent_name_only() {
    let request = post(Payload::text_map([
        ("a", Value::Null),
        ("b", Value::from("foo")),
        ("c", Value::Null),
    ]))
    .await;

    assert_eq!(request.body_text(), "a&b=foo&c");
}

#[tokio::test]
async fn test_bytes_are_sent_as_octet_stream() {
    let request = post(Payload::from(b"Hello World".to_vec())).await;

    assert_eq!(request.header("content-type"), Some("application/octet-stream"));
    assert_eq!(request.body, b"Hello World");
}

#[tokio::test]
async fn test_xml_source_is_sent_as_text_xml() {
    let request = post(XmlSource::new("<city>Ambler</city>").into()).await;

    assert_eq!(request.header("content-type"), Some("text/xml"));
    assert_eq!(request.body_text(), "<city>Ambler</city>");
}

#[tokio::test]
async fn test_mixed_map_is_multipart_with_boundary() {
    let request = post(Payload::text_map([
        ("a", Value::Integer(1)),
        ("b", Value::from("foo")),
    ]))
    .await;

    let content_type = request.header("content-type").unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    let body = request.body_text();
    assert!(body.contains("name=\"a\""));
    assert!(body.contains("name=\"b\""));
    assert!(body.contains("foo"));
}

#[tokio::test]
async fn test_reply_carries_status_and_body() {
    let (addr, _requests) = common::start_recording_backend(200, "accepted").await;
    let replies = Arc::new(QueueChannel::new("replies"));
    let handler = HttpRequestExecutingHandler::new(format!("http://{}/orders", addr), client())
        .output_channel(replies.clone());

    handler.handle_message(Message::new("order-1")).await.unwrap();

    let reply = replies.receive(Duration::from_millis(500)).await.unwrap();
    assert_eq!(reply.payload().as_text(), Some("accepted"));
    assert_eq!(reply.header(STATUS_CODE_HEADER), Some("200"));
}

#[tokio::test]
async fn test_server_error_is_transport_failure() {
    let (addr, _requests) = common::start_recording_backend(500, "boom").await;
    let url = format!("http://{}/orders", addr);
    let handler = HttpRequestExecutingHandler::new(url.clone(), client());

    let err = handler.handle_message(Message::new("x")).await.unwrap_err();
    match err {
        MessagingError::Transport { url: failed, source } => {
            assert_eq!(failed, url);
            assert!(matches!(source, ClientError::Status(s) if s.as_u16() == 500));
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_keeps_underlying_cause() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{}/orders", port);
    let handler = HttpRequestExecutingHandler::new(url.clone(), client());

    let err = handler.handle_message(Message::new("x")).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("HTTP request execution failed for URI [{}]", url)
    );
    let cause = err.source().expect("transport error has a cause");
    assert!(cause.downcast_ref::<ClientError>().is_some_and(|c| matches!(c, ClientError::Request(_))));
}

#[tokio::test]
async fn test_multipart_keeps_nulls_and_sends_structured_parts_as_json() {
    let request = post(Payload::text_map([
        (
            "a",
            Value::List(vec![Value::Null, Value::Integer(4), Value::Null]),
        ),
        ("b", Value::Packed(PackedArray::Int(vec![1, 2, 3]))),
    ]))
    .await;

    let body = request.body_text();
    assert_eq!(body.matches("name=\"a\"").count(), 3);
    assert_eq!(body.matches("name=\"b\"").count(), 1);
    assert!(body.contains("application/json"));
    assert!(body.contains("[1,2,3]"));
}
