//! End-to-end routing through flows assembled from TOML.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use message_relay::channel::PollableChannel;
use message_relay::config::loader::parse_config;
use message_relay::http::{ClientError, EncodedRequest, HttpClient, HttpResponse};
use message_relay::lifecycle::build_flow_with_client;
use message_relay::{Flow, Message, MessageBuilder, MessagingError};

#[derive(Debug)]
struct NoNetwork;

#[async_trait]
impl HttpClient for NoNetwork {
    async fn execute(&self, _url: &str, _request: &EncodedRequest) -> Result<HttpResponse, ClientError> {
        Err(ClientError::Other("offline".into()))
    }
}

fn flow(toml: &str) -> Flow {
    let config = parse_config(toml).expect("valid flow");
    build_flow_with_client(&config, Arc::new(NoNetwork)).expect("flow builds")
}

async fn next_text(flow: &Flow, queue: &str) -> Option<String> {
    let queue = flow.queue(queue).expect("queue exists");
    queue
        .receive(Duration::from_millis(50))
        .await
        .and_then(|m| m.payload().as_text().map(str::to_string))
}

const OUTPUTS: &str = r#"
    [[channels]]
    name = "output1"
    [[channels]]
    name = "output2"
"#;

#[tokio::test]
async fn test_payload_names_target_channel() {
    let flow = flow(&format!(
        r#"{OUTPUTS}
        [[routers]]
        name = "by-payload"
        input_channel = "input"
        strategy = {{ type = "payload_as_name" }}
        "#
    ));

    assert!(flow.send("input", Message::new("output2")).await.unwrap());
    assert_eq!(next_text(&flow, "output2").await.as_deref(), Some("output2"));
    assert!(next_text(&flow, "output1").await.is_none());
}

#[tokio::test]
async fn test_unresolvable_payload_fails_when_required() {
    let flow = flow(&format!(
        r#"{OUTPUTS}
        [[routers]]
        name = "strict"
        input_channel = "input"
        strategy = {{ type = "payload_as_name" }}
        resolution_required = true
        "#
    ));

    let err = flow.send("input", Message::new("noSuchChannel")).await.unwrap_err();
    match err.root() {
        MessagingError::Delivery { source: Some(cause), .. } => {
            assert!(matches!(**cause, MessagingError::UnresolvedChannel(ref n) if n == "noSuchChannel"));
        }
        other => panic!("expected delivery failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ignore_resolution_failures_completes() {
    let flow = flow(&format!(
        r#"{OUTPUTS}
        [[routers]]
        name = "lenient"
        input_channel = "input"
        strategy = {{ type = "payload_as_name" }}
        resolution_required = true
        ignore_channel_name_resolution_failures = true
        default_output = "output1"
        "#
    ));

    assert!(flow.send("input", Message::new("noSuchChannel")).await.unwrap());
    // Ignoring drops the name; the default output still catches the message.
    assert_eq!(next_text(&flow, "output1").await.as_deref(), Some("noSuchChannel"));
}

#[tokio::test]
async fn test_default_output_when_nothing_matches() {
    let flow = flow(&format!(
        r#"{OUTPUTS}
        [[routers]]
        name = "numbers"
        input_channel = "input"
        strategy = {{ type = "mapping", mappings = {{ "1" = "output1" }} }}
        default_output = "output2"
        "#
    ));

    flow.send("input", Message::new("1")).await.unwrap();
    flow.send("input", Message::new("99")).await.unwrap();

    assert_eq!(next_text(&flow, "output1").await.as_deref(), Some("1"));
    assert_eq!(next_text(&flow, "output2").await.as_deref(), Some("99"));
}

#[tokio::test]
async fn test_nothing_resolved_without_default_fails_when_required() {
    let flow = flow(&format!(
        r#"{OUTPUTS}
        [[routers]]
        name = "numbers"
        input_channel = "input"
        strategy = {{ type = "mapping", mappings = {{ "1" = "output1" }} }}
        resolution_required = true
        "#
    ));

    let err = flow.send("input", Message::new("99")).await.unwrap_err();
    assert!(matches!(err, MessagingError::Handler { ref channel, .. } if channel == "input"));
    assert!(matches!(err.root(), MessagingError::Delivery { source: None, .. }));
}

#[tokio::test]
async fn test_header_value_fans_out_once_per_channel() {
    let flow = flow(&format!(
        r#"{OUTPUTS}
        [[routers]]
        name = "by-header"
        input_channel = "input"
        strategy = {{ type = "header_value", header = "targets" }}
        "#
    ));

    let message = MessageBuilder::with_payload("order")
        .header("targets", "output1, output2, output1")
        .build();
    flow.send("input", message).await.unwrap();

    assert_eq!(next_text(&flow, "output1").await.as_deref(), Some("order"));
    assert!(next_text(&flow, "output1").await.is_none());
    assert_eq!(next_text(&flow, "output2").await.as_deref(), Some("order"));
}

#[tokio::test]
async fn test_send_timeout_on_full_queue() {
    let flow = flow(
        r#"
        [[channels]]
        name = "narrow"
        capacity = 1
        [[routers]]
        name = "fixed"
        input_channel = "input"
        strategy = { type = "fixed_list", channels = ["narrow"] }
        resolution_required = true
        send_timeout_ms = 10
        "#,
    );

    flow.send("input", Message::new("first")).await.unwrap();
    let err = flow.send("input", Message::new("second")).await.unwrap_err();
    assert!(matches!(err.root(), MessagingError::Delivery { .. }));
    assert_eq!(next_text(&flow, "narrow").await.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_chained_routers() {
    let flow = flow(&format!(
        r#"{OUTPUTS}
        [[routers]]
        name = "front"
        input_channel = "input"
        strategy = {{ type = "fixed_list", channels = ["second-in"] }}
        [[routers]]
        name = "back"
        input_channel = "second-in"
        strategy = {{ type = "payload_as_name" }}
        "#
    ));

    flow.send("input", Message::new("output1")).await.unwrap();
    assert_eq!(next_text(&flow, "output1").await.as_deref(), Some("output1"));
}

#[test]
fn test_static_routing_cycle_is_rejected_at_load() {
    let err = parse_config(
        r#"
        [[routers]]
        name = "loop"
        input_channel = "input"
        strategy = { type = "fixed_list", channels = ["input"] }
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("routes back into its own input channel 'input'"));
}

#[tokio::test]
async fn test_dynamic_routing_cycle_fails_the_send() {
    let flow = flow(
        r#"
        [[routers]]
        name = "echo"
        input_channel = "input"
        strategy = { type = "payload_as_name" }
        "#,
    );

    let err = flow.send("input", Message::new("input")).await.unwrap_err();
    assert!(matches!(err.root(), MessagingError::Delivery { .. }));
}
