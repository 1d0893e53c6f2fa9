//! Outbound gateway: turns messages into HTTP requests.
//!
//! # Responsibilities
//! - Encode the payload (see encoder.rs)
//! - Execute through the configured `HttpClient`
//! - Wrap client failures with the target URL
//! - Publish the response as a reply when an output channel is set

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

use crate::channel::{MessageChannel, MessageHandler};
use crate::error::{MessagingError, MessagingResult};
use crate::http::client::{HttpClient, HttpResponse};
use crate::http::encoder::encode;
use crate::message::{Message, MessageBuilder, Payload};
use crate::observability::metrics;

/// Reply header carrying the response status code.
pub const STATUS_CODE_HEADER: &str = "http_statusCode";

/// Reply header carrying the response content type.
pub const CONTENT_TYPE_HEADER: &str = "content-type";

/// Sends each handled message to a fixed URL.
#[derive(Debug)]
pub struct HttpRequestExecutingHandler {
    url: String,
    method: Method,
    client: Arc<dyn HttpClient>,
    output_channel: Option<Arc<dyn MessageChannel>>,
    send_timeout: Option<Duration>,
}

impl HttpRequestExecutingHandler {
    /// Create a handler posting to `url`.
    pub fn new(url: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            url: url.into(),
            method: Method::POST,
            client,
            output_channel: None,
            send_timeout: None,
        }
    }

    pub fn http_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn output_channel(mut self, channel: Arc<dyn MessageChannel>) -> Self {
        self.output_channel = Some(channel);
        self
    }

    /// Timeout for sending replies to the output channel.
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    fn build_reply(&self, request: &Message, response: HttpResponse) -> Message {
        let content_type = response.content_type().map(str::to_string);
        let textual = content_type
            .as_deref()
            .map(|ct| ct.starts_with("text/") || ct.contains("json") || ct.contains("xml"))
            .unwrap_or(false);

        let payload = if textual {
            Payload::Text(String::from_utf8_lossy(&response.body).into_owned())
        } else {
            Payload::Bytes(response.body)
        };

        let mut builder = MessageBuilder::with_payload(payload)
            .copy_headers(request.headers())
            .header(STATUS_CODE_HEADER, response.status.as_u16().to_string());
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE_HEADER, ct);
        }
        builder.build()
    }
}

#[async_trait]
impl MessageHandler for HttpRequestExecutingHandler {
    async fn handle_message(&self, message: Message) -> MessagingResult<()> {
        let request = encode(self.method.clone(), message.payload());
        let method = request.method.as_str().to_string();

        tracing::debug!(
            message_id = %message.id(),
            url = %self.url,
            method = %method,
            content_type = %request.content_type,
            payload = message.payload().kind(),
            "Executing HTTP request"
        );

        let response = match self.client.execute(&self.url, &request).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_http_request(&method, request.content_type.as_str(), "error");
                tracing::error!(
                    message_id = %message.id(),
                    url = %self.url,
                    error = %e,
                    "HTTP request failed"
                );
                return Err(MessagingError::Transport {
                    url: self.url.clone(),
                    source: e,
                });
            }
        };

        metrics::record_http_request(&method, request.content_type.as_str(), "ok");
        tracing::debug!(
            message_id = %message.id(),
            status = %response.status,
            content_type = ?response.headers.get(CONTENT_TYPE),
            "HTTP response received"
        );

        let Some(output) = &self.output_channel else {
            return Ok(());
        };

        let reply = self.build_reply(&message, response);
        if !output.send(reply, self.send_timeout).await? {
            return Err(MessagingError::delivery(
                message.id(),
                format!("output channel '{}' did not accept the reply", output.name()),
            ));
        }
        Ok(())
    }
}
