//! HTTP client collaborator.
//!
//! # Responsibilities
//! - Define the `HttpClient` seam the outbound handler executes through
//! - Render an `EncodedRequest` onto the wire with reqwest
//!
//! # Design Decisions
//! - Timeouts belong to the client, not to the handler
//! - Non-success statuses are client errors, like any other failure
//! - No retries

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use thiserror::Error;

use crate::http::encoder::{ContentType, EncodedRequest, RequestBody};
use crate::http::form;

/// Errors raised by an [`HttpClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(StatusCode),

    #[error("cannot encode request body: {0}")]
    Encode(String),

    #[error("{0}")]
    Other(String),
}

/// Response returned by an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// Executes encoded requests.
#[async_trait]
pub trait HttpClient: Send + Sync + fmt::Debug {
    async fn execute(&self, url: &str, request: &EncodedRequest) -> Result<HttpResponse, ClientError>;
}

/// [`HttpClient`] backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client. `timeout` bounds the whole request.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, url: &str, request: &EncodedRequest) -> Result<HttpResponse, ClientError> {
        let builder = self.client.request(request.method.clone(), url);

        let builder = match &request.body {
            RequestBody::Form(data) if request.content_type == ContentType::MultipartFormData => {
                // reqwest sets the content type with the boundary.
                builder.multipart(form::to_multipart(data)?)
            }
            body => {
                let bytes = render_body(body)?;
                builder
                    .header(CONTENT_TYPE, request.content_type.as_str())
                    .body(bytes)
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Serialize a non-multipart body to bytes.
fn render_body(body: &RequestBody) -> Result<Bytes, ClientError> {
    let bytes = match body {
        RequestBody::Bytes(b) => b.clone(),
        RequestBody::Source(source) => Bytes::from(source.document().to_string()),
        RequestBody::Form(data) => Bytes::from(form::to_urlencoded(data)),
        RequestBody::Text(text) => Bytes::from(text.clone()),
        RequestBody::Map(entries) => Bytes::from(
            serde_json::to_vec(entries).map_err(|e| ClientError::Encode(e.to_string()))?,
        ),
        RequestBody::Object(object) => Bytes::from(
            serde_json::to_vec(object).map_err(|e| ClientError::Encode(e.to_string()))?,
        ),
    };
    Ok(bytes)
}
