//! Content-type inference and body normalization for outbound requests.
//!
//! # Inference Order
//! ```text
//! Bytes                          → application/octet-stream   (body unchanged)
//! XML source                     → text/xml                   (body unchanged)
//! Map, every key text            → form data
//!     every present element text → application/x-www-form-urlencoded
//!     otherwise                  → multipart/form-data
//! Map, any key not text          → application/x-java-serialized-object (map unchanged)
//! Form                           → same form decision, no re-normalization
//! Text                           → text/plain;charset=UTF-8
//! Object                         → application/x-java-serialized-object
//! ```
//!
//! # Normalization
//! Each form value becomes an ordered list: null → `[null]`, list → its
//! elements (nulls kept, nested lists kept whole), anything else → one
//! element. Packed primitive arrays are one element and force multipart.

use std::fmt;

use bytes::Bytes;
use reqwest::Method;

use crate::message::{FormData, MapKey, Payload, Value, XmlSource};

/// Content types the encoder can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    OctetStream,
    TextXml,
    FormUrlEncoded,
    MultipartFormData,
    SerializedObject,
    TextPlain,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::OctetStream => "application/octet-stream",
            ContentType::TextXml => "text/xml",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::MultipartFormData => "multipart/form-data",
            ContentType::SerializedObject => "application/x-java-serialized-object",
            ContentType::TextPlain => "text/plain;charset=UTF-8",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an encoded request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Bytes(Bytes),
    Source(XmlSource),
    Form(FormData),
    /// A map with non-text keys, passed through unflattened.
    Map(Vec<(MapKey, Value)>),
    Object(serde_json::Value),
    Text(String),
}

/// Method, content type and body for one outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRequest {
    pub method: Method,
    pub content_type: ContentType,
    pub body: RequestBody,
}

impl EncodedRequest {
    /// The form body, if the payload was encoded as form data.
    pub fn form(&self) -> Option<&FormData> {
        match &self.body {
            RequestBody::Form(form) => Some(form),
            _ => None,
        }
    }
}

/// Classify `payload` and build the request it should be sent as.
pub fn encode(method: Method, payload: &Payload) -> EncodedRequest {
    let (content_type, body) = match payload {
        Payload::Bytes(bytes) => (ContentType::OctetStream, RequestBody::Bytes(bytes.clone())),
        Payload::Source(source) => (ContentType::TextXml, RequestBody::Source(source.clone())),
        Payload::Map(entries) => match to_form_data(entries) {
            Some(form) => (form_content_type(&form), RequestBody::Form(form)),
            None => (ContentType::SerializedObject, RequestBody::Map(entries.clone())),
        },
        Payload::Form(form) => (form_content_type(form), RequestBody::Form(form.clone())),
        Payload::Text(text) => (ContentType::TextPlain, RequestBody::Text(text.clone())),
        Payload::Object(object) => (ContentType::SerializedObject, RequestBody::Object(object.clone())),
    };

    EncodedRequest {
        method,
        content_type,
        body,
    }
}

fn form_content_type(form: &FormData) -> ContentType {
    if form.is_all_text() {
        ContentType::FormUrlEncoded
    } else {
        ContentType::MultipartFormData
    }
}

/// Convert a map to form data. `None` if any key is not text.
fn to_form_data(entries: &[(MapKey, Value)]) -> Option<FormData> {
    let mut form = FormData::new();
    for (key, value) in entries {
        let key = key.as_text()?;
        form.set(key, normalize(value));
    }
    Some(form)
}

fn normalize(value: &Value) -> Vec<Option<Value>> {
    match value {
        Value::Null => vec![None],
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => None,
                other => Some(other.clone()),
            })
            .collect(),
        other => vec![Some(other.clone())],
    }
}
