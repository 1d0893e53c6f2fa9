//! Wire rendering of form data.
//!
//! # Responsibilities
//! - Render urlencoded bodies, keeping name-only fields for null elements
//! - Build multipart forms, one part per element
//!
//! # Design Decisions
//! - A null element is an empty text part in multipart, so both encodings
//!   keep the element count
//! - Structured elements (objects, packed arrays, nested lists) become JSON parts

use reqwest::multipart::{Form, Part};
use url::form_urlencoded::byte_serialize;

use crate::http::client::ClientError;
use crate::message::{FormData, Value};

/// Render `form` as `application/x-www-form-urlencoded`.
///
/// A `None` element renders as the bare field name.
pub fn to_urlencoded(form: &FormData) -> String {
    let mut pairs = Vec::new();
    for (key, values) in form.iter() {
        let key: String = byte_serialize(key.as_bytes()).collect();
        for value in values {
            match value {
                Some(v) => {
                    let v: String = byte_serialize(v.to_string().as_bytes()).collect();
                    pairs.push(format!("{}={}", key, v));
                }
                None => pairs.push(key.clone()),
            }
        }
    }
    pairs.join("&")
}

/// Build a multipart form from `form`.
///
/// A `None` element becomes an empty text part.
pub fn to_multipart(form: &FormData) -> Result<Form, ClientError> {
    let mut multipart = Form::new();
    for (key, values) in form.iter() {
        for value in values {
            let part = match value {
                Some(v) => to_part(v)?,
                None => Part::text(""),
            };
            multipart = multipart.part(key.to_string(), part);
        }
    }
    Ok(multipart)
}

fn to_part(value: &Value) -> Result<Part, ClientError> {
    match value {
        Value::Null => Ok(Part::text("")),
        Value::Text(_) | Value::Integer(_) | Value::Float(_) | Value::Bool(_) => {
            Ok(Part::text(value.to_string()))
        }
        Value::List(_) | Value::Packed(_) | Value::Object(_) => {
            let json = serde_json::to_vec(value).map_err(|e| ClientError::Encode(e.to_string()))?;
            Part::bytes(json)
                .mime_str("application/json")
                .map_err(ClientError::Request)
        }
    }
}
