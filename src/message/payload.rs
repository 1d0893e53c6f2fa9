//! Payload shapes carried by a message.
//!
//! The set of shapes is closed: every consumer matches on [`Payload`] and
//! [`Value`] exhaustively instead of probing runtime types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Raw byte sequence.
    Bytes(Bytes),
    /// Structured XML source document.
    Source(XmlSource),
    /// Plain text.
    Text(String),
    /// Ordered key/value map. Keys may be text or arbitrary values.
    Map(Vec<(MapKey, Value)>),
    /// Form data that is already multi-valued.
    Form(FormData),
    /// Opaque structured object.
    Object(serde_json::Value),
}

impl Payload {
    /// Build a map payload from string-keyed entries, keeping their order.
    pub fn text_map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Payload::Map(
            entries
                .into_iter()
                .map(|(k, v)| (MapKey::Text(k.into()), v.into()))
                .collect(),
        )
    }

    /// Returns the text content when the payload is [`Payload::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the shape, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Bytes(_) => "bytes",
            Payload::Source(_) => "source",
            Payload::Text(_) => "text",
            Payload::Map(_) => "map",
            Payload::Form(_) => "form",
            Payload::Object(_) => "object",
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(b))
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Bytes(b)
    }
}

impl From<XmlSource> for Payload {
    fn from(source: XmlSource) -> Self {
        Payload::Source(source)
    }
}

impl From<FormData> for Payload {
    fn from(form: FormData) -> Self {
        Payload::Form(form)
    }
}

/// An XML document handed over as a source rather than as bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlSource {
    system_id: Option<String>,
    document: String,
}

impl XmlSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            system_id: None,
            document: document.into(),
        }
    }

    /// Attach the identifier the document was loaded from.
    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = Some(system_id.into());
        self
    }

    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }

    pub fn document(&self) -> &str {
        &self.document
    }
}

/// Key of a [`Payload::Map`] entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapKey {
    Text(String),
    Other(Value),
}

impl MapKey {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MapKey::Text(s) => Some(s),
            MapKey::Other(_) => None,
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::Text(s.to_string())
    }
}

impl From<String> for MapKey {
    fn from(s: String) -> Self {
        MapKey::Text(s)
    }
}

impl From<i64> for MapKey {
    fn from(n: i64) -> Self {
        MapKey::Other(Value::Integer(n))
    }
}

/// Value of a [`Payload::Map`] entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Collection or object array. Its elements are spread into form values.
    List(Vec<Value>),
    /// Homogeneous primitive array. Always treated as a single element.
    Packed(PackedArray),
    /// Opaque record.
    Object(serde_json::Value),
}

impl Value {
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Build a list value from anything convertible to values.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(_) | Value::Packed(_) => match serde_json::to_string(self) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => Err(fmt::Error),
            },
            // A bare JSON string displays without quotes.
            Value::Object(serde_json::Value::String(s)) => write!(f, "{}", s),
            Value::Object(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<PackedArray> for Value {
    fn from(p: PackedArray) -> Self {
        Value::Packed(p)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Primitive array kept whole when normalized into form values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackedArray {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
}

impl PackedArray {
    pub fn len(&self) -> usize {
        match self {
            PackedArray::Int(v) => v.len(),
            PackedArray::Float(v) => v.len(),
            PackedArray::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Multi-valued form data: each key maps to an ordered list of optional values.
///
/// Keys keep insertion order. A `None` element is a name-only field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    fields: Vec<(String, Vec<Option<Value>>)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value under `key`, creating the key if needed.
    pub fn add(&mut self, key: impl Into<String>, value: Option<Value>) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.fields.push((key, vec![value])),
        }
    }

    /// Replace all values under `key`.
    pub fn set(&mut self, key: impl Into<String>, values: Vec<Option<Value>>) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.fields.push((key, values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[Option<Value>]> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<Value>])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every present element is text. Nulls and empty lists do not count.
    pub fn is_all_text(&self) -> bool {
        self.fields
            .iter()
            .flat_map(|(_, values)| values.iter().flatten())
            .all(Value::is_text)
    }
}
