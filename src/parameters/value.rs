use crate::server::UploadedFile;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate};
use heck::ToSnakeCase;
use serde_json::{json, Number, Value};
use std::collections::HashMap;

/// A parameter value as extracted from the request, before casting.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Single text field (query, form, path, header, text body)
    Text(String),
    /// Repeated field (`collectionFormat: multi`)
    List(Vec<String>),
    /// Decoded JSON body or JSON array element
    Json(Value),
    File(UploadedFile),
}

impl RawValue {
    /// Text form of a scalar, as used by primitive casts
    pub(crate) fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Json(Value::String(s)) => Some(s.clone()),
            RawValue::Json(Value::Bool(b)) => Some(b.to_string()),
            RawValue::Json(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// JSON view for schema validation
    pub(crate) fn to_json(&self) -> Value {
        match self {
            RawValue::Text(s) => Value::String(s.clone()),
            RawValue::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            RawValue::Json(v) => v.clone(),
            RawValue::File(f) => file_json(f),
        }
    }
}

/// A decoded, typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    /// `format: byte` (base64-decoded) or `format: binary`
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Array(Vec<ParamValue>),
    /// Objects and schema-validated bodies, kept as JSON
    Json(Value),
    File(UploadedFile),
}

impl ParamValue {
    /// Convert a declared `default` without casting it.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Integer(i),
                None => ParamValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ParamValue::Text(s.clone()),
            Value::Array(items) => ParamValue::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(_) => ParamValue::Json(value.clone()),
        }
    }

    /// JSON rendering, also used for keyword validation.
    ///
    /// Bytes render as base64, dates as ISO-8601 and files as a small
    /// descriptor object. Non-finite numbers render as `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Null => Value::Null,
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Integer(i) => Value::Number((*i).into()),
            ParamValue::Number(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ParamValue::Text(s) => Value::String(s.clone()),
            ParamValue::Bytes(b) => Value::String(STANDARD.encode(b)),
            ParamValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            ParamValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            ParamValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            ParamValue::Json(v) => v.clone(),
            ParamValue::File(f) => file_json(f),
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Json(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            ParamValue::Json(v) => v.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(f) => Some(*f),
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Json(v) => v.as_f64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ParamValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            ParamValue::File(f) => Some(f),
            _ => None,
        }
    }
}

fn file_json(file: &UploadedFile) -> Value {
    json!({
        "filename": file.filename,
        "content_type": file.content_type,
        "size": file.data.len(),
    })
}

/// Decoded parameters of one request, keyed by snake_case name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: HashMap<String, ParamValue>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the snake_case form of `name`
    pub fn insert(&mut self, name: &str, value: ParamValue) {
        self.values.insert(name.to_snake_case(), value);
    }

    /// Look up by snake_case name (`petId` is stored as `pet_id`)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_i64)
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_f64)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Remove and return a value, for handlers that take ownership of a body
    pub fn take(&mut self, name: &str) -> Option<ParamValue> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    /// JSON object of every value, sorted by name
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        Value::Object(
            names
                .into_iter()
                .map(|name| (name.clone(), self.values[name].to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_from_json_keeps_defaults_uncast() {
        assert_eq!(ParamValue::from_json(&json!(20)), ParamValue::Integer(20));
        assert_eq!(ParamValue::from_json(&json!("20")), ParamValue::Text("20".into()));
        assert_eq!(
            ParamValue::from_json(&json!([1, "a"])),
            ParamValue::Array(vec![ParamValue::Integer(1), ParamValue::Text("a".into())])
        );
    }

    #[test]
    fn test_to_json_renderings() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(ParamValue::Date(date).to_json(), json!("2024-02-29"));
        assert_eq!(ParamValue::Bytes(b"hi".to_vec()).to_json(), json!("aGk="));
        assert_eq!(ParamValue::Number(f64::NAN).to_json(), Value::Null);
    }

    #[test]
    fn test_parameters_use_snake_case_keys() {
        let mut params = Parameters::new();
        params.insert("petId", ParamValue::Integer(7));
        params.insert("X-Trace", ParamValue::Text("t".into()));
        assert_eq!(params.get_i64("pet_id"), Some(7));
        assert_eq!(params.get_str("x_trace"), Some("t"));
        assert!(params.get("petId").is_none());
        assert_eq!(params.to_json(), json!({ "pet_id": 7, "x_trace": "t" }));
    }
}
