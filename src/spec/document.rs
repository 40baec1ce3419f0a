use crate::error::SpecError;
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Immutable Swagger 2.0 document with reference resolution.
///
/// Construction takes a deep copy of the caller's document and drops the
/// top-level `host` key; the caller's value is never touched.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    api: Value,
}

impl SpecDocument {
    #[must_use]
    pub fn new(api: &Value) -> Self {
        let mut api = api.clone();
        if let Value::Object(map) = &mut api {
            map.remove("host");
        }
        Self { api }
    }

    /// The document as stored (without `host`)
    #[must_use]
    pub fn api(&self) -> &Value {
        &self.api
    }

    /// Resolve a document-local JSON reference such as `#/definitions/Pet`.
    ///
    /// `#` alone resolves to the document root. References into other
    /// documents are rejected.
    pub fn resolve(&self, reference: &str) -> Result<&Value, SpecError> {
        let unresolved = || SpecError::ReferenceResolution {
            reference: reference.to_string(),
        };
        let fragment = reference.strip_prefix('#').ok_or_else(unresolved)?;
        if fragment.is_empty() {
            return Ok(&self.api);
        }
        if !fragment.starts_with('/') {
            return Err(unresolved());
        }
        let pointer = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|_| unresolved())?;
        self.api.pointer(&pointer).ok_or_else(unresolved)
    }

    /// Return `value` unchanged unless it is a mapping with a non-empty `$ref`,
    /// in which case the reference is resolved.
    ///
    /// Exactly one lookup is performed; a resolved node that is itself a
    /// reference is returned as-is.
    pub fn maybe_resolve<'a>(&'a self, value: &'a Value) -> Result<&'a Value, SpecError> {
        match value.get("$ref").and_then(Value::as_str) {
            Some(reference) if !reference.is_empty() => self.resolve(reference),
            _ => Ok(value),
        }
    }

    /// The `definitions` section, if any
    #[must_use]
    pub fn definitions(&self) -> Option<&Value> {
        self.api.get("definitions")
    }

    /// Document-wide `consumes`
    #[must_use]
    pub fn consumes(&self) -> Option<&Value> {
        self.api.get("consumes")
    }

    /// Document-wide `produces`
    #[must_use]
    pub fn produces(&self) -> Option<&Value> {
        self.api.get("produces")
    }

    /// `basePath`, defaulting to `/`
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.api
            .get("basePath")
            .and_then(Value::as_str)
            .unwrap_or("/")
    }

    /// `info.title`, if present
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.api
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
    }
}
