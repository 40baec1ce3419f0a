//! # Schema Validator Cache
//!
//! JSON Schema validators are expensive to compile, and the same body schema is
//! checked on every request to its operation. [`SchemaCache`] compiles each
//! distinct schema once and shares the compiled validator across requests.
//!
//! Schemas are compiled as Draft 4 (the dialect Swagger 2.0 schemas are
//! written in) and wrapped so that `#/definitions/...` references inside them
//! resolve against the loaded document:
//!
//! ```json
//! { "definitions": { ...document definitions... }, "allOf": [ <schema> ] }
//! ```
//!
//! The document is immutable after load, so entries are never invalidated.

use crate::error::{FieldError, SpecError};
use crate::spec::SpecDocument;
use jsonschema::Validator;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

/// Thread-safe cache of compiled validators keyed by the schema's JSON text.
pub struct SchemaCache {
    definitions: Value,
    cache: RwLock<HashMap<String, Arc<Validator>>>,
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("cached", &self.len())
            .finish()
    }
}

/// Outcome of validating one instance
#[derive(Debug)]
pub enum SchemaCheck {
    Valid,
    Invalid(FieldError),
}

impl SchemaCache {
    #[must_use]
    pub fn new(document: &SpecDocument) -> Self {
        let definitions = document.definitions().cloned().unwrap_or_else(|| json!({}));
        info!(
            definitions_count = definitions.as_object().map_or(0, |d| d.len()),
            "Initializing JSON Schema validator cache"
        );
        Self {
            definitions,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of compiled validators held
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a cached validator or compile and cache a new one.
    ///
    /// # Errors
    ///
    /// [`SpecError::InvalidSchema`] when the schema does not compile.
    pub fn get_or_compile(&self, schema: &Value) -> Result<Arc<Validator>, SpecError> {
        let key = schema.to_string();

        // Fast path: read lock only
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(validator) = cache.get(&key) {
                debug!(cache_key_len = key.len(), "Schema validator cache hit");
                return Ok(Arc::clone(validator));
            }
        }

        let wrapped = json!({
            "definitions": self.definitions,
            "allOf": [schema],
        });
        let compiled = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft4)
            .build(&wrapped)
            .map_err(|e| {
                error!(error = %e, schema = %schema, "Failed to compile JSON Schema");
                SpecError::InvalidSchema {
                    message: e.to_string(),
                }
            })?;
        let validator = Arc::new(compiled);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have compiled the same schema while we waited.
        if let Some(existing) = cache.get(&key) {
            return Ok(Arc::clone(existing));
        }
        cache.insert(key, Arc::clone(&validator));
        debug!(cache_size = cache.len(), "Schema validator compiled and cached");
        Ok(validator)
    }

    /// Validate `instance` against `schema`, collecting every violation.
    pub fn check(&self, schema: &Value, instance: &Value) -> Result<SchemaCheck, SpecError> {
        let validator = self.get_or_compile(schema)?;
        let messages: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect();
        if messages.is_empty() {
            Ok(SchemaCheck::Valid)
        } else {
            Ok(SchemaCheck::Invalid(FieldError::SchemaViolation { messages }))
        }
    }
}
