//! Error types shared across the router.
//!
//! Errors fall into three families:
//!
//! - [`SpecError`] - the API document itself is broken or uses something the
//!   router does not implement. These are configuration mistakes, not client
//!   mistakes, and surface as 500 responses at request time.
//! - [`FieldError`] / [`ErroneousParameters`] - one or more request parameters
//!   failed to decode or validate. Surfaced as 400 responses.
//! - [`InvalidOperation`], [`MissingHandler`], [`RouterValidationError`] -
//!   routing and registration problems.

use crate::parameters::Parameters;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The API document is malformed or uses an unsupported feature.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A `$ref` pointer does not resolve inside the document
    #[error("Unresolvable JSON pointer: {reference:?}")]
    ReferenceResolution { reference: String },

    /// An operation has no `operationId`
    #[error("operation {method} {path} has no operationId")]
    MissingOperationId { path: String, method: String },

    /// `consumes` or `produces` is present but not a list of media types
    #[error("`{key}` of {context} must be a list of media types, got {value}")]
    NotASequence {
        key: &'static str,
        context: String,
        value: Value,
    },

    /// A path template is not declared in the document
    #[error("path {0} is not declared")]
    UnknownPath(String),

    /// A parameter declaration is missing `name` or `in`
    #[error("malformed parameter declaration: {0}")]
    InvalidParameter(String),

    /// A parameter declares an `in` location the router does not handle
    #[error("parameter {name} uses unsupported location {location:?}")]
    UnsupportedLocation { name: String, location: String },

    /// An array parameter declares an unknown `collectionFormat`
    #[error("parameter {name} uses unsupported collectionFormat {format:?}")]
    UnsupportedCollectionFormat { name: String, format: String },

    /// An array parameter (or nested items) declares no `items`
    #[error("array parameter {name} declares no items")]
    MissingItems { name: String },

    /// A body arrived in a declared media type the router cannot decode
    #[error("no decoder for content type {content_type}")]
    UnsupportedContentType { content_type: String },

    /// A schema could not be compiled
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    /// A path template produced an invalid matcher
    #[error("cannot compile path template {template}: {source}")]
    InvalidPathTemplate {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// Reading the document from disk failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A built-in page or source template failed to render
    #[error("failed to render template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to parse YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single request parameter failed to decode or validate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("parameter {name} is required")]
    Missing { name: String },

    #[error("{value:?} is not a valid integer: {message}")]
    InvalidInteger { value: String, message: String },

    #[error("{value:?} is not a valid number: {message}")]
    InvalidNumber { value: String, message: String },

    #[error("invalid base64 data: {message}")]
    InvalidBase64 { message: String },

    #[error("path segment {value:?} is not valid UTF-8 once decoded: {message}")]
    InvalidPathSegment { value: String, message: String },

    #[error("{value:?} is not a valid date")]
    InvalidDate { value: String },

    #[error("{value:?} is not a valid date-time")]
    InvalidDateTime { value: String },

    /// The decoded value violates its schema or validation keywords
    #[error("{}", .messages.join("; "))]
    SchemaViolation { messages: Vec<String> },

    /// Polymorphic body whose discriminator is missing or names no definition
    #[error("discriminator {property:?}: {message}")]
    Discriminator { property: String, message: String },

    /// The body content type is not listed in `consumes`
    #[error("{}", body_format_message(.content_type, .consumes))]
    InvalidBodyFormat {
        content_type: String,
        consumes: Vec<String>,
    },

    /// The body could not be decoded in its declared content type
    #[error("Unable to parse this body as {content_type}: {message}")]
    InvalidBodyContent {
        content_type: String,
        message: String,
    },
}

impl FieldError {
    /// Short machine-readable tag used in 400 response bodies
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FieldError::Missing { .. } => "missing",
            FieldError::InvalidInteger { .. } => "invalid_integer",
            FieldError::InvalidNumber { .. } => "invalid_number",
            FieldError::InvalidBase64 { .. } => "invalid_base64",
            FieldError::InvalidPathSegment { .. } => "invalid_path_segment",
            FieldError::InvalidDate { .. } => "invalid_date",
            FieldError::InvalidDateTime { .. } => "invalid_date_time",
            FieldError::SchemaViolation { .. } => "schema_violation",
            FieldError::Discriminator { .. } => "discriminator",
            FieldError::InvalidBodyFormat { .. } => "invalid_body_format",
            FieldError::InvalidBodyContent { .. } => "invalid_body_content",
        }
    }
}

fn body_format_message(content_type: &str, consumes: &[String]) -> String {
    let content_type = if content_type.is_empty() {
        "(none)"
    } else {
        content_type
    };
    if consumes.is_empty() {
        format!("Content-type {content_type} is not supported (no content types are accepted)")
    } else {
        format!(
            "Content-type {content_type} is not supported ({} are)",
            consumes.join(", ")
        )
    }
}

/// Every parameter that failed, keyed by declared name, plus the ones that
/// decoded successfully.
#[derive(Debug, Clone)]
pub struct ErroneousParameters {
    pub errors: BTreeMap<String, FieldError>,
    pub parameters: Parameters,
}

impl fmt::Display for ErroneousParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.errors.keys().map(String::as_str).collect();
        write!(
            f,
            "{} parameter(s) failed validation: {}",
            self.errors.len(),
            names.join(", ")
        )
    }
}

impl std::error::Error for ErroneousParameters {}

impl ErroneousParameters {
    /// JSON payload for a 400 response
    #[must_use]
    pub fn to_json(&self) -> Value {
        let errors: serde_json::Map<String, Value> = self
            .errors
            .iter()
            .map(|(name, err)| {
                (
                    name.clone(),
                    json!({ "kind": err.kind(), "message": err.to_string() }),
                )
            })
            .collect();
        json!({ "error": "Invalid parameters", "errors": errors })
    }
}

/// A path was matched but does not declare the requested method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Path {path} does not support method {method}")]
pub struct InvalidOperation {
    pub path: String,
    pub method: String,
}

/// No handler is registered under an operation id or its snake_case form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing handler for operation {operation_id} (tried {snake_case} too)")]
pub struct MissingHandler {
    pub operation_id: String,
    pub snake_case: String,
}

/// One or more operations of the document have no handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterValidationError {
    /// Keyed by operation id, sorted
    pub errors: BTreeMap<String, MissingHandler>,
}

impl RouterValidationError {
    /// One `operation_id: message` line per failing operation, sorted by id
    #[must_use]
    pub fn description(&self) -> String {
        self.errors
            .iter()
            .map(|(id, err)| format!("{id}: {err}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for RouterValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Router validation failed:\n{}", self.description())
    }
}

impl std::error::Error for RouterValidationError {}

/// Failure modes of a dispatch that are not client errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    MissingHandler(#[from] MissingHandler),

    /// The handler itself returned an error
    #[error("handler for operation {operation_id} failed: {error:#}")]
    Handler {
        operation_id: String,
        error: anyhow::Error,
    },
}
