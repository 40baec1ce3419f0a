//! # Spec Module
//!
//! The spec module owns the parsed Swagger 2.0 document and everything needed to
//! read it: loading from disk, `$ref` resolution and the small vocabulary types
//! (HTTP methods, parameter locations, collection formats) used by the router.
//!
//! ## Overview
//!
//! The document is kept as a generic [`serde_json::Value`] tree rather than a
//! fully typed model. Swagger documents in the wild carry vendor extensions and
//! loosely typed fields, and the router only ever needs a handful of keys from
//! any given node.
//!
//! - [`SpecDocument`] - an immutable copy of the document with the `host` key
//!   removed and a JSON-pointer based [`SpecDocument::resolve`]
//! - [`load_document`] - read YAML (`.yaml` / `.yml`) or JSON by file extension
//! - [`HttpMethod`], [`ParameterLocation`], [`CollectionFormat`],
//!   [`ParameterSpec`] - parsed views of the parts the router interprets
//!
//! ## Reference Resolution
//!
//! Only document-local references are supported (`#/definitions/Pet`,
//! `#/parameters/limit`). Pointer segments are unescaped per RFC 6901
//! (`~1` becomes `/`, `~0` becomes `~`).
//!
//! ```rust
//! use serde_json::json;
//! use specrouter::spec::SpecDocument;
//!
//! let doc = SpecDocument::new(&json!({
//!     "swagger": "2.0",
//!     "host": "api.example.com",
//!     "definitions": { "Pet": { "type": "object" } }
//! }));
//! assert!(doc.api().get("host").is_none());
//! assert_eq!(doc.resolve("#/definitions/Pet").unwrap()["type"], "object");
//! ```

mod document;
mod load;
mod types;

pub use document::SpecDocument;
pub use load::{load_document, parse_document};
pub use types::{CollectionFormat, HttpMethod, ParameterLocation, ParameterSpec};
