use super::operation::Operation;
use super::path::Path;
use super::PathParams;
use crate::error::SpecError;
use crate::schema::SchemaCache;
use crate::spec::{load_document, SpecDocument};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Compiled routing table for one Swagger 2.0 document.
///
/// Construction deep-copies the document, drops `host`, resolves every
/// path-item and parameter reference and compiles each path template into
/// an anchored matcher. The result is immutable and cheap to share behind
/// an `Arc`.
#[derive(Debug)]
pub struct Router {
    document: SpecDocument,
    schemas: SchemaCache,
    /// Declaration order is the match order
    paths: Vec<Path>,
    index: HashMap<String, usize>,
}

impl Router {
    /// Build a router from a parsed document.
    ///
    /// # Errors
    ///
    /// Any unresolvable reference, operation without `operationId`,
    /// non-list `consumes`/`produces` or malformed parameter declaration.
    pub fn new(api: &Value) -> Result<Self, SpecError> {
        let document = SpecDocument::new(api);
        let mut paths = Vec::new();
        let mut index = HashMap::new();

        if let Some(Value::Object(declared)) = document.api().get("paths") {
            for (template, item) in declared {
                let item = document.maybe_resolve(item)?;
                let path = Path::compile(&document, template, item)?;
                index.insert(template.clone(), paths.len());
                paths.push(path);
            }
        }

        let operations_count: usize = paths.iter().map(|p| p.get_operations().len()).sum();
        let routes_summary: Vec<String> = paths
            .iter()
            .take(10)
            .map(|p| p.template().to_string())
            .collect();
        if paths.is_empty() {
            warn!(paths_count = 0, "Routing table loaded with no paths");
        } else {
            info!(
                paths_count = paths.len(),
                operations_count,
                routes_summary = ?routes_summary,
                "Routing table loaded"
            );
        }

        Ok(Self {
            schemas: SchemaCache::new(&document),
            document,
            paths,
            index,
        })
    }

    /// Load a YAML or JSON document from disk and build a router from it.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, SpecError> {
        let api = load_document(path)?;
        Self::new(&api)
    }

    /// The stored document (without `host`)
    #[must_use]
    pub fn api(&self) -> &Value {
        self.document.api()
    }

    #[must_use]
    pub fn document(&self) -> &SpecDocument {
        &self.document
    }

    /// Compiled body and keyword validators
    #[must_use]
    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// Resolve a document-local `$ref` such as `#/definitions/Pet`
    pub fn resolve_reference(&self, reference: &str) -> Result<&Value, SpecError> {
        self.document.resolve(reference)
    }

    /// Look up a declared path by its template.
    pub fn get_path(&self, template: &str) -> Result<&Path, SpecError> {
        self.index
            .get(template)
            .and_then(|&i| self.paths.get(i))
            .ok_or_else(|| SpecError::UnknownPath(template.to_string()))
    }

    /// All paths in declaration order
    #[must_use]
    pub fn get_paths(&self) -> &[Path] {
        &self.paths
    }

    /// Every operation of every path
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.iter().flat_map(|p| p.get_operations().iter())
    }

    /// Match a request path against the declared templates.
    ///
    /// The leading `/` is ignored. The first template in declaration order
    /// whose pattern matches wins.
    #[must_use]
    pub fn match_path(&self, request_path: &str) -> Option<(&Path, PathParams)> {
        let candidate = request_path.trim_start_matches('/');
        let started = Instant::now();
        let found = self
            .paths
            .iter()
            .find_map(|p| p.captures(candidate).map(|params| (p, params)));

        match &found {
            Some((path, params)) => debug!(
                path = %request_path,
                route_pattern = %path.template(),
                path_params = ?params,
                duration_us = started.elapsed().as_micros(),
                "Route matched"
            ),
            None => debug!(
                path = %request_path,
                duration_us = started.elapsed().as_micros(),
                "No route matched"
            ),
        }
        found
    }
}
