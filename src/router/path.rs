use super::operation::Operation;
use super::PathParams;
use crate::error::{InvalidOperation, SpecError};
use crate::spec::{HttpMethod, SpecDocument};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// `{name}` placeholders in a path template
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\{(.+?)\}").unwrap()
});

/// Runs of characters that are not allowed in a route name
static NON_NAME: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)[^a-z0-9]+").unwrap()
});

/// Convert a path template into a URL pattern and its ordered parameter names.
///
/// Transforms `/pets/{petId}/photos` into `pets/([^/]+?)/photos$` and
/// `["petId"]`. Literal text is regex-escaped, the leading `/` is dropped
/// and the pattern is anchored at the end. Each capture group corresponds
/// positionally to one entry of the returned name list, which lets
/// placeholder names contain characters that are not valid regex group names.
///
/// # Example
///
/// ```
/// let (pattern, names) = specrouter::router::compile_template("/pets/{petId}");
/// assert_eq!(pattern, "pets/([^/]+?)$");
/// assert_eq!(names, vec!["petId".to_string()]);
/// ```
#[must_use]
pub fn compile_template(template: &str) -> (String, Vec<String>) {
    let mut pattern = String::with_capacity(template.len() + 16);
    let mut param_names = Vec::with_capacity(template.matches('{').count());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        pattern.push_str(&regex::escape(&template[last..whole.start()]));
        pattern.push_str("([^/]+?)");
        param_names.push(name.as_str().to_string());
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    let mut pattern = pattern.trim_start_matches('/').to_string();
    pattern.push('$');
    (pattern, param_names)
}

/// Derive a URL route name from a path template.
///
/// Placeholders are replaced by their names, runs of non-alphanumerics become
/// a single `-`, and the result is trimmed of `-` and lowercased:
/// `/pets/{petId}/photos` becomes `pets-petid-photos`.
#[must_use]
pub fn route_name(template: &str) -> String {
    let named = PLACEHOLDER.replace_all(template, "$1");
    NON_NAME
        .replace_all(&named, "-")
        .trim_matches('-')
        .to_lowercase()
}

/// A declared API path with its compiled matcher and operations.
#[derive(Debug, Clone)]
pub struct Path {
    template: String,
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
    name: String,
    mapping: Value,
    operations: Vec<Operation>,
}

impl Path {
    /// Compile a path item. `item` must already be `$ref`-resolved.
    pub(crate) fn compile(
        document: &SpecDocument,
        template: &str,
        item: &Value,
    ) -> Result<Self, SpecError> {
        let (pattern, param_names) = compile_template(template);
        let regex = Regex::new(&format!("^{pattern}")).map_err(|source| {
            SpecError::InvalidPathTemplate {
                template: template.to_string(),
                source,
            }
        })?;

        let mut operations = Vec::new();
        if let Value::Object(map) = item {
            for (key, declaration) in map {
                let Some(method) = HttpMethod::ALL.into_iter().find(|m| m.as_str() == key) else {
                    continue;
                };
                operations.push(Operation::compile(
                    document,
                    template,
                    item,
                    method,
                    declaration,
                )?);
            }
        }

        Ok(Self {
            template: template.to_string(),
            pattern,
            regex,
            param_names,
            name: route_name(template),
            mapping: item.clone(),
            operations,
        })
    }

    /// The template as declared, e.g. `/pets/{petId}`
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The URL pattern, e.g. `pets/([^/]+?)$`
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The derived route name, e.g. `pets-petid`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved path item
    #[must_use]
    pub fn mapping(&self) -> &Value {
        &self.mapping
    }

    /// Look up the operation for a method name (case-insensitive).
    pub fn get_operation(&self, method: &str) -> Result<&Operation, InvalidOperation> {
        HttpMethod::parse(method)
            .and_then(|m| self.operations.iter().find(|op| op.method() == m))
            .ok_or_else(|| InvalidOperation {
                path: self.template.clone(),
                method: method.to_ascii_uppercase(),
            })
    }

    /// Operations in declaration order
    #[must_use]
    pub fn get_operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Declared methods, suitable for an `Allow` header
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<HttpMethod> {
        self.operations.iter().map(Operation::method).collect()
    }

    /// Match a request path with its leading `/` removed.
    ///
    /// The pattern is anchored at both ends; a path with a trailing slash
    /// does not match a template without one.
    #[must_use]
    pub fn captures(&self, candidate: &str) -> Option<PathParams> {
        let caps = self.regex.captures(candidate)?;
        let mut params = PathParams::with_capacity(self.param_names.len());
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.insert(name.clone(), value.as_str().to_string());
            }
        }
        Some(params)
    }
}
