use crate::error::SpecError;
use crate::spec::{HttpMethod, ParameterSpec, SpecDocument};
use heck::ToSnakeCase;
use serde_json::Value;

/// One HTTP method on one path, with its effective parameters and media types.
#[derive(Debug, Clone)]
pub struct Operation {
    id: String,
    method: HttpMethod,
    path: String,
    parameters: Vec<ParameterSpec>,
    consumes: Vec<String>,
    produces: Vec<String>,
    declaration: Value,
}

impl Operation {
    pub(crate) fn compile(
        document: &SpecDocument,
        path: &str,
        path_item: &Value,
        method: HttpMethod,
        declaration: &Value,
    ) -> Result<Self, SpecError> {
        let id = declaration
            .get("operationId")
            .and_then(Value::as_str)
            .ok_or_else(|| SpecError::MissingOperationId {
                path: path.to_string(),
                method: method.to_string(),
            })?
            .to_string();

        let mut parameters: Vec<ParameterSpec> = Vec::new();
        for source in [path_item, declaration] {
            let Some(list) = source.get("parameters") else {
                continue;
            };
            let list = document.maybe_resolve(list)?;
            let Some(entries) = list.as_array() else {
                return Err(SpecError::InvalidParameter(format!(
                    "`parameters` of {path} must be a list"
                )));
            };
            for entry in entries {
                let spec = ParameterSpec::from_declaration(document.maybe_resolve(entry)?)?;
                // Redeclaring a name replaces the earlier declaration in place.
                match parameters.iter_mut().find(|p| p.name() == spec.name()) {
                    Some(existing) => *existing = spec,
                    None => parameters.push(spec),
                }
            }
        }

        let context = format!("{method} {path}");
        let consumes = media_types("consumes", &context, declaration, path_item, document)?;
        let produces = media_types("produces", &context, declaration, path_item, document)?;

        Ok(Self {
            id,
            method,
            path: path.to_string(),
            parameters,
            consumes,
            produces,
            declaration: declaration.clone(),
        })
    }

    /// The declared `operationId`
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `operationId` in snake_case, the fallback handler name
    #[must_use]
    pub fn snake_case_id(&self) -> String {
        self.id.to_snake_case()
    }

    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Template of the owning path
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Effective parameters: path-level first, then operation-level, keyed by name
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Effective `consumes`: operation, then path item, then document
    #[must_use]
    pub fn consumes(&self) -> &[String] {
        &self.consumes
    }

    /// Effective `produces`: operation, then path item, then document
    #[must_use]
    pub fn produces(&self) -> &[String] {
        &self.produces
    }

    /// The raw operation object
    #[must_use]
    pub fn declaration(&self) -> &Value {
        &self.declaration
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.declaration.get("summary").and_then(Value::as_str)
    }
}

/// First of operation / path item / document that declares `key`; empty if none do.
fn media_types(
    key: &'static str,
    context: &str,
    declaration: &Value,
    path_item: &Value,
    document: &SpecDocument,
) -> Result<Vec<String>, SpecError> {
    let found = declaration
        .get(key)
        .or_else(|| path_item.get(key))
        .or_else(|| document.api().get(key));
    let Some(value) = found else {
        return Ok(Vec::new());
    };
    let not_a_sequence = || SpecError::NotASequence {
        key,
        context: context.to_string(),
        value: value.clone(),
    };
    value
        .as_array()
        .ok_or_else(not_a_sequence)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(not_a_sequence))
        .collect()
}
