use crate::error::SpecError;
use serde_json::Value;
use std::fmt;

/// HTTP methods an API path may declare, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    /// Lowercase key as used in a path item
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }

    /// Case-insensitive parse; `None` for methods outside the supported set
    #[must_use]
    pub fn parse(method: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(method))
    }

    #[must_use]
    pub fn to_http(self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Options => http::Method::OPTIONS,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Patch => http::Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Where in the request a parameter is read from (`in`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    FormData,
    Body,
}

impl ParameterLocation {
    #[must_use]
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "query" => Some(ParameterLocation::Query),
            "path" => Some(ParameterLocation::Path),
            "header" => Some(ParameterLocation::Header),
            "formData" => Some(ParameterLocation::FormData),
            "body" => Some(ParameterLocation::Body),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Path => "path",
            ParameterLocation::Header => "header",
            ParameterLocation::FormData => "formData",
            ParameterLocation::Body => "body",
        }
    }
}

/// How an array-typed parameter is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionFormat {
    /// comma separated, the default
    Csv,
    /// space separated
    Ssv,
    /// tab separated
    Tsv,
    /// pipe separated
    Pipes,
    /// one query or form field per element
    Multi,
}

impl CollectionFormat {
    /// Parse a `collectionFormat` value; absent means `csv`.
    #[must_use]
    pub fn parse(format: Option<&str>) -> Option<Self> {
        match format.unwrap_or("csv") {
            "csv" => Some(CollectionFormat::Csv),
            "ssv" => Some(CollectionFormat::Ssv),
            "tsv" => Some(CollectionFormat::Tsv),
            "pipes" => Some(CollectionFormat::Pipes),
            "multi" => Some(CollectionFormat::Multi),
            _ => None,
        }
    }

    /// The element separator; `None` for `multi`
    #[must_use]
    pub fn separator(self) -> Option<char> {
        match self {
            CollectionFormat::Csv => Some(','),
            CollectionFormat::Ssv => Some(' '),
            CollectionFormat::Tsv => Some('\t'),
            CollectionFormat::Pipes => Some('|'),
            CollectionFormat::Multi => None,
        }
    }

    /// Resolve the collection format declared on an array declaration.
    pub fn of(declaration: &Value, name: &str) -> Result<Self, SpecError> {
        let raw = declaration.get("collectionFormat").and_then(Value::as_str);
        Self::parse(raw).ok_or_else(|| SpecError::UnsupportedCollectionFormat {
            name: name.to_string(),
            format: raw.unwrap_or_default().to_string(),
        })
    }
}

/// A resolved parameter declaration.
///
/// The raw declaration is retained because casting and validation consult
/// arbitrary keys (`format`, `items`, `schema`, validation keywords).
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    name: String,
    location: ParameterLocation,
    declaration: Value,
}

impl ParameterSpec {
    /// Build from an already `$ref`-resolved declaration.
    ///
    /// Array declarations are checked here so that a broken `items` or
    /// `collectionFormat` fails at startup instead of on the first request.
    pub fn from_declaration(declaration: &Value) -> Result<Self, SpecError> {
        let name = declaration
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SpecError::InvalidParameter(format!("missing `name` in {declaration}")))?
            .to_string();
        let raw_location = declaration
            .get("in")
            .and_then(Value::as_str)
            .ok_or_else(|| SpecError::InvalidParameter(format!("missing `in` for parameter {name}")))?;
        let location =
            ParameterLocation::parse(raw_location).ok_or_else(|| SpecError::UnsupportedLocation {
                name: name.clone(),
                location: raw_location.to_string(),
            })?;
        check_array_declaration(declaration, &name)?;
        Ok(Self {
            name,
            location,
            declaration: declaration.clone(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    /// The full declaration object
    #[must_use]
    pub fn declaration(&self) -> &Value {
        &self.declaration
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.declaration
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.declaration.get("default")
    }

    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.declaration.get("type").and_then(Value::as_str)
    }

    #[must_use]
    pub fn schema(&self) -> Option<&Value> {
        self.declaration.get("schema")
    }

    /// `formData` parameter of type `file`
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.location == ParameterLocation::FormData && self.type_name() == Some("file")
    }

    /// Array parameter serialized as repeated fields
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.type_name() == Some("array")
            && self.declaration.get("collectionFormat").and_then(Value::as_str) == Some("multi")
    }
}

fn check_array_declaration(declaration: &Value, name: &str) -> Result<(), SpecError> {
    if declaration.get("type").and_then(Value::as_str) != Some("array") {
        return Ok(());
    }
    CollectionFormat::of(declaration, name)?;
    let items = declaration.get("items").ok_or_else(|| SpecError::MissingItems {
        name: name.to_string(),
    })?;
    check_array_declaration(items, name)
}
