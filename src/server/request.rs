use http::Method;
use std::collections::HashMap;
use tracing::debug;

/// Header lookup key: `X-Api-Key` becomes `HTTP_X_API_KEY`.
///
/// Applied both when a request header is stored and when a header parameter
/// is looked up, so the two always agree regardless of case or dashes.
#[must_use]
pub fn header_meta_key(name: &str) -> String {
    format!("HTTP_{}", name.to_ascii_uppercase().replace('-', "_"))
}

/// Multi-valued string map for query strings and url-encoded forms.
///
/// Keeps every value of a repeated key in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    values: HashMap<String, Vec<String>>,
}

impl QueryMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` string (no leading `?`).
    #[must_use]
    pub fn parse(encoded: &str) -> Self {
        let mut map = Self::new();
        for (k, v) in url::form_urlencoded::parse(encoded.as_bytes()) {
            map.append(k.into_owned(), v.into_owned());
        }
        map
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// The last value for `key`, matching how a repeated scalar field reads
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.last())
            .map(String::as_str)
    }

    /// Every value for `key`; empty when absent
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An uploaded file supplied by the host's multipart parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }
}

/// Parsed `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Lowercased `type/subtype` without parameters
    pub essence: String,
    /// Lowercased `charset` parameter, if any
    pub charset: Option<String>,
}

impl ContentType {
    #[must_use]
    pub fn parse(header: &str) -> Self {
        match header.parse::<mime::Mime>() {
            Ok(mime) => Self {
                essence: mime.essence_str().to_ascii_lowercase(),
                charset: mime
                    .get_param(mime::CHARSET)
                    .map(|c| c.as_str().to_ascii_lowercase()),
            },
            Err(_) => Self {
                essence: header
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase(),
                charset: None,
            },
        }
    }

    /// `application/json` or any `+json` structured syntax suffix
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.essence == "application/json" || self.essence.ends_with("+json")
    }
}

/// Framework-neutral view of an incoming HTTP request.
///
/// Hosts either build one with [`ApiRequest::from_http`] or with the builder
/// methods. Multipart decoding is left to the host, which supplies form fields
/// through [`ApiRequest::with_form_field`] and files through
/// [`ApiRequest::with_file`].
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    pub method: Method,
    /// Path without query string, e.g. `/pets/42`
    pub path: String,
    pub query: QueryMap,
    /// Form fields (url-encoded or multipart)
    pub form: QueryMap,
    pub files: HashMap<String, UploadedFile>,
    /// Headers keyed by [`header_meta_key`]
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), QueryMap::parse(q)),
            None => (path, QueryMap::new()),
        };
        Self {
            method,
            path,
            query,
            ..Self::default()
        }
    }

    /// Convert an `http` crate request, decoding url-encoded form bodies.
    #[must_use]
    pub fn from_http(request: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = request.into_parts();
        let mut api_request = Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(QueryMap::parse).unwrap_or_default(),
            ..Self::default()
        };
        for (name, value) in &parts.headers {
            match value.to_str() {
                Ok(v) => {
                    api_request
                        .headers
                        .insert(header_meta_key(name.as_str()), v.to_string());
                }
                Err(_) => debug!(header = %name, "Skipping non-ASCII header value"),
            }
        }
        if api_request
            .content_type()
            .is_some_and(|ct| ct.essence == "application/x-www-form-urlencoded")
        {
            api_request.form = QueryMap::parse(&String::from_utf8_lossy(&body));
        }
        api_request.body = body;
        api_request
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(key, value);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(header_meta_key(name), value.into());
        self
    }

    #[must_use]
    pub fn with_form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.append(key, value);
        self
    }

    #[must_use]
    pub fn with_file(mut self, field: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(field.into(), file);
        self
    }

    /// Set the body together with its `Content-Type` header
    #[must_use]
    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.with_header("Content-Type", content_type)
    }

    /// Header value by HTTP name, case-insensitive
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&header_meta_key(name)).map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.header("Content-Type").map(ContentType::parse)
    }
}
