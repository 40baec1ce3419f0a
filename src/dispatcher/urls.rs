use super::core::Dispatcher;
use crate::error::SpecError;
use crate::router::PathParams;
use crate::server::{ApiRequest, ApiResponse};
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A request handler installed in a URL table.
pub type View = Arc<dyn Fn(&ApiRequest, &PathParams) -> ApiResponse + Send + Sync>;

/// Wraps a view in another view, e.g. to add headers or checks.
pub type ViewDecorator = Arc<dyn Fn(View) -> View + Send + Sync>;

/// Knobs for [`Dispatcher::get_urls`].
#[derive(Clone)]
pub struct UrlOptions {
    /// Also emit a `^$` pattern answering `API root`, under this name
    pub root_view_name: Option<String>,
    /// Accept paths with or without a trailing `/`
    pub optional_trailing_slash: bool,
    /// Applied to every generated view, first decorator innermost
    pub decorators: Vec<ViewDecorator>,
    /// Route name template; `{name}` is replaced by the path's name
    pub name_template: String,
}

impl Default for UrlOptions {
    fn default() -> Self {
        Self {
            root_view_name: None,
            optional_trailing_slash: false,
            decorators: Vec::new(),
            name_template: "{name}".to_string(),
        }
    }
}

impl UrlOptions {
    #[must_use]
    pub fn with_root_view(mut self, name: impl Into<String>) -> Self {
        self.root_view_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_optional_trailing_slash(mut self, enabled: bool) -> Self {
        self.optional_trailing_slash = enabled;
        self
    }

    #[must_use]
    pub fn with_name_template(mut self, template: impl Into<String>) -> Self {
        self.name_template = template.into();
        self
    }

    /// Append a decorator.
    #[must_use]
    pub fn decorate<F>(mut self, decorator: F) -> Self
    where
        F: Fn(View) -> View + Send + Sync + 'static,
    {
        self.decorators.push(Arc::new(decorator));
        self
    }

    /// Run `view` through every decorator in order
    #[must_use]
    pub fn apply_decorators(&self, view: View) -> View {
        self.decorators
            .iter()
            .fold(view, |view, decorator| decorator(view))
    }

    /// Render a route name through the name template
    #[must_use]
    pub fn route_name(&self, name: &str) -> String {
        self.name_template.replace("{name}", name)
    }

    /// Relax the end anchor of a pattern so one trailing `/` is optional.
    ///
    /// `pets/([^/]+?)$` becomes `pets/([^/]+?)/?$`.
    #[must_use]
    pub fn adjust_pattern(&self, pattern: &str) -> String {
        if !self.optional_trailing_slash {
            return pattern.to_string();
        }
        let mut relaxed = pattern.trim_end_matches('$').to_string();
        if !relaxed.ends_with('/') {
            relaxed.push('/');
        }
        relaxed.push_str("?$");
        relaxed
    }
}

impl fmt::Debug for UrlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlOptions")
            .field("root_view_name", &self.root_view_name)
            .field("optional_trailing_slash", &self.optional_trailing_slash)
            .field("decorators", &self.decorators.len())
            .field("name_template", &self.name_template)
            .finish()
    }
}

/// One `(pattern, view, name)` entry of a URL table.
#[derive(Clone)]
pub struct UrlPattern {
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
    view: View,
    name: String,
}

impl UrlPattern {
    /// Compile a pattern. It is matched against the request path without its
    /// leading `/` and is anchored at the start if it is not already.
    pub fn new(
        pattern: impl Into<String>,
        param_names: Vec<String>,
        view: View,
        name: impl Into<String>,
    ) -> Result<Self, SpecError> {
        let pattern = pattern.into();
        let anchored = if pattern.starts_with('^') {
            pattern.clone()
        } else {
            format!("^{pattern}")
        };
        let regex = Regex::new(&anchored).map_err(|source| SpecError::InvalidPathTemplate {
            template: pattern.clone(),
            source,
        })?;
        Ok(Self {
            pattern,
            regex,
            param_names,
            view,
            name: name.into(),
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Captures of `candidate` (leading `/` already removed), by parameter name
    #[must_use]
    pub fn matches(&self, candidate: &str) -> Option<PathParams> {
        let caps = self.regex.captures(candidate)?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Invoke the view
    #[must_use]
    pub fn call(&self, request: &ApiRequest, path_params: &PathParams) -> ApiResponse {
        (self.view)(request, path_params)
    }
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlPattern")
            .field("pattern", &self.pattern)
            .field("param_names", &self.param_names)
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered URL patterns for hosts without a URL table of their own.
#[derive(Debug, Clone, Default)]
pub struct UrlTable {
    patterns: Vec<UrlPattern>,
}

impl UrlTable {
    #[must_use]
    pub fn new(patterns: Vec<UrlPattern>) -> Self {
        Self { patterns }
    }

    pub fn extend(&mut self, patterns: impl IntoIterator<Item = UrlPattern>) {
        self.patterns.extend(patterns);
    }

    #[must_use]
    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }

    /// Look up a pattern by route name
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&UrlPattern> {
        self.patterns.iter().find(|p| p.name() == name)
    }

    /// First pattern matching `path`, in table order
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<(&UrlPattern, PathParams)> {
        let candidate = path.trim_start_matches('/');
        self.patterns
            .iter()
            .find_map(|p| p.matches(candidate).map(|params| (p, params)))
    }

    /// Route a request through the table; unmatched paths answer `404`.
    #[must_use]
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        match self.resolve(&request.path) {
            Some((pattern, params)) => {
                debug!(
                    path = %request.path,
                    route_name = %pattern.name(),
                    "URL pattern matched"
                );
                pattern.call(request, &params)
            }
            None => {
                debug!(path = %request.path, "No URL pattern matched");
                ApiResponse::error(404, "Not found")
            }
        }
    }
}

/// Answers `API root` as plain text.
#[must_use]
pub fn root_view() -> View {
    Arc::new(|_request: &ApiRequest, _params: &PathParams| ApiResponse::text(200, "API root"))
}

impl Dispatcher {
    /// Build one URL pattern per declared path, ready for a host URL table.
    ///
    /// Patterns are emitted in declaration order; the root view, when
    /// requested, comes last.
    pub fn get_urls(self: &Arc<Self>, options: &UrlOptions) -> Result<Vec<UrlPattern>, SpecError> {
        let mut urls = Vec::with_capacity(self.router().get_paths().len() + 1);
        for path in self.router().get_paths() {
            let dispatcher = Arc::clone(self);
            let template = path.template().to_string();
            let view: View = Arc::new(move |request: &ApiRequest, params: &PathParams| {
                dispatcher.respond_path(&template, request, params)
            });
            urls.push(UrlPattern::new(
                options.adjust_pattern(path.pattern()),
                path.param_names().to_vec(),
                options.apply_decorators(view),
                options.route_name(path.name()),
            )?);
        }
        if let Some(root_name) = &options.root_view_name {
            urls.push(UrlPattern::new(
                "^$",
                Vec::new(),
                root_view(),
                options.route_name(root_name),
            )?);
        }
        info!(
            routes_count = urls.len(),
            optional_trailing_slash = options.optional_trailing_slash,
            decorators_count = options.decorators.len(),
            "URL patterns generated"
        );
        Ok(urls)
    }
}
