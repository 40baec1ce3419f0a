//! Read-only documentation views: the loaded document as JSON and a
//! Swagger UI page pointing at it.

use crate::dispatcher::{UrlPattern, View};
use crate::error::SpecError;
use crate::router::{PathParams, Router};
use crate::server::{ApiRequest, ApiResponse};
use minijinja::{context, Environment};
use std::sync::Arc;
use tracing::error;

/// Default docs page pattern; the trailing slash is optional
pub const DEFAULT_DOCS_URL: &str = "docs/?";

const SWAGGER_UI_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ title }}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui" data-url="{{ json_url }}"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = function () {
      var node = document.getElementById("swagger-ui");
      window.ui = SwaggerUIBundle({ url: node.dataset.url, dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

/// The loaded document (without `host`) as a JSON response.
#[must_use]
pub fn swagger_json(router: &Router) -> ApiResponse {
    ApiResponse::json(200, router.api())
}

/// Render the Swagger UI page for the document served at `json_url`.
pub fn render_docs(router: &Router, json_url: &str) -> Result<ApiResponse, SpecError> {
    let mut env = Environment::new();
    env.add_template("swagger-ui.html", SWAGGER_UI_TEMPLATE)?;
    let tmpl = env.get_template("swagger-ui.html")?;
    let rendered = tmpl.render(context! {
        title => router.document().title().unwrap_or("API documentation"),
        json_url => json_url,
    })?;
    Ok(ApiResponse::html(200, rendered))
}

/// URL patterns for the JSON document (`swagger.json`) and the docs page.
///
/// `docs_url` is a pattern like [`DEFAULT_DOCS_URL`]; `json_url` is the URL
/// under which the host serves the first pattern, as the browser sees it.
pub fn docs_urls(
    router: Arc<Router>,
    docs_url: &str,
    json_url: &str,
) -> Result<Vec<UrlPattern>, SpecError> {
    let json_router = Arc::clone(&router);
    let json_view: View = Arc::new(move |_request: &ApiRequest, _params: &PathParams| {
        swagger_json(&json_router)
    });

    let json_url = json_url.to_string();
    let docs_view: View = Arc::new(move |request: &ApiRequest, _params: &PathParams| {
        render_docs(&router, &json_url).unwrap_or_else(|err| {
            error!(path = %request.path, error = %err, "Failed to render docs page");
            ApiResponse::error(500, "Internal server error")
        })
    });

    Ok(vec![
        UrlPattern::new(r"swagger\.json$", Vec::new(), json_view, "swagger_json")?,
        UrlPattern::new(format!("{docs_url}$"), Vec::new(), docs_view, "docs")?,
    ])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::dispatcher::UrlTable;
    use http::Method;
    use serde_json::{json, Value};

    fn router() -> Arc<Router> {
        let api: Value = serde_yaml::from_str(
            r#"
swagger: "2.0"
host: api.example.com
info:
  title: Pets & Owners
paths: {}
"#,
        )
        .unwrap();
        Arc::new(Router::new(&api).unwrap())
    }

    #[test]
    fn test_swagger_json_omits_host() {
        let response = swagger_json(&router());
        assert_eq!(response.get_header("content-type"), Some("application/json"));
        let body = response.body_json().unwrap();
        assert_eq!(body["info"]["title"], json!("Pets & Owners"));
        assert!(body.get("host").is_none());
    }

    #[test]
    fn test_docs_page_escapes_title() {
        let response = render_docs(&router(), "/swagger.json").unwrap();
        let html = String::from_utf8(response.body).unwrap();
        assert!(html.contains("<title>Pets &amp; Owners</title>"));
        // The URL lands in an attribute, HTML-escaped
        assert!(html.contains("data-url="));
        assert!(html.contains("swagger.json\""));
    }

    #[test]
    fn test_docs_urls_match_with_and_without_slash() {
        let table = UrlTable::new(docs_urls(router(), DEFAULT_DOCS_URL, "/swagger.json").unwrap());
        for path in ["/docs", "/docs/"] {
            let response = table.handle(&ApiRequest::new(Method::GET, path));
            assert_eq!(response.status, 200, "{path}");
            assert_eq!(response.get_header("content-type"), Some("text/html; charset=utf-8"));
        }
        let response = table.handle(&ApiRequest::new(Method::GET, "/swagger.json"));
        assert_eq!(response.get_header("content-type"), Some("application/json"));
        assert_eq!(table.handle(&ApiRequest::new(Method::GET, "/swaggerXjson")).status, 404);
    }
}
