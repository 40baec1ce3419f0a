//! Integration tests for the parameter pipeline
//!
//! # Test Coverage
//!
//! - Casting by declared type (integer, boolean, csv and multi arrays)
//! - Sources: path, query, header, form fields and uploaded files
//! - Defaults applied without casting
//! - Every failing field reported at once, with the good ones still decoded

#![allow(clippy::unwrap_used, clippy::expect_used)]

use http::Method;
use serde_json::{json, Value};
use specrouter::error::FieldError;
use specrouter::parameters::{read_parameters, ParamValue, Parameters, ReadParametersError};
use specrouter::server::{ApiRequest, UploadedFile};
use specrouter::Router;

const SEARCH_SPEC: &str = r#"
swagger: "2.0"
paths:
  /shelves/{shelfId}/books:
    get:
      operationId: searchBooks
      parameters:
        - {name: shelfId, in: path, required: true, type: integer}
        - {name: available, in: query, type: boolean}
        - {name: ids, in: query, type: array, items: {type: integer}}
        - {name: author, in: query, type: array, collectionFormat: multi, items: {type: string}}
        - {name: page, in: query, type: integer, default: "1"}
        - {name: X-Trace, in: header, type: string}
    post:
      operationId: addBook
      consumes: [multipart/form-data]
      parameters:
        - {name: shelfId, in: path, required: true, type: integer}
        - {name: title, in: formData, required: true, type: string}
        - {name: pages, in: formData, required: true, type: integer}
        - {name: cover, in: formData, type: file}
        - {name: published, in: formData, required: true, type: string, format: date}
"#;

fn router() -> Router {
    let api: Value = serde_yaml::from_str(SEARCH_SPEC).unwrap();
    Router::new(&api).unwrap()
}

fn read(router: &Router, request: &ApiRequest) -> Result<Parameters, ReadParametersError> {
    let (path, path_params) = router.match_path(&request.path).unwrap();
    let operation = path.get_operation(request.method.as_str()).unwrap();
    read_parameters(router, operation, request, &path_params)
}

#[test]
fn test_query_path_and_header_values_are_cast() {
    let router = router();
    let request = ApiRequest::new(
        Method::GET,
        "/shelves/42/books?available=YES&ids=1,2,3&author=Le+Guin&author=Pratchett",
    )
    .with_header("X-Trace", "abc");

    let params = read(&router, &request).unwrap();
    assert_eq!(params.get_i64("shelf_id"), Some(42));
    assert_eq!(params.get_bool("available"), Some(true));
    assert_eq!(
        params.get("ids"),
        Some(&ParamValue::Array(vec![
            ParamValue::Integer(1),
            ParamValue::Integer(2),
            ParamValue::Integer(3),
        ]))
    );
    assert_eq!(params.get("author").unwrap().to_json(), json!(["Le Guin", "Pratchett"]));
    assert_eq!(params.get_str("x_trace"), Some("abc"));
}

#[test]
fn test_absent_optional_values() {
    let router = router();
    let params = read(&router, &ApiRequest::new(Method::GET, "/shelves/1/books")).unwrap();

    // The declared default is taken as-is, not cast to the parameter type
    assert_eq!(params.get("page"), Some(&ParamValue::Text("1".to_string())));
    assert!(!params.contains("author"));
    assert!(!params.contains("available"));
    assert_eq!(params.len(), 2);
}

#[test]
fn test_one_bad_field_keeps_the_others() {
    let router = router();
    let request = ApiRequest::new(Method::GET, "/shelves/abc/books?available=true");

    let Err(ReadParametersError::Erroneous(err)) = read(&router, &request) else {
        panic!("expected erroneous parameters");
    };
    assert_eq!(err.errors.len(), 1);
    assert!(matches!(
        err.errors.get("shelfId"),
        Some(FieldError::InvalidInteger { .. })
    ));
    assert_eq!(err.parameters.get_bool("available"), Some(true));
}

#[test]
fn test_form_errors_are_aggregated() {
    let router = router();
    let request = ApiRequest::new(Method::POST, "/shelves/1/books").with_form_field("pages", "many");

    let Err(ReadParametersError::Erroneous(err)) = read(&router, &request) else {
        panic!("expected erroneous parameters");
    };
    let names: Vec<&str> = err.errors.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["pages", "published", "title"]);

    let body = err.to_json();
    assert_eq!(body["errors"]["title"]["kind"], json!("missing"));
    assert_eq!(body["errors"]["pages"]["kind"], json!("invalid_integer"));
    assert_eq!(body["errors"]["published"]["kind"], json!("missing"));
    assert_eq!(err.parameters.get_i64("shelf_id"), Some(1));
}

#[test]
fn test_form_fields_and_files() {
    let router = router();
    let request = ApiRequest::new(Method::POST, "/shelves/1/books")
        .with_form_field("title", "Mort")
        .with_form_field("pages", "243")
        .with_form_field("published", "1987-11-12")
        .with_file("cover", UploadedFile::new("mort.png", vec![0x89, 0x50]));

    let params = read(&router, &request).unwrap();
    assert_eq!(params.get_str("title"), Some("Mort"));
    assert_eq!(params.get_i64("pages"), Some(243));
    assert_eq!(params.get("published").unwrap().to_json(), json!("1987-11-12"));
    let cover = params.get("cover").unwrap().as_file().unwrap();
    assert_eq!(cover.filename, "mort.png");
    assert_eq!(cover.data, vec![0x89, 0x50]);
}
