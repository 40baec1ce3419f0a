//! Integration tests for request dispatch
//!
//! # Test Coverage
//!
//! - Unmatched paths (`None` from `dispatch`, `404` from `respond`)
//! - `405` with an `Allow` header for undeclared methods
//! - `400` bodies listing every failed parameter
//! - Handler lookup by exact and snake_case operation id
//! - Reply transformation: values, full responses and exceptional responses
//! - Handler errors, panics and missing handlers as `500`
//! - Request id propagation from `X-Request-Id`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use http::Method;
use serde_json::{json, Value};
use specrouter::error::DispatchError;
use specrouter::handlers::{handler, HandlerRegistry, HandlerRegistryBuilder, Reply};
use specrouter::server::{ApiRequest, ApiResponse};
use specrouter::{Dispatcher, Router};
use std::sync::{Arc, Mutex};

const PETSTORE: &str = r##"
swagger: "2.0"
info:
  title: Petstore
consumes: [application/json]
definitions:
  Pet:
    type: object
    required: [name]
    properties:
      name: {type: string}
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - {name: limit, in: query, type: integer, maximum: 100}
        - {name: tags, in: query, type: array, items: {type: string}}
    post:
      operationId: createPet
      parameters:
        - {name: body, in: body, required: true, schema: {$ref: "#/definitions/Pet"}}
  /pets/{petId}:
    parameters:
      - {name: petId, in: path, required: true, type: integer}
    get:
      operationId: getPet
    delete:
      operationId: deletePet
"##;

fn router() -> Arc<Router> {
    let api: Value = serde_yaml::from_str(PETSTORE).unwrap();
    Arc::new(Router::new(&api).unwrap())
}

fn dispatcher(builder: HandlerRegistryBuilder) -> Dispatcher {
    Dispatcher::new(router(), builder.build())
}

fn full_registry() -> HandlerRegistryBuilder {
    HandlerRegistry::builder()
        .add("listPets", |_ctx, params| {
            Ok(Reply::Value(json!({
                "limit": params.get_i64("limit"),
                "tags": params.get("tags").map(|v| v.to_json()),
            })))
        })
        .add("create_pet", |_ctx, mut params| {
            let body = params.take("body").map(|v| v.to_json()).unwrap_or(Value::Null);
            Ok(Reply::Response(ApiResponse::json(201, &body)))
        })
        .add("get_pet", |_ctx, params| match params.get_i64("pet_id") {
            Some(1) => Ok(Reply::Value(json!({ "id": 1, "name": "Rex" }))),
            _ => Ok(Reply::exceptional(404, "Pet not found")),
        })
        .add("delete_pet", |_ctx, _params| anyhow::bail!("storage offline"))
}

#[test]
fn test_unmatched_path() {
    let dispatcher = dispatcher(full_registry());
    let request = ApiRequest::new(Method::GET, "/owners");
    assert!(dispatcher.dispatch(&request).unwrap().is_none());

    let response = dispatcher.respond(&request);
    assert_eq!(response.status, 404);
    assert_eq!(response.body_json(), Some(json!({ "error": "Not found" })));
}

#[test]
fn test_method_not_allowed_lists_declared_methods() {
    let dispatcher = dispatcher(full_registry());
    let response = dispatcher
        .dispatch(&ApiRequest::new(Method::PUT, "/pets/1"))
        .unwrap()
        .unwrap();
    assert_eq!(response.status, 405);
    assert_eq!(response.get_header("allow"), Some("GET, DELETE"));
}

#[test]
fn test_value_reply_is_json() {
    let dispatcher = dispatcher(full_registry());
    let response = dispatcher.respond(&ApiRequest::new(Method::GET, "/pets?limit=5&tags=a,b"));
    assert_eq!(response.status, 200);
    assert_eq!(response.get_header("content-type"), Some("application/json"));
    let body = response.body_json().unwrap();
    assert_eq!(body["limit"], json!(5));
    assert_eq!(body["tags"], json!(["a", "b"]));
}

#[test]
fn test_invalid_parameters_answer_400() {
    let dispatcher = dispatcher(full_registry());
    let response = dispatcher.respond(&ApiRequest::new(Method::GET, "/pets?limit=500"));
    assert_eq!(response.status, 400);
    let body = response.body_json().unwrap();
    assert_eq!(body["error"], json!("Invalid parameters"));
    assert_eq!(body["errors"]["limit"]["kind"], json!("schema_violation"));

    let response = dispatcher.respond(&ApiRequest::new(Method::GET, "/pets/abc"));
    assert_eq!(response.status, 400);
    let body = response.body_json().unwrap();
    assert_eq!(body["errors"]["petId"]["kind"], json!("invalid_integer"));
}

#[test]
fn test_body_is_validated_against_definition() {
    let dispatcher = dispatcher(full_registry());

    let response = dispatcher.respond(
        &ApiRequest::new(Method::POST, "/pets").with_body("application/json", r#"{"name":"Rex"}"#),
    );
    assert_eq!(response.status, 201);
    assert_eq!(response.body_json(), Some(json!({ "name": "Rex" })));

    let response = dispatcher
        .respond(&ApiRequest::new(Method::POST, "/pets").with_body("application/json", "{}"));
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body_json().unwrap()["errors"]["body"]["kind"],
        json!("schema_violation")
    );

    let response = dispatcher.respond(&ApiRequest::new(Method::POST, "/pets"));
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body_json().unwrap()["errors"]["body"]["kind"],
        json!("missing")
    );
}

#[test]
fn test_exceptional_reply_passes_through() {
    let dispatcher = dispatcher(full_registry());
    let response = dispatcher.respond(&ApiRequest::new(Method::GET, "/pets/2"));
    assert_eq!(response.status, 404);
    assert_eq!(response.body_json(), Some(json!({ "error": "Pet not found" })));

    let response = dispatcher.respond(&ApiRequest::new(Method::GET, "/pets/1"));
    assert_eq!(response.status, 200);
}

#[test]
fn test_handler_error_is_dispatch_error() {
    let dispatcher = dispatcher(full_registry());
    let request = ApiRequest::new(Method::DELETE, "/pets/1");
    match dispatcher.dispatch(&request) {
        Err(DispatchError::Handler { operation_id, error }) => {
            assert_eq!(operation_id, "deletePet");
            assert!(error.to_string().contains("storage offline"));
        }
        other => panic!("expected handler error, got {other:?}"),
    }
    assert_eq!(dispatcher.respond(&request).status, 500);
}

#[test]
fn test_handler_panic_answers_500() {
    let dispatcher = dispatcher(
        full_registry().add("delete_pet", |_ctx, _params| -> anyhow::Result<Reply> {
            panic!("boom")
        }),
    );
    let request = ApiRequest::new(Method::DELETE, "/pets/1");
    match dispatcher.dispatch(&request) {
        Err(DispatchError::Handler { error, .. }) => {
            assert!(error.to_string().contains("boom"));
        }
        other => panic!("expected handler error, got {other:?}"),
    }
    assert_eq!(dispatcher.respond(&request).status, 500);
}

#[test]
fn test_missing_handler() {
    let dispatcher = dispatcher(HandlerRegistry::builder());
    let request = ApiRequest::new(Method::GET, "/pets");
    match dispatcher.dispatch(&request) {
        Err(DispatchError::MissingHandler(err)) => {
            assert_eq!(err.operation_id, "listPets");
            assert_eq!(err.snake_case, "list_pets");
        }
        other => panic!("expected missing handler, got {other:?}"),
    }
    let response = dispatcher.respond(&request);
    assert_eq!(response.status, 500);
    assert_eq!(
        response.body_json(),
        Some(json!({ "error": "Internal server error" }))
    );
}

#[test]
fn test_request_id_reaches_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let dispatcher = dispatcher(HandlerRegistry::builder().add_handler(
        "getPet",
        handler(move |ctx, _params| {
            recorder.lock().unwrap().push(ctx.request_id.to_string());
            Ok(Reply::Value(json!(ctx.operation.id())))
        }),
    ));

    let id = "01ARZ3NDEKTSV4RRFFQ69G5FAV";
    let response = dispatcher.respond(
        &ApiRequest::new(Method::GET, "/pets/1").with_header("X-Request-Id", id),
    );
    assert_eq!(response.body_json(), Some(json!("getPet")));
    dispatcher.respond(&ApiRequest::new(Method::GET, "/pets/1"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], id);
    assert_ne!(seen[1], id);
    assert_eq!(seen[1].len(), 26);
}

#[test]
fn test_path_captures_are_percent_decoded() {
    let api: Value = serde_yaml::from_str(
        r"
swagger: '2.0'
paths:
  /users/{name}:
    get:
      operationId: getUser
      parameters:
        - {name: name, in: path, required: true, type: string}
        - {name: q, in: query, type: string}
",
    )
    .unwrap();
    let registry = HandlerRegistry::builder()
        .add("getUser", |_ctx, params| {
            Ok(Reply::Value(json!({
                "name": params.get_str("name"),
                "q": params.get_str("q"),
            })))
        })
        .build();
    let dispatcher = Dispatcher::new(Arc::new(Router::new(&api).unwrap()), registry);

    let response = dispatcher.respond(&ApiRequest::new(
        Method::GET,
        "/users/J%C3%BCrgen%20M?q=J%C3%BCrgen%20M",
    ));
    assert_eq!(response.status, 200);
    assert_eq!(
        response.body_json(),
        Some(json!({ "name": "Jürgen M", "q": "Jürgen M" }))
    );

    let response = dispatcher.respond(&ApiRequest::new(Method::GET, "/users/%FF"));
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body_json().unwrap()["errors"]["name"]["kind"],
        json!("invalid_path_segment")
    );
}
