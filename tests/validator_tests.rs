//! Integration tests for startup validation of handler coverage

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{json, Value};
use specrouter::handlers::{HandlerRegistry, Reply};
use specrouter::validator::{issues, validate_router};
use specrouter::{Dispatcher, Router};
use std::sync::Arc;

fn router() -> Arc<Router> {
    let api: Value = serde_yaml::from_str(
        r#"
swagger: "2.0"
paths:
  /users:
    get:
      operationId: listUsers
    post:
      operationId: createUser
  /users/{userId}:
    get:
      operationId: getUser
"#,
    )
    .unwrap();
    Arc::new(Router::new(&api).unwrap())
}

#[test]
fn test_every_missing_handler_is_reported_sorted() {
    let handlers = HandlerRegistry::builder()
        .add("list_users", |_ctx, _params| Ok(Reply::Value(json!([]))))
        .build();
    let dispatcher = Dispatcher::new(router(), handlers);

    let err = dispatcher.validate().unwrap_err();
    let missing: Vec<&str> = err.errors.keys().map(String::as_str).collect();
    assert_eq!(missing, vec!["createUser", "getUser"]);
    assert_eq!(
        err.description(),
        "createUser: Missing handler for operation createUser (tried create_user too)\n\
         getUser: Missing handler for operation getUser (tried get_user too)"
    );
    assert!(issues(&err).iter().all(|issue| issue.kind == "missing_handler"));
}

#[test]
fn test_exact_and_snake_case_names_both_count() {
    let handlers = HandlerRegistry::builder()
        .add("listUsers", |_ctx, _params| Ok(Reply::Value(json!([]))))
        .add("create_user", |_ctx, _params| Ok(Reply::Value(json!({}))))
        .add("getUser", |_ctx, _params| Ok(Reply::Value(json!({}))))
        .build();
    assert!(validate_router(&router(), &handlers).is_ok());
}
