//! # Dispatcher Module
//!
//! Runs a matched request through its operation and produces a response.
//!
//! ## Request Flow
//!
//! 1. **Match** the request path against the declared templates. No match is
//!    not an error here: [`Dispatcher::dispatch`] returns `Ok(None)` and the
//!    host decides what to answer.
//! 2. **Method check**: a path that does not declare the request method
//!    answers `405` with an `Allow` header.
//! 3. **Parameters** are read with [`read_parameters`](crate::parameters::read_parameters).
//!    Every failing field is reported in one `400` response:
//!
//!    ```json
//!    {"error": "Invalid parameters",
//!     "errors": {"limit": {"kind": "invalid_integer", "message": "..."}}}
//!    ```
//! 4. **Handler lookup** by operation id, then by its snake_case form. A miss
//!    is a server integrity error ([`MissingHandler`](crate::error::MissingHandler)),
//!    which [`Dispatcher::validate`] rules out at startup.
//! 5. **Invoke** the handler. Errors and panics become
//!    [`DispatchError::Handler`](crate::error::DispatchError::Handler).
//! 6. **Transform** the [`Reply`](crate::handlers::Reply): values are encoded
//!    as JSON, responses pass through unchanged.
//!
//! [`Dispatcher::respond`] wraps the whole flow and maps every outcome to a
//! response (`404` for unmatched paths, `500` for server-side failures).
//!
//! ## URL Registration
//!
//! Hosts with their own URL table install the patterns from
//! [`Dispatcher::get_urls`]; hosts without one can use [`UrlTable`].
//!
//! ```
//! use specrouter::dispatcher::{Dispatcher, UrlOptions, UrlTable};
//! use specrouter::handlers::{HandlerRegistry, Reply};
//! use specrouter::router::Router;
//! use specrouter::server::ApiRequest;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let api: serde_json::Value = serde_yaml::from_str(r#"
//! swagger: "2.0"
//! paths:
//!   /ping:
//!     get:
//!       operationId: ping
//! "#).unwrap();
//! let router = Arc::new(Router::new(&api).unwrap());
//! let handlers = HandlerRegistry::builder()
//!     .add("ping", |_ctx, _params| Ok(Reply::Value(json!("pong"))))
//!     .build();
//! let dispatcher = Arc::new(Dispatcher::new(router, handlers));
//!
//! let options = UrlOptions::default().with_optional_trailing_slash(true);
//! let table = UrlTable::new(dispatcher.get_urls(&options).unwrap());
//! let response = table.handle(&ApiRequest::new(http::Method::GET, "/ping/"));
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, b"\"pong\"");
//! ```

mod core;
mod urls;

pub use core::{transform_reply, Dispatcher, REQUEST_ID_HEADER};
pub use urls::{root_view, UrlOptions, UrlPattern, UrlTable, View, ViewDecorator};
