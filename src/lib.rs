//! # specrouter
//!
//! **specrouter** routes HTTP requests against a
//! [Swagger 2.0](https://swagger.io/specification/v2/) document: it compiles
//! the document's paths into matchers, reads and validates every declared
//! parameter, and calls the handler registered under the operation's
//! `operationId`.
//!
//! ## Architecture
//!
//! - **[`spec`]** - Loading documents and resolving local `$ref`s
//! - **[`router`]** - Compiled path matchers and [`Operation`]s
//! - **[`parameters`]** - Reading, casting and validating request parameters
//! - **[`schema`]** - Compiled JSON Schema validators for bodies and keywords
//! - **[`handlers`]** - Handler registry and CRUD capability traits
//! - **[`dispatcher`]** - Request dispatch and URL table registration
//! - **[`validator`]** - Startup check that every operation has a handler
//! - **[`docs`]** - Swagger JSON and Swagger UI views
//! - **[`generator`]** - Handler stub generation
//! - **[`server`]** - Framework-neutral request and response types
//! - **[`config`]** / **[`logging`]** - Environment-driven settings
//!
//! ### Request Flow
//!
//! ```text
//! ApiRequest -> Router::match_path -> Path::get_operation (405)
//!            -> read_parameters (400) -> HandlerRegistry::get_handler
//!            -> handler -> Reply -> ApiResponse
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use specrouter::{handler, ApiRequest, Dispatcher, HandlerRegistry, Reply, Router};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api: serde_json::Value = serde_yaml::from_str(r#"
//! swagger: "2.0"
//! paths:
//!   /pets/{petId}:
//!     get:
//!       operationId: getPet
//!       parameters:
//!         - {name: petId, in: path, required: true, type: integer}
//! "#)?;
//! let router = Arc::new(Router::new(&api)?);
//!
//! let handlers = HandlerRegistry::builder()
//!     .add_handler(
//!         "get_pet",
//!         handler(|_ctx, params| {
//!             let id = params.get_i64("pet_id");
//!             Ok(Reply::Value(serde_json::json!({ "id": id })))
//!         }),
//!     )
//!     .build();
//!
//! let dispatcher = Dispatcher::new(router, handlers);
//! dispatcher.validate()?;
//!
//! let response = dispatcher.respond(&ApiRequest::new(http::Method::GET, "/pets/7"));
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body_json(), Some(serde_json::json!({ "id": 7 })));
//! # Ok(())
//! # }
//! ```
//!
//! ## CLI
//!
//! The `specrouter` binary checks documents, prints URL tables and generates
//! handler stubs; see [`cli`].

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod docs;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod parameters;
pub mod router;
pub mod schema;
pub mod server;
pub mod spec;
pub mod validator;

pub use dispatcher::{Dispatcher, UrlOptions, UrlPattern, UrlTable};
pub use error::{DispatchError, ErroneousParameters, FieldError, SpecError};
pub use handlers::{handler, Handler, HandlerContext, HandlerRegistry, Reply};
pub use ids::RequestId;
pub use parameters::{ParamValue, Parameters};
pub use router::{Operation, Router};
pub use server::{ApiRequest, ApiResponse};
