//! # Router Module
//!
//! The router module turns the `paths` section of a Swagger 2.0 document into
//! an ordered table of compiled path matchers, each owning the operations
//! declared on it.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates (`/pets/{petId}`) into anchored URL patterns
//! - Deriving a stable route name per path (`pets-petid`)
//! - Building one [`Operation`] per declared method with its effective
//!   parameters, `consumes` and `produces`
//! - Matching request paths and extracting path parameters
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: [`Router::new`] walks the document once, resolving
//!    `$ref`s and compiling every template. All structural problems in the
//!    document surface here as a [`SpecError`](crate::error::SpecError).
//!
//! 2. **Matching**: [`Router::match_path`] tests the request path against the
//!    compiled patterns in declaration order; the first match wins. Method
//!    selection happens afterwards through [`Path::get_operation`], so a path
//!    that matches with an undeclared method is a 405, not a 404.
//!
//! ## Example
//!
//! ```rust
//! use specrouter::router::Router;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api: serde_json::Value = serde_yaml::from_str(r#"
//! swagger: "2.0"
//! paths:
//!   /pets/{petId}:
//!     get:
//!       operationId: getPet
//! "#)?;
//! let router = Router::new(&api)?;
//!
//! let (path, params) = router.match_path("/pets/42").expect("matches");
//! assert_eq!(path.name(), "pets-petid");
//! assert_eq!(params["petId"], "42");
//! assert_eq!(path.get_operation("GET")?.id(), "getPet");
//! # Ok(())
//! # }
//! ```

mod core;
mod operation;
mod path;

use std::collections::HashMap;

pub use core::Router;
pub use operation::Operation;
pub use path::{compile_template, route_name, Path};

/// Path parameters captured from a matched URL, keyed by placeholder name
pub type PathParams = HashMap<String, String>;
