//! # Handlers Module
//!
//! Operation handlers and the registry that maps operation ids to them.
//!
//! ## Registration
//!
//! Handlers are collected with a [`HandlerRegistryBuilder`] and frozen with
//! [`HandlerRegistryBuilder::build`]. Once built, a [`HandlerRegistry`] can no
//! longer change, so it can be shared by every request without locking.
//!
//! ```
//! use specrouter::handlers::{HandlerRegistry, Reply};
//! use serde_json::json;
//!
//! let registry = HandlerRegistry::builder()
//!     .add("list_pets", |_ctx, _params| Ok(Reply::Value(json!([]))))
//!     .build();
//!
//! // `listPets` in the document finds `list_pets` through its snake_case form
//! assert!(registry.get_handler("listPets").is_ok());
//! ```
//!
//! Whole groups of handlers are admitted through a [`HandlerNamespace`]:
//! plain maps, `(name, handler)` lists, or a [`CrudNamespace`] that turns
//! a [`Resource`] into list/retrieve/create/update/delete handlers.
//!
//! ## Replies
//!
//! A handler returns a [`Reply`]:
//!
//! - [`Reply::Value`] is serialized as JSON with status `200`
//! - [`Reply::Response`] is used as the response unchanged
//! - [`Reply::Exceptional`] short-circuits with a ready-made response, for
//!   example a `404` from deep inside the handler

mod crud;
mod registry;
mod types;

pub use crud::{
    Capability, Creator, CrudNamespace, Deleter, Hooks, Lister, Resource, Retriever, Updater,
};
pub use registry::{HandlerNamespace, HandlerRegistry, HandlerRegistryBuilder};
pub use types::{handler, Handler, HandlerContext, Reply};
