//! # Generator Module
//!
//! Generates handler stubs for every operation of a document, as a starting
//! point for an implementation.
//!
//! ## Output
//!
//! One function per distinct snake_case operation id, sorted by name. When
//! two operations share a snake_case id, the one declared last wins. Each
//! stub lists the operation's parameter names and fails with
//! `Handler <operationId> not implemented` until it is filled in. A
//! `handlers()` function returns every stub for registration:
//!
//! ```text
//! /// `GET /pets/{petId}` (getPet)
//! ///
//! /// Parameters: `petId`
//! pub fn get_pet(_ctx: &HandlerContext<'_>, _params: Parameters) -> anyhow::Result<Reply> {
//!     anyhow::bail!("Handler getPet not implemented")
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! specrouter stubs --spec swagger.yaml > src/handlers.rs
//! ```

mod templates;

use crate::router::{Operation, Router};
use anyhow::Context;
use askama::Template;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

pub use templates::{HandlerStub, HandlerStubsTemplateData};

/// Collect one stub per distinct snake_case operation id, sorted by name.
#[must_use]
pub fn collect_stubs(router: &Router) -> Vec<HandlerStub> {
    let mut by_name: BTreeMap<String, &Operation> = BTreeMap::new();
    for operation in router.operations() {
        by_name.insert(operation.snake_case_id(), operation);
    }
    by_name
        .into_iter()
        .map(|(func_name, operation)| HandlerStub::new(func_name, operation))
        .collect()
}

/// Render the stub module for every operation of `router`.
pub fn generate_handler_stubs(router: &Router) -> anyhow::Result<String> {
    let stubs = collect_stubs(router);
    let stubs_count = stubs.len();
    let rendered = HandlerStubsTemplateData { stubs }
        .render()
        .context("failed to render handler stubs")?;
    info!(stubs_count, "Handler stubs generated");
    Ok(rendered)
}

/// Render the stub module and write it to `path`.
pub fn write_handler_stubs(router: &Router, path: &Path) -> anyhow::Result<()> {
    let rendered = generate_handler_stubs(router)?;
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Handler stubs written");
    Ok(())
}
