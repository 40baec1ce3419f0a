use super::types::{Handler, HandlerContext, Reply};
use crate::error::MissingHandler;
use crate::parameters::Parameters;
use heck::ToSnakeCase;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A named collection of handlers that can be admitted in one call.
pub trait HandlerNamespace {
    /// Every `(name, handler)` pair this namespace offers
    fn entries(&self) -> Vec<(String, Handler)>;
}

impl HandlerNamespace for HashMap<String, Handler> {
    fn entries(&self) -> Vec<(String, Handler)> {
        self.iter()
            .map(|(name, h)| (name.clone(), Arc::clone(h)))
            .collect()
    }
}

impl HandlerNamespace for BTreeMap<String, Handler> {
    fn entries(&self) -> Vec<(String, Handler)> {
        self.iter()
            .map(|(name, h)| (name.clone(), Arc::clone(h)))
            .collect()
    }
}

impl HandlerNamespace for Vec<(String, Handler)> {
    fn entries(&self) -> Vec<(String, Handler)> {
        self.iter()
            .map(|(name, h)| (name.clone(), Arc::clone(h)))
            .collect()
    }
}

/// Accumulates handler registrations until [`build`](Self::build) freezes them.
///
/// Names starting with `_` are private and never admitted. A later
/// registration under an existing name replaces the earlier one.
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single function under `name`.
    #[must_use]
    pub fn add<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&HandlerContext<'_>, Parameters) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.add_handler(name, Arc::new(f))
    }

    /// Register an already boxed [`Handler`] under `name`.
    #[must_use]
    pub fn add_handler(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.insert(name.into(), handler);
        self
    }

    /// Admit every public entry of `namespace`.
    #[must_use]
    pub fn add_handlers(mut self, namespace: &impl HandlerNamespace) -> Self {
        for (name, handler) in namespace.entries() {
            self.insert(name, handler);
        }
        self
    }

    /// Number of handlers registered so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Freeze the registrations. The builder is consumed, so nothing can be
    /// added to the resulting registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        info!(
            total_handlers = self.handlers.len(),
            "Handler registry frozen"
        );
        HandlerRegistry {
            handlers: self.handlers,
        }
    }

    fn insert(&mut self, name: String, handler: Handler) {
        if name.starts_with('_') {
            debug!(handler_name = %name, "Skipping private handler");
            return;
        }
        if self.handlers.insert(name.clone(), handler).is_some() {
            warn!(handler_name = %name, "Replaced existing handler");
        } else {
            debug!(handler_name = %name, "Handler registered");
        }
    }
}

impl fmt::Debug for HandlerRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistryBuilder")
            .field("handlers", &sorted_names(&self.handlers))
            .finish()
    }
}

/// Immutable operation-id to handler map.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    /// Find the handler of an operation.
    ///
    /// The id is tried as declared first, then in snake_case, so a handler
    /// registered as `get_user_by_id` serves `getUserById`.
    pub fn get_handler(&self, operation_id: &str) -> Result<&Handler, MissingHandler> {
        if let Some(handler) = self.handlers.get(operation_id) {
            return Ok(handler);
        }
        let snake_case = operation_id.to_snake_case();
        self.handlers
            .get(&snake_case)
            .ok_or_else(|| MissingHandler {
                operation_id: operation_id.to_string(),
                snake_case,
            })
    }

    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.get_handler(operation_id).is_ok()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        sorted_names(&self.handlers)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

fn sorted_names(handlers: &HashMap<String, Handler>) -> Vec<&str> {
    let mut names: Vec<&str> = handlers.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
