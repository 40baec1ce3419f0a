use super::registry::HandlerNamespace;
use super::types::{handler, Handler, HandlerContext, Reply};
use crate::parameters::{ParamValue, Parameters};
use anyhow::{anyhow, Context};
use heck::ToSnakeCase;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Lists the collection.
pub trait Lister: Send + Sync {
    fn list(&self, ctx: &HandlerContext<'_>, params: &Parameters) -> anyhow::Result<Value>;
}

/// Fetches one object by id; `None` answers `404`.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, ctx: &HandlerContext<'_>, id: &ParamValue) -> anyhow::Result<Option<Value>>;
}

/// Creates an object from the payload and returns its representation.
pub trait Creator: Send + Sync {
    fn create(&self, ctx: &HandlerContext<'_>, data: Value) -> anyhow::Result<Value>;
}

/// Applies a partial update; `None` answers `404`.
pub trait Updater: Send + Sync {
    fn update(
        &self,
        ctx: &HandlerContext<'_>,
        id: &ParamValue,
        data: Value,
    ) -> anyhow::Result<Option<Value>>;
}

/// Removes an object; `false` means it did not exist and answers `404`.
pub trait Deleter: Send + Sync {
    fn delete(&self, ctx: &HandlerContext<'_>, id: &ParamValue) -> anyhow::Result<bool>;
}

/// A resource implements whichever capabilities it supports and reports
/// them here. Missing capabilities produce no handler.
///
/// ```
/// use specrouter::handlers::{HandlerContext, Lister, Resource};
/// use specrouter::parameters::Parameters;
/// use serde_json::{json, Value};
///
/// struct Pets;
///
/// impl Lister for Pets {
///     fn list(&self, _ctx: &HandlerContext<'_>, _params: &Parameters) -> anyhow::Result<Value> {
///         Ok(json!([{ "name": "Rex" }]))
///     }
/// }
///
/// impl Resource for Pets {
///     fn lister(&self) -> Option<&dyn Lister> {
///         Some(self)
///     }
/// }
/// ```
pub trait Resource: Send + Sync + 'static {
    fn lister(&self) -> Option<&dyn Lister> {
        None
    }
    fn retriever(&self) -> Option<&dyn Retriever> {
        None
    }
    fn creator(&self) -> Option<&dyn Creator> {
        None
    }
    fn updater(&self) -> Option<&dyn Updater> {
        None
    }
    fn deleter(&self) -> Option<&dyn Deleter> {
        None
    }
}

/// Processing steps a [`CrudNamespace`] runs around every capability.
///
/// `before` sees the decoded parameters and may rewrite them or fail the
/// call; `after` receives the capability's reply. Both default to passing
/// everything through.
pub trait Hooks: Send + Sync + 'static {
    fn before(
        &self,
        _ctx: &HandlerContext<'_>,
        _capability: Capability,
        _params: &mut Parameters,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn after(
        &self,
        _ctx: &HandlerContext<'_>,
        _capability: Capability,
        reply: Reply,
    ) -> anyhow::Result<Reply> {
        Ok(reply)
    }
}

struct NoHooks;

impl Hooks for NoHooks {}

/// One of the CRUD capabilities an operation can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Capability {
    fn is_offered_by(self, resource: &dyn Resource) -> bool {
        match self {
            Self::List => resource.lister().is_some(),
            Self::Retrieve => resource.retriever().is_some(),
            Self::Create => resource.creator().is_some(),
            Self::Update => resource.updater().is_some(),
            Self::Delete => resource.deleter().is_some(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Binds operation ids to the capabilities of one [`Resource`] and offers
/// the result as a [`HandlerNamespace`].
///
/// The object id is read from the `id` parameter and the payload from
/// `data`; both names can be changed.
pub struct CrudNamespace<R> {
    resource: Arc<R>,
    bindings: Vec<(String, Capability)>,
    id_name: String,
    data_name: String,
    hooks: Arc<dyn Hooks>,
}

impl<R: Resource> CrudNamespace<R> {
    #[must_use]
    pub fn new(resource: R) -> Self {
        Self {
            resource: Arc::new(resource),
            bindings: Vec::new(),
            id_name: "id".to_string(),
            data_name: "data".to_string(),
            hooks: Arc::new(NoHooks),
        }
    }

    /// Serve `operation_id` with `capability`.
    #[must_use]
    pub fn bind(mut self, operation_id: impl Into<String>, capability: Capability) -> Self {
        self.bindings.push((operation_id.into(), capability));
        self
    }

    /// Parameter holding the object id
    #[must_use]
    pub fn with_id_name(mut self, name: &str) -> Self {
        self.id_name = name.to_snake_case();
        self
    }

    /// Parameter holding the create/update payload
    #[must_use]
    pub fn with_data_name(mut self, name: &str) -> Self {
        self.data_name = name.to_snake_case();
        self
    }

    /// Run `hooks` around every bound capability
    #[must_use]
    pub fn with_hooks(mut self, hooks: impl Hooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    fn make_handler(&self, capability: Capability) -> Handler {
        let resource = Arc::clone(&self.resource);
        let hooks = Arc::clone(&self.hooks);
        let id_name = self.id_name.clone();
        let data_name = self.data_name.clone();
        handler(move |ctx, mut params| {
            hooks.before(ctx, capability, &mut params)?;
            let reply = serve(
                resource.as_ref(),
                capability,
                ctx,
                &mut params,
                &id_name,
                &data_name,
            )?;
            hooks.after(ctx, capability, reply)
        })
    }
}

fn serve<R: Resource>(
    resource: &R,
    capability: Capability,
    ctx: &HandlerContext<'_>,
    params: &mut Parameters,
    id_name: &str,
    data_name: &str,
) -> anyhow::Result<Reply> {
    match capability {
        Capability::List => {
            let lister = resource.lister().ok_or_else(|| unsupported(capability))?;
            Ok(Reply::Value(lister.list(ctx, params)?))
        }
        Capability::Retrieve => {
            let retriever = resource
                .retriever()
                .ok_or_else(|| unsupported(capability))?;
            let id = required(params, id_name)?;
            Ok(found(retriever.retrieve(ctx, id)?))
        }
        Capability::Create => {
            let creator = resource.creator().ok_or_else(|| unsupported(capability))?;
            let data = take_payload(params, data_name)?;
            Ok(Reply::Value(creator.create(ctx, data)?))
        }
        Capability::Update => {
            let updater = resource.updater().ok_or_else(|| unsupported(capability))?;
            let data = take_payload(params, data_name)?;
            let id = required(params, id_name)?;
            Ok(found(updater.update(ctx, id, data)?))
        }
        Capability::Delete => {
            let deleter = resource.deleter().ok_or_else(|| unsupported(capability))?;
            let id = required(params, id_name)?;
            if deleter.delete(ctx, id)? {
                Ok(Reply::no_content())
            } else {
                Ok(not_found())
            }
        }
    }
}

impl<R: Resource> HandlerNamespace for CrudNamespace<R> {
    fn entries(&self) -> Vec<(String, Handler)> {
        self.bindings
            .iter()
            .filter(|(operation_id, capability)| {
                let offered = capability.is_offered_by(self.resource.as_ref());
                if !offered {
                    debug!(
                        operation_id = %operation_id,
                        capability = %capability,
                        "Resource lacks capability; no handler emitted"
                    );
                }
                offered
            })
            .map(|(operation_id, capability)| (operation_id.clone(), self.make_handler(*capability)))
            .collect()
    }
}

impl<R> fmt::Debug for CrudNamespace<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudNamespace")
            .field("bindings", &self.bindings)
            .field("id_name", &self.id_name)
            .field("data_name", &self.data_name)
            .finish()
    }
}

fn unsupported(capability: Capability) -> anyhow::Error {
    anyhow!("resource does not support {capability}")
}

fn required<'p>(params: &'p Parameters, name: &str) -> anyhow::Result<&'p ParamValue> {
    params
        .get(name)
        .with_context(|| format!("missing parameter {name}"))
}

fn take_payload(params: &mut Parameters, name: &str) -> anyhow::Result<Value> {
    params
        .take(name)
        .map(|value| value.to_json())
        .with_context(|| format!("missing parameter {name}"))
}

fn found(object: Option<Value>) -> Reply {
    object.map_or_else(not_found, Reply::Value)
}

fn not_found() -> Reply {
    Reply::exceptional(404, "Not found")
}
