use crate::ids::RequestId;
use crate::parameters::Parameters;
use crate::router::{Operation, PathParams};
use crate::server::{ApiRequest, ApiResponse};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Everything a handler may want to know about the request besides its
/// decoded parameters.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub request: &'a ApiRequest,
    pub operation: &'a Operation,
    /// Captures of the matched path template, still percent-encoded
    pub path_params: &'a PathParams,
    /// Correlates every log line of this request
    pub request_id: RequestId,
}

/// What a handler hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Plain data, serialized as a `200` JSON response
    Value(Value),
    /// A complete response, passed through unchanged
    Response(ApiResponse),
    /// A ready-made response that short-circuits normal response handling
    Exceptional(ApiResponse),
}

impl Reply {
    /// Serialize any value into [`Reply::Value`].
    pub fn json<T: Serialize>(value: &T) -> anyhow::Result<Self> {
        Ok(Self::Value(serde_json::to_value(value)?))
    }

    /// `{"error": message}` with the given status, bypassing transformation
    #[must_use]
    pub fn exceptional(status: u16, message: &str) -> Self {
        Self::Exceptional(ApiResponse::error(status, message))
    }

    /// Empty `204 No Content`
    #[must_use]
    pub fn no_content() -> Self {
        Self::Response(ApiResponse::empty(204))
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<ApiResponse> for Reply {
    fn from(response: ApiResponse) -> Self {
        Self::Response(response)
    }
}

/// A registered operation handler.
///
/// Handlers are shared by every request and must be thread safe.
pub type Handler =
    Arc<dyn Fn(&HandlerContext<'_>, Parameters) -> anyhow::Result<Reply> + Send + Sync>;

/// Box a closure or function as a [`Handler`].
///
/// ```
/// use specrouter::handlers::{handler, Reply};
/// use serde_json::json;
///
/// let get_pet = handler(|_ctx, params| {
///     Ok(Reply::Value(json!({ "id": params.get_i64("pet_id") })))
/// });
/// # let _ = get_pet;
/// ```
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&HandlerContext<'_>, Parameters) -> anyhow::Result<Reply> + Send + Sync + 'static,
{
    Arc::new(f)
}
