use crate::error::{DispatchError, RouterValidationError};
use crate::handlers::{HandlerContext, HandlerRegistry, Reply};
use crate::ids::RequestId;
use crate::parameters::{read_parameters, ReadParametersError};
use crate::router::{Path, PathParams, Router};
use crate::server::{ApiRequest, ApiResponse};
use crate::validator::validate_router;
use anyhow::anyhow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Header carrying the caller's request id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Runs matched requests through method check, parameter reading, handler
/// lookup, invocation and response transformation.
///
/// The router and the registry are both immutable, so one dispatcher can be
/// shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct Dispatcher {
    router: Arc<Router>,
    handlers: HandlerRegistry,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Arc<Router>, handlers: HandlerRegistry) -> Self {
        info!(
            paths_count = router.get_paths().len(),
            total_handlers = handlers.len(),
            "Dispatcher created"
        );
        Self { router, handlers }
    }

    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Check that every declared operation has a handler.
    ///
    /// Meant to run once at startup, before the first request.
    pub fn validate(&self) -> Result<(), RouterValidationError> {
        validate_router(&self.router, &self.handlers)
    }

    /// Dispatch a request by matching its path against the document.
    ///
    /// Returns `Ok(None)` when no declared path matches; answering that is
    /// up to the host.
    ///
    /// # Errors
    ///
    /// Failures that are the server's fault: a broken document, a missing
    /// handler or a handler that returned an error or panicked. Client
    /// errors (`400`, `405`) are ordinary responses.
    pub fn dispatch(&self, request: &ApiRequest) -> Result<Option<ApiResponse>, DispatchError> {
        let Some((path, path_params)) = self.router.match_path(&request.path) else {
            return Ok(None);
        };
        self.dispatch_path(path, request, &path_params).map(Some)
    }

    /// Dispatch a request whose path has already been matched by the host.
    pub fn dispatch_path(
        &self,
        path: &Path,
        request: &ApiRequest,
        path_params: &PathParams,
    ) -> Result<ApiResponse, DispatchError> {
        let request_id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));

        let operation = match path.get_operation(request.method.as_str()) {
            Ok(operation) => operation,
            Err(err) => {
                info!(
                    request_id = %request_id,
                    method = %request.method,
                    path = %request.path,
                    route_pattern = %path.template(),
                    "Method not allowed"
                );
                return Ok(method_not_allowed(path, &err.to_string()));
            }
        };

        let params = match read_parameters(&self.router, operation, request, path_params) {
            Ok(params) => params,
            Err(ReadParametersError::Erroneous(err)) => {
                info!(
                    request_id = %request_id,
                    operation_id = %operation.id(),
                    invalid = ?err.errors.keys().collect::<Vec<_>>(),
                    "Request parameters rejected"
                );
                return Ok(ApiResponse::json(400, &err.to_json()));
            }
            Err(ReadParametersError::Spec(err)) => {
                error!(
                    request_id = %request_id,
                    operation_id = %operation.id(),
                    error = %err,
                    "Document error while reading parameters"
                );
                return Err(err.into());
            }
        };

        debug!(
            request_id = %request_id,
            operation_id = %operation.id(),
            available_handlers = self.handlers.len(),
            "Handler lookup"
        );
        let handler = self.handlers.get_handler(operation.id()).map_err(|err| {
            error!(
                request_id = %request_id,
                operation_id = %operation.id(),
                error = %err,
                "Handler not found - CRITICAL"
            );
            err
        })?;

        info!(
            request_id = %request_id,
            operation_id = %operation.id(),
            method = %request.method,
            path = %request.path,
            params_count = params.len(),
            "Request dispatched to handler"
        );
        let context = HandlerContext {
            request,
            operation,
            path_params,
            request_id,
        };
        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| handler(&context, params)));
        let elapsed_ms = started.elapsed().as_millis();

        let reply = match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                return Err(DispatchError::Handler {
                    operation_id: operation.id().to_string(),
                    error: err,
                })
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    request_id = %request_id,
                    operation_id = %operation.id(),
                    panic_message = %message,
                    "Handler panicked - CRITICAL"
                );
                return Err(DispatchError::Handler {
                    operation_id: operation.id().to_string(),
                    error: anyhow!("handler panicked: {message}"),
                });
            }
        };

        let response = transform_reply(reply);
        info!(
            request_id = %request_id,
            operation_id = %operation.id(),
            status = response.status,
            latency_ms = elapsed_ms,
            "Handler response received"
        );
        Ok(response)
    }

    /// Dispatch and always produce a response.
    ///
    /// Unmatched paths answer `404`, server-side failures `500`.
    #[must_use]
    pub fn respond(&self, request: &ApiRequest) -> ApiResponse {
        match self.dispatch(request) {
            Ok(Some(response)) => response,
            Ok(None) => ApiResponse::error(404, "Not found"),
            Err(err) => internal_error(request, &err),
        }
    }

    /// Dispatch against the path declared under `template`.
    ///
    /// This is what generated URL views call.
    #[must_use]
    pub fn respond_path(
        &self,
        template: &str,
        request: &ApiRequest,
        path_params: &PathParams,
    ) -> ApiResponse {
        let result = self
            .router
            .get_path(template)
            .map_err(DispatchError::from)
            .and_then(|path| self.dispatch_path(path, request, path_params));
        match result {
            Ok(response) => response,
            Err(err) => internal_error(request, &err),
        }
    }
}

/// Turn a handler reply into the final response.
#[must_use]
pub fn transform_reply(reply: Reply) -> ApiResponse {
    match reply {
        Reply::Value(value) => ApiResponse::json(200, &value),
        Reply::Response(response) => response,
        Reply::Exceptional(response) => {
            debug!(status = response.status, "Handler short-circuited with exceptional response");
            response
        }
    }
}

fn method_not_allowed(path: &Path, message: &str) -> ApiResponse {
    let allow: Vec<String> = path
        .allowed_methods()
        .iter()
        .map(ToString::to_string)
        .collect();
    ApiResponse::error(405, message).with_header("allow", allow.join(", "))
}

fn internal_error(request: &ApiRequest, err: &DispatchError) -> ApiResponse {
    match err {
        DispatchError::Handler { .. } => warn!(
            method = %request.method,
            path = %request.path,
            error = %err,
            "Handler failed"
        ),
        _ => error!(
            method = %request.method,
            path = %request.path,
            error = %err,
            "Dispatch failed - server integrity error"
        ),
    }
    ApiResponse::error(500, "Internal server error")
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
