//! Framework-neutral request and response types.
//!
//! The router does not own a socket. A host HTTP server converts its native
//! request into an [`ApiRequest`] (directly from `http::Request<Vec<u8>>` via
//! [`ApiRequest::from_http`]), hands it to the
//! [`Dispatcher`](crate::dispatcher::Dispatcher) and writes the returned
//! [`ApiResponse`] back, optionally through [`ApiResponse::into_http`].

pub mod request;
pub mod response;

pub use request::{header_meta_key, ApiRequest, ContentType, QueryMap, UploadedFile};
pub use response::{status_reason, ApiResponse, HeaderVec, MAX_INLINE_HEADERS};
