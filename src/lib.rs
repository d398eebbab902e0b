//! Capability-dispatched JSON API layer over hyper.
//!
//! A [`Resource`] declares which of three capabilities it provides
//! (fetch-all, fetch-by-identifier, create). [`Api::new_endpoint_group`]
//! binds it under a path prefix, and each request is dispatched to the
//! matching capability; a missing capability is answered with a
//! "method not implemented" [`Envelope`] rather than a routing error.
//!
//! ```no_run
//! use std::sync::Arc;
//! use resource_api::{AccessLog, Api, Envelope, Resource};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let widgets = Resource::new()
//!     .with_fetch_all(Arc::new(|| Envelope::ok(json!(["gear", "spring"]))))
//!     .with_fetch_by_id(Arc::new(|id: &str| Envelope::ok(json!({ "id": id }))));
//!
//! let mut api = Api::new();
//! api.use_middleware(AccessLog::default());
//! api.new_endpoint_group("/widgets", Arc::new(widgets))?;
//! api.start(8080).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod logger;
pub mod middleware;
pub mod resource;
pub mod routing;
pub mod server;

pub use api::{
    Api, ApiError, ApiRequest, ApiResponse, Envelope, RegistrationError, StartError,
};
pub use hyper::Method;
pub use middleware::{AccessLog, Middleware, Next};
pub use resource::{Capabilities, Create, FetchAll, FetchById, Payload, Resource};

// Method names accepted by `Api::new_endpoint`. Only GET and POST reach a
// capability; the others are answered with "method not implemented".
pub const GET: Method = Method::GET;
pub const POST: Method = Method::POST;
pub const PUT: Method = Method::PUT;
pub const DELETE: Method = Method::DELETE;
pub const HEAD: Method = Method::HEAD;
pub const PATCH: Method = Method::PATCH;
