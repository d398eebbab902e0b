//! Capability dispatch
//!
//! Maps (method, identifier) to one capability of a resource, invokes it, and
//! turns the outcome into exactly one response.

use hyper::Method;
use std::sync::Arc;

use super::response::{self, ApiResponse};
use super::{ApiError, ApiRequest, Envelope};
use crate::logger;
use crate::resource::{Payload, Resource};

/// What a request asks of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    FetchAll,
    FetchById(String),
    Create,
}

impl Operation {
    /// `None` for methods with no capability behind them
    pub fn resolve(method: &Method, id: Option<&str>) -> Option<Self> {
        match *method {
            Method::GET => match id {
                Some(id) if !id.is_empty() => Some(Self::FetchById(id.to_string())),
                _ => Some(Self::FetchAll),
            },
            Method::POST => Some(Self::Create),
            _ => None,
        }
    }
}

/// Run the capability matching `method` and `id` against `resource`.
///
/// The body is only decoded for create, and only once the capability is
/// known to exist.
pub fn dispatch(
    resource: &Resource,
    method: &Method,
    id: Option<&str>,
    body: &[u8],
) -> Result<Envelope, ApiError> {
    let operation = Operation::resolve(method, id).ok_or(ApiError::NotImplemented)?;

    match operation {
        Operation::FetchById(id) => resource
            .fetch_by_id()
            .map(|capability| capability.get_by_id(&id))
            .ok_or(ApiError::NotImplemented),
        Operation::FetchAll => resource
            .fetch_all()
            .map(|capability| capability.get())
            .ok_or(ApiError::NotImplemented),
        Operation::Create => {
            let capability = resource.create().ok_or(ApiError::NotImplemented)?;
            let payload = decode_payload(body)?;
            Ok(capability.post(payload))
        }
    }
}

/// Decode a request body that must be a JSON object
pub fn decode_payload(body: &[u8]) -> Result<Payload, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Innermost handler of every endpoint.
///
/// Capabilities may block, so they run on the blocking pool. A capability
/// that panics fails only its own request.
pub async fn handle(req: ApiRequest, resource: Arc<Resource>) -> ApiResponse {
    let ApiRequest {
        method, id, body, ..
    } = req;

    let outcome =
        tokio::task::spawn_blocking(move || dispatch(&resource, &method, id.as_deref(), &body))
            .await;

    match outcome {
        Ok(Ok(envelope)) => response::success_response(&envelope),
        Ok(Err(err)) => response::api_error_response(&err),
        Err(e) => {
            logger::log_error(&format!("Capability invocation failed: {e}"));
            response::api_error_response(&ApiError::Internal(
                "Capability invocation failed".to_string(),
            ))
        }
    }
}
