//! Capability contracts
//!
//! A resource may provide any subset of these. None of them is expected to be
//! idempotent, and identifier validation is left entirely to the implementor.

use crate::api::Envelope;

/// Decoded JSON object from a create request body
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Collection or default view, answered on `GET <prefix>`
pub trait FetchAll: Send + Sync {
    fn get(&self) -> Envelope;
}

/// Single entity, answered on `GET <prefix>/:ID`
pub trait FetchById: Send + Sync {
    /// `id` is never empty.
    fn get_by_id(&self, id: &str) -> Envelope;
}

/// Entity creation, answered on `POST <prefix>`
pub trait Create: Send + Sync {
    fn post(&self, payload: Payload) -> Envelope;
}

impl<F> FetchAll for F
where
    F: Fn() -> Envelope + Send + Sync,
{
    fn get(&self) -> Envelope {
        self()
    }
}

impl<F> FetchById for F
where
    F: Fn(&str) -> Envelope + Send + Sync,
{
    fn get_by_id(&self, id: &str) -> Envelope {
        self(id)
    }
}

impl<F> Create for F
where
    F: Fn(Payload) -> Envelope + Send + Sync,
{
    fn post(&self, payload: Payload) -> Envelope {
        self(payload)
    }
}
