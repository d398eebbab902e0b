//! Response envelope
//!
//! Every request handled by the API is answered with exactly one envelope,
//! serialized as JSON. Absent fields are left out of the wire form.

use hyper::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Uniform success/error wrapper
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope {
    /// Selects the wire status line; never serialized
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "is_zero")]
    pub error_code: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_message: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(code: &u32) -> bool {
    *code == 0
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            meta: None,
            data: None,
            error_code: 0,
            error_message: String::new(),
        }
    }
}

impl Envelope {
    /// Successful envelope carrying `data`
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Error envelope; `status` should not be 200
    pub fn error(status: StatusCode, error_code: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code,
            error_message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error_code != 0 || !self.error_message.is_empty()
    }
}
