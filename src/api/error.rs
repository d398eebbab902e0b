// Error types for request handling, registration and startup

use hyper::{Method, StatusCode};
use std::fmt;

use super::Envelope;

/// Application code: capability not implemented
pub const CODE_NOT_IMPLEMENTED: u32 = 1;
/// Application code: internal failure (serialization, panicking capability)
pub const CODE_INTERNAL: u32 = 2;
/// Application code: malformed request body
pub const CODE_BAD_REQUEST: u32 = 3;

pub const NOT_IMPLEMENTED_MESSAGE: &str = "Method is not implemented!";

/// Per-request failure, always recovered into an error envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotImplemented,
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotImplemented => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> u32 {
        match self {
            Self::NotImplemented => CODE_NOT_IMPLEMENTED,
            Self::BadRequest(_) => CODE_BAD_REQUEST,
            Self::Internal(_) => CODE_INTERNAL,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotImplemented => NOT_IMPLEMENTED_MESSAGE,
            Self::BadRequest(message) | Self::Internal(message) => message,
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope::error(self.status(), self.code(), self.message())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {}): {}", self.status(), self.code(), self.message())
    }
}

impl std::error::Error for ApiError {}

/// The router refused an endpoint (conflicting or malformed path)
#[derive(Debug)]
pub struct RegistrationError {
    pub method: Method,
    pub path: String,
    source: matchit::InsertError,
}

impl RegistrationError {
    pub(crate) const fn new(method: Method, path: String, source: matchit::InsertError) -> Self {
        Self {
            method,
            path,
            source,
        }
    }
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to register {} {}: {}",
            self.method, self.path, self.source
        )
    }
}

impl std::error::Error for RegistrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Serving could not begin
#[derive(Debug)]
pub enum StartError {
    /// No endpoint was ever registered; nothing has been bound
    NoEndpoints,
    InvalidAddress(String),
    Io(std::io::Error),
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEndpoints => write!(f, "You must add at least one resource to this API"),
            Self::InvalidAddress(message) => write!(f, "{message}"),
            Self::Io(err) => write!(f, "Failed to bind listener: {err}"),
        }
    }
}

impl std::error::Error for StartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StartError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
