// Access log middleware
// Logs method, request URI, status and processing time once the wrapped handler returns

use std::time::Instant;

use super::{BoxFuture, Middleware, Next};
use crate::api::{ApiRequest, ApiResponse};
use crate::logger::{self, AccessLogEntry};

/// Writes one access-log line per request
#[derive(Debug, Clone)]
pub struct AccessLog {
    /// `combined`, `common`, `json`, or a custom `$variable` pattern
    format: String,
}

impl AccessLog {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::new("combined")
    }
}

impl Middleware for AccessLog {
    fn call(&self, req: ApiRequest, next: Next) -> BoxFuture<ApiResponse> {
        let format = self.format.clone();
        Box::pin(async move {
            let start = Instant::now();
            let mut entry = AccessLogEntry::from_request(&req);

            let response = next.run(req).await;

            entry.complete(&response, start.elapsed());
            logger::log_access(&entry, &format);
            response
        })
    }
}
