// Request as seen by middleware and the dispatcher

use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};
use std::net::SocketAddr;

/// Name of the router path parameter carrying the entity identifier
pub const ID_PARAM: &str = "ID";

/// A routed request with its body already collected
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    /// Value of the `:ID` path parameter, if the route has one
    pub id: Option<String>,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
}

impl ApiRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            id: None,
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
