//! Middleware module
//!
//! Middleware form an ordered chain in front of the dispatcher. `Next` walks
//! that chain one step at a time: the first-registered middleware runs first
//! on the way in and last on the way out. A middleware that returns without
//! calling `next.run` ends the request there.

mod access_log;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::api::{dispatch, ApiRequest, ApiResponse};
use crate::resource::Resource;

pub use access_log::AccessLog;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Request interceptor
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: ApiRequest, next: Next) -> BoxFuture<ApiResponse>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(ApiRequest, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResponse> + Send + 'static,
{
    fn call(&self, req: ApiRequest, next: Next) -> BoxFuture<ApiResponse> {
        Box::pin(self(req, next))
    }
}

/// Middleware captured by one endpoint, outermost first
pub type Chain = Arc<[Arc<dyn Middleware>]>;

/// The rest of the chain, ending in the dispatcher
#[derive(Clone)]
pub struct Next {
    chain: Chain,
    position: usize,
    resource: Arc<Resource>,
}

impl Next {
    pub fn new(chain: Chain, resource: Arc<Resource>) -> Self {
        Self {
            chain,
            position: 0,
            resource,
        }
    }

    pub async fn run(mut self, req: ApiRequest) -> ApiResponse {
        match self.chain.get(self.position).cloned() {
            Some(middleware) => {
                self.position += 1;
                middleware.call(req, self).await
            }
            None => dispatch::handle(req, self.resource).await,
        }
    }
}
