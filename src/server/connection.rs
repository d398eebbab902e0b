// Connection handling module
// Serves one accepted TCP connection with hyper's HTTP/1 machinery

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::Api;
use crate::logger;

/// Serve `stream` in its own task.
///
/// The peer address is attached to each request as an extension so that
/// middleware can see it.
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    api: Arc<Api>,
    keep_alive: bool,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive);

        let service = service_fn(move |mut req: Request<Incoming>| {
            let api = Arc::clone(&api);
            async move {
                req.extensions_mut().insert(peer_addr);
                Ok::<_, Infallible>(api.handle(req).await)
            }
        });

        if let Err(err) = builder.serve_connection(io, service).await {
            logger::log_connection_error(&err);
        }
    });
}
