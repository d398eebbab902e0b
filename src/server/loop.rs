// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use crate::api::Api;
use crate::logger;

/// Accept connections on `listener` and serve each with `api`.
///
/// Returns once `shutdown` resolves; connections already accepted keep
/// running in their own tasks.
pub async fn run_server_loop<F>(listener: TcpListener, api: Arc<Api>, keep_alive: bool, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&api), keep_alive);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_server_stop();
                return;
            }
        }
    }
}
