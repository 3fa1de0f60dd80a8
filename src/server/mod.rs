// Server module entry point
// Accept loop, connection handling and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::AppState;

pub use listener::create_reusable_listener;

/// Accept connections until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: std::future::Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => error!("Failed to accept connection: {e}"),
                }
            }
            () = &mut shutdown => {
                info!("Stopped accepting connections");
                break;
            }
        }
    }
}
