//! Inbound HTTP surface of the relay.

pub mod handler;
pub mod pages;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::Router;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::trigger::TriggerService;

/// Host configuration for the relay's HTTP server.
#[derive(Debug)]
pub struct TriggerServer {
    bind_address: SocketAddr,
    service: Arc<TriggerService>,
}

impl TriggerServer {
    pub fn new(bind_address: SocketAddr, service: TriggerService) -> Self {
        Self {
            bind_address,
            service: Arc::new(service),
        }
    }

    /// Start the server and return a handle for runtime inspection and shutdown.
    pub async fn start(self) -> Result<RunningTriggerServer> {
        let cancellation_token = CancellationToken::new();

        // Any method on any path triggers the same behavior
        let router = Router::new()
            .fallback(handler::handle)
            .with_state(Arc::clone(&self.service));

        let listener = tokio::net::TcpListener::bind(self.bind_address).await?;
        let bound_address = listener.local_addr()?;

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let _ = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
            }
        });

        info!(address = %bound_address, "Trigger relay listening");

        Ok(RunningTriggerServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running relay server.
#[derive(Debug)]
pub struct RunningTriggerServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningTriggerServer {
    /// Return the bound socket address for the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop the server and wait for the accept loop to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("HTTP server task failed: {error}"))?;
        Ok(())
    }
}
