use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::http::connection::Connection;
use crate::server::gateway::Gateway;

pub async fn run(listen_addr: &str, gateway: Gateway) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!("Listening on {}", listen_addr);

    serve(listener, gateway).await
}

/// Accept connections forever on an already bound listener.
pub async fn serve(listener: TcpListener, gateway: Gateway) -> anyhow::Result<()> {
    let gateway = Arc::new(gateway);

    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::debug!("Accepted connection from {}", peer);

        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, gateway);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
