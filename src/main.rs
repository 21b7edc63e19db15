use coffee_proxy::config::Config;
use coffee_proxy::server::{gateway::Gateway, listener};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    tracing::info!(
        upstream = %cfg.upstream.base_url,
        account = cfg.deployment.account.as_deref().unwrap_or("-"),
        region = cfg.deployment.region.as_deref().unwrap_or("-"),
        "Starting coffee-proxy"
    );

    let gateway = Gateway::from_config(&cfg)?;

    tokio::select! {
        res = listener::run(&cfg.server.listen_addr, gateway) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
