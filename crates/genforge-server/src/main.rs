use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use genforge_relay::Relay;
use genforge_relay::vendors::anthropic::AnthropicClient;
use genforge_server::routes::{self, AppState};
use genforge_server::{config, observability};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    config::init();
    observability::init_tracing();

    let settings = config::ServerSettings::from_env();
    let upstream = AnthropicClient::from_env()?;
    let relay = Relay::new(Arc::new(upstream), settings.relay_config());
    let router = routes::build_router(Arc::new(AppState { relay }));

    let addr: SocketAddr = ([127, 0, 0, 1], settings.port).into();
    info!("genforge relay listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
