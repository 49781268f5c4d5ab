//! Plume Dashboard Service Binary

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plume_dashboard::{router, AppState, DashboardConfig, DASHBOARD_VERSION};
use plume_lending::{JsonRpcClient, LendingContract, PortalApiClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Plume Dashboard v{}", DASHBOARD_VERSION);

    // Load configuration
    let config = DashboardConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let (lending_contract, repayment_token) = config.contract_addresses()?;

    // Chain access
    let rpc = JsonRpcClient::new(config.chain.rpc_url.clone())?
        .with_poll_interval(Duration::from_millis(config.chain.receipt_poll_ms))
        .with_receipt_timeout(Duration::from_millis(config.chain.receipt_timeout_ms));
    let contract = LendingContract::new(Arc::new(rpc), lending_contract, repayment_token);

    // Balance API
    let api = PortalApiClient::new(config.portal_api_url.clone())?;

    info!(
        "Lending contract={}, repayment token={}, rpc={}, portal={}",
        lending_contract, repayment_token, config.chain.rpc_url, config.portal_api_url
    );

    let state = AppState::new(contract, Arc::new(api));
    let app = router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard listening on {}", addr);

    // Start the server with graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Shutting down Plume Dashboard");
    Ok(())
}
