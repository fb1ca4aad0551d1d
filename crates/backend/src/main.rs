use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use backend::dashboards::d100_pharmacy_overview::{
    self, http_provider::HttpDashboardProvider, worker::DashboardRefreshWorker,
    DashboardAggregator,
};
use backend::{routes, shared, system};
use contracts::dashboards::d100_pharmacy_overview::CycleTrigger;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let timezone = config.dashboard.timezone()?;
    tracing::info!(
        "Pharmacy API: {} (timeout {}s, token {})",
        config.api.base_url,
        config.api.timeout_seconds,
        if config.api.token.is_some() { "set" } else { "not set" }
    );

    let provider = Arc::new(HttpDashboardProvider::new(&config.api)?);
    let initial_trigger = CycleTrigger {
        role: config.dashboard.default_role,
        ..CycleTrigger::default()
    };
    let aggregator = Arc::new(DashboardAggregator::new(provider, timezone, initial_trigger));
    d100_pharmacy_overview::initialize(Arc::clone(&aggregator))?;

    // Начальный цикл и периодическое обновление
    let worker = DashboardRefreshWorker::new(
        Arc::clone(&aggregator),
        config.dashboard.refresh_interval_seconds,
    );
    tokio::spawn(async move {
        worker.refresh_once().await;
        worker.run_loop().await;
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = routes::configure_routes().layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            anyhow::anyhow!(
                "Invalid server address {}:{}: {}",
                config.server.host,
                config.server.port,
                e
            )
        })?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
