pub mod bucketing;
pub mod error;
pub mod http_provider;
pub mod okr_progress;
pub mod provider;
pub mod service;
pub mod worker;

use once_cell::sync::OnceCell;
use std::sync::Arc;

pub use error::DashboardError;
pub use service::DashboardAggregator;

static AGGREGATOR: OnceCell<Arc<DashboardAggregator>> = OnceCell::new();

/// Register the process-wide aggregator used by the HTTP handlers.
pub fn initialize(aggregator: Arc<DashboardAggregator>) -> anyhow::Result<()> {
    AGGREGATOR
        .set(aggregator)
        .map_err(|_| anyhow::anyhow!("Dashboard aggregator is already initialized"))
}

pub fn get_aggregator() -> Option<Arc<DashboardAggregator>> {
    AGGREGATOR.get().cloned()
}
