use thiserror::Error;

use super::provider::QueryKind;

/// Failure of one aggregation cycle, as reported to the caller.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// An external query failed; the previous snapshot stays published.
    #[error("Failed to load {query}: {message}")]
    Collaborator { query: QueryKind, message: String },

    /// A newer cycle started while this one was loading; its result was discarded.
    #[error("Cycle {cycle_id} was superseded by cycle {latest}")]
    Superseded { cycle_id: u64, latest: u64 },

    /// The requested period could not be turned into calendar windows.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

impl DashboardError {
    pub fn collaborator(query: QueryKind, err: anyhow::Error) -> Self {
        DashboardError::Collaborator {
            query,
            message: format!("{err:#}"),
        }
    }

    /// Whether the caller should offer a manual retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DashboardError::Collaborator { .. })
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, DashboardError::Superseded { .. })
    }
}
