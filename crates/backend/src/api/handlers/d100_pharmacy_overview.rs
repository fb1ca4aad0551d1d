use std::sync::Arc;

use axum::{http::StatusCode, Json};
use contracts::dashboards::d100_pharmacy_overview::{
    CycleTrigger, DashboardSnapshot, DashboardStatusResponse,
};

use crate::dashboards::d100_pharmacy_overview::{get_aggregator, DashboardAggregator, DashboardError};

type ApiError = (StatusCode, String);

/// GET /api/d100/dashboard
///
/// Passive read: current phase, last error and the last published snapshot.
pub async fn get_dashboard() -> Result<Json<DashboardStatusResponse>, ApiError> {
    let aggregator = aggregator()?;
    let status = aggregator.status();
    tracing::debug!(
        "D100 Dashboard: status read (phase={:?}, cycle={})",
        status.phase,
        status.cycle_id
    );
    Ok(Json(status))
}

/// POST /api/d100/dashboard/refresh
pub async fn refresh(
    Json(trigger): Json<CycleTrigger>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let aggregator = aggregator()?;
    tracing::info!(
        "D100 Dashboard: refresh requested (month={:?}, week={:?}, role={})",
        trigger.reference_date,
        trigger.selected_week,
        trigger.role.as_str()
    );
    cycle_response(aggregator.run_cycle(trigger).await)
}

/// POST /api/d100/dashboard/retry
///
/// Re-runs the last trigger after a failed cycle.
pub async fn retry() -> Result<Json<DashboardSnapshot>, ApiError> {
    let aggregator = aggregator()?;
    tracing::info!("D100 Dashboard: retry requested");
    cycle_response(aggregator.retry().await)
}

fn aggregator() -> Result<Arc<DashboardAggregator>, ApiError> {
    get_aggregator().ok_or_else(|| {
        tracing::error!("D100 Dashboard: aggregator is not initialized");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Dashboard is not initialized".to_string(),
        )
    })
}

fn cycle_response(
    result: Result<Arc<DashboardSnapshot>, DashboardError>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    match result {
        Ok(snapshot) => Ok(Json(snapshot.as_ref().clone())),
        Err(e) => {
            let status = match &e {
                DashboardError::Collaborator { .. } => StatusCode::BAD_GATEWAY,
                DashboardError::Superseded { .. } => StatusCode::CONFLICT,
                DashboardError::InvalidPeriod(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((status, e.to_string()))
        }
    }
}
