use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::medicine::{MedicineRef, WinningProduct};
use crate::shared::date_range::DateRange;
use crate::system::users::UserRole;

/// What the dashboard asks for when it (re)starts an aggregation cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleTrigger {
    /// Month token "YYYY-MM". When absent, month and year follow the current date.
    #[serde(default)]
    pub reference_date: Option<String>,
    /// Any date inside the wanted week ("YYYY-MM-DD" or RFC 3339).
    /// When absent or unreadable, the current week is used.
    #[serde(default)]
    pub selected_week: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

/// One slot of a fixed-length chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub total: f64,
}

/// Windows the snapshot was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub month: u32,
    pub year: i32,
    /// e.g. "March"
    pub month_name: String,
    pub month_range: DateRange,
    pub year_range: DateRange,
    pub week_range: DateRange,
    /// e.g. "Feb 26 - Mar 3, 2024"
    pub week_display: String,
}

/// Progress of a single objective, 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveProgress {
    pub id: String,
    pub title: String,
    pub progress: f64,
}

/// Everything the dashboard shows, produced by one aggregation cycle.
///
/// Never patched in place: a newer cycle replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub snapshot_id: Uuid,
    pub cycle_id: u64,
    pub generated_at: DateTime<Utc>,
    pub period: PeriodSummary,
    pub total_sales_year: f64,
    pub total_sales_month: f64,
    /// Mon..Sun
    pub weekly_series: Vec<SeriesPoint>,
    /// Jan..Dec
    pub yearly_series: Vec<SeriesPoint>,
    pub expiring_count: usize,
    pub low_stock_count: usize,
    pub expired_list: Vec<MedicineRef>,
    pub winning_products: Vec<WinningProduct>,
    /// Mean progress over all objectives, 0 for non-privileged callers.
    pub okr_progress: f64,
    pub objectives: Vec<ObjectiveProgress>,
}

/// Lifecycle of the aggregation cycle as seen by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Passive read of the dashboard: last good snapshot plus cycle status.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatusResponse {
    pub phase: CyclePhase,
    pub cycle_id: u64,
    /// Human-readable failure of the latest cycle, if it failed.
    pub last_error: Option<String>,
    /// Last successfully published snapshot. Kept on failure.
    pub snapshot: Option<DashboardSnapshot>,
}
