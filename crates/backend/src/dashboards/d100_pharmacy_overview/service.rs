use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use contracts::dashboards::d100_pharmacy_overview::{
    CyclePhase, CycleTrigger, DashboardSnapshot, DashboardStatusResponse, PeriodSummary,
};
use tokio::sync::watch;
use uuid::Uuid;

use super::bucketing;
use super::error::DashboardError;
use super::okr_progress;
use super::provider::{DashboardDataProvider, QueryKind};
use crate::shared::format::format_amount;
use crate::shared::time_range::{self, BusinessTimezone, MonthWindow};

/// Everything a dashboard consumer observes, replaced atomically on publish.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub phase: CyclePhase,
    /// Id of the most recently triggered cycle. Only that cycle may publish.
    pub cycle_id: u64,
    pub last_error: Option<String>,
    /// Last good snapshot; a failed cycle leaves it in place.
    pub snapshot: Option<Arc<DashboardSnapshot>>,
    /// Trigger of the most recent cycle, reused by retries and the refresh timer.
    pub last_trigger: CycleTrigger,
}

impl DashboardState {
    pub fn to_response(&self) -> DashboardStatusResponse {
        DashboardStatusResponse {
            phase: self.phase,
            cycle_id: self.cycle_id,
            last_error: self.last_error.clone(),
            snapshot: self.snapshot.as_deref().cloned(),
        }
    }
}

/// Runs aggregation cycles and publishes their snapshots.
///
/// Cycles are sequenced query by query. When a new trigger arrives while a
/// cycle is still loading, the older cycle keeps running but its result is
/// discarded on arrival (latest trigger wins).
///
/// There is one snapshot and one remembered trigger per process: the dashboard
/// has a single consumer. `retry` and the refresh timer re-run whatever trigger
/// came last, including its `selected_week` and `role`, regardless of who
/// asks for the retry.
pub struct DashboardAggregator {
    provider: Arc<dyn DashboardDataProvider>,
    timezone: BusinessTimezone,
    state: watch::Sender<DashboardState>,
}

impl DashboardAggregator {
    pub fn new(
        provider: Arc<dyn DashboardDataProvider>,
        timezone: BusinessTimezone,
        initial_trigger: CycleTrigger,
    ) -> Self {
        let (state, _) = watch::channel(DashboardState {
            last_trigger: initial_trigger,
            ..DashboardState::default()
        });
        Self {
            provider,
            timezone,
            state,
        }
    }

    pub fn timezone(&self) -> BusinessTimezone {
        self.timezone
    }

    /// Passive read of the current state.
    pub fn status(&self) -> DashboardStatusResponse {
        self.state.borrow().to_response()
    }

    pub fn current_snapshot(&self) -> Option<Arc<DashboardSnapshot>> {
        self.state.borrow().snapshot.clone()
    }

    pub fn last_trigger(&self) -> CycleTrigger {
        self.state.borrow().last_trigger.clone()
    }

    /// Receiver notified on every phase change and publish.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub async fn run_cycle(
        &self,
        trigger: CycleTrigger,
    ) -> Result<Arc<DashboardSnapshot>, DashboardError> {
        self.run_cycle_at(trigger, Utc::now()).await
    }

    /// Re-run the last trigger. Used for manual retry and by the refresh timer.
    pub async fn retry(&self) -> Result<Arc<DashboardSnapshot>, DashboardError> {
        self.retry_at(Utc::now()).await
    }

    pub async fn retry_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Arc<DashboardSnapshot>, DashboardError> {
        let trigger = self.last_trigger();
        self.run_cycle_at(trigger, now).await
    }

    /// Re-run the last trigger unless a cycle is already loading.
    /// `None` means the call was skipped. Used by the refresh timer.
    pub async fn retry_if_idle(&self) -> Option<Result<Arc<DashboardSnapshot>, DashboardError>> {
        self.retry_if_idle_at(Utc::now()).await
    }

    pub async fn retry_if_idle_at(
        &self,
        now: DateTime<Utc>,
    ) -> Option<Result<Arc<DashboardSnapshot>, DashboardError>> {
        let mut started = None;
        // Phase check and cycle start under one lock.
        self.state.send_if_modified(|state| {
            if state.phase == CyclePhase::Loading {
                return false;
            }
            state.cycle_id += 1;
            state.phase = CyclePhase::Loading;
            started = Some((state.cycle_id, state.last_trigger.clone()));
            true
        });

        let (cycle_id, trigger) = started?;
        Some(self.execute(cycle_id, trigger, now).await)
    }

    /// Run one cycle with `now` as the reference instant.
    pub async fn run_cycle_at(
        &self,
        trigger: CycleTrigger,
        now: DateTime<Utc>,
    ) -> Result<Arc<DashboardSnapshot>, DashboardError> {
        let cycle_id = self.begin_cycle(&trigger);
        self.execute(cycle_id, trigger, now).await
    }

    async fn execute(
        &self,
        cycle_id: u64,
        trigger: CycleTrigger,
        now: DateTime<Utc>,
    ) -> Result<Arc<DashboardSnapshot>, DashboardError> {
        tracing::info!(
            "D100 Dashboard: cycle {} started (month={:?}, week={:?}, role={})",
            cycle_id,
            trigger.reference_date,
            trigger.selected_week,
            trigger.role.as_str()
        );

        let started = Instant::now();
        let result = self.assemble(cycle_id, &trigger, now).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(snapshot) => tracing::info!(
                "D100 Dashboard: cycle {} loaded in {}ms (month {}, year {})",
                cycle_id,
                elapsed_ms,
                format_amount(snapshot.total_sales_month),
                format_amount(snapshot.total_sales_year)
            ),
            Err(e) => tracing::error!(
                "D100 Dashboard: cycle {} failed after {}ms: {}",
                cycle_id,
                elapsed_ms,
                e
            ),
        }

        self.publish(cycle_id, result)
    }

    fn begin_cycle(&self, trigger: &CycleTrigger) -> u64 {
        let mut cycle_id = 0;
        self.state.send_modify(|state| {
            state.cycle_id += 1;
            cycle_id = state.cycle_id;
            state.phase = CyclePhase::Loading;
            state.last_trigger = trigger.clone();
        });
        cycle_id
    }

    fn publish(
        &self,
        cycle_id: u64,
        result: Result<DashboardSnapshot, DashboardError>,
    ) -> Result<Arc<DashboardSnapshot>, DashboardError> {
        let snapshot = result.map(Arc::new);
        let mut latest = cycle_id;

        // Compared and written under the channel lock, so a newer trigger
        // cannot slip in between the check and the publish.
        self.state.send_if_modified(|state| {
            if state.cycle_id != cycle_id {
                latest = state.cycle_id;
                return false;
            }
            match &snapshot {
                Ok(snapshot) => {
                    state.phase = CyclePhase::Ready;
                    state.last_error = None;
                    state.snapshot = Some(Arc::clone(snapshot));
                }
                Err(e) => {
                    state.phase = CyclePhase::Failed;
                    state.last_error = Some(e.to_string());
                }
            }
            true
        });

        if latest != cycle_id {
            tracing::warn!(
                "D100 Dashboard: discarding result of cycle {}, cycle {} is newer",
                cycle_id,
                latest
            );
            return Err(DashboardError::Superseded { cycle_id, latest });
        }
        snapshot
    }

    async fn assemble(
        &self,
        cycle_id: u64,
        trigger: &CycleTrigger,
        now: DateTime<Utc>,
    ) -> Result<DashboardSnapshot, DashboardError> {
        let tz = self.timezone;

        let month = resolve_month(trigger, now, tz)?;
        let year_range = time_range::year_range(month.year, tz)
            .ok_or_else(|| DashboardError::InvalidPeriod(format!("year {}", month.year)))?;
        let week_range = time_range::week_range(trigger.selected_week.as_deref(), now, tz)
            .ok_or_else(|| DashboardError::InvalidPeriod("week".to_string()))?;

        let provider = &self.provider;

        let month_sales = fetch(QueryKind::MonthSales, provider.query_sales(&month.range)).await?;
        let year_sales = fetch(QueryKind::YearSales, provider.query_sales(&year_range)).await?;

        let expiring = fetch(QueryKind::ExpiringSoon, provider.query_expiring_soon()).await?;
        let low_stock = fetch(QueryKind::LowStock, provider.query_low_stock()).await?;
        let expired = fetch(QueryKind::Expired, provider.query_expired()).await?;
        let winning = fetch(QueryKind::WinningProducts, provider.query_winning_products()).await?;

        let objectives = if trigger.role.is_privileged() {
            fetch(QueryKind::Objectives, provider.query_objectives()).await?
        } else {
            Vec::new()
        };

        let week_sales = fetch(QueryKind::WeekSales, provider.query_sales(&week_range)).await?;

        // The yearly series reuses the year query instead of fetching it twice.
        let weekly = bucketing::bucket_weekly(&week_sales.records, tz);
        let yearly = bucketing::bucket_yearly(&year_sales.records, tz);

        Ok(DashboardSnapshot {
            snapshot_id: Uuid::new_v4(),
            cycle_id,
            generated_at: now,
            period: PeriodSummary {
                month: month.month,
                year: month.year,
                month_name: month.month_name.to_string(),
                month_range: month.range,
                year_range,
                week_range,
                week_display: time_range::format_week_display(&week_range),
            },
            total_sales_year: finite_or_zero(year_sales.total_sales),
            total_sales_month: finite_or_zero(month_sales.total_sales),
            weekly_series: bucketing::weekly_series(&weekly),
            yearly_series: bucketing::yearly_series(&yearly),
            expiring_count: expiring.len(),
            low_stock_count: low_stock.len(),
            expired_list: expired,
            winning_products: winning,
            okr_progress: okr_progress::overall_progress(&objectives),
            objectives: okr_progress::progress_breakdown(&objectives),
        })
    }
}

/// Month follows the chosen "YYYY-MM" token, otherwise the current date.
fn resolve_month(
    trigger: &CycleTrigger,
    now: DateTime<Utc>,
    tz: BusinessTimezone,
) -> Result<MonthWindow, DashboardError> {
    let chosen = trigger
        .reference_date
        .as_deref()
        .filter(|key| !key.trim().is_empty());

    if let Some(key) = chosen {
        match time_range::month_range(key, tz) {
            Some(window) => return Ok(window),
            None => tracing::warn!(
                "D100 Dashboard: month token '{}' is not YYYY-MM, using current month",
                key
            ),
        }
    }

    time_range::current_month_range(now, tz)
        .ok_or_else(|| DashboardError::InvalidPeriod(format!("month of {}", now)))
}

async fn fetch<T, F>(query: QueryKind, fut: F) -> Result<T, DashboardError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    fut.await.map_err(|e| {
        tracing::warn!("D100 Dashboard: {} query failed: {:#}", query, e);
        DashboardError::collaborator(query, e)
    })
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
