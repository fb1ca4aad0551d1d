use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use super::service::DashboardAggregator;

/// Фоновый воркер периодического обновления дашборда.
///
/// Каждый тик повторяет последний запрошенный цикл. Тики, пропущенные пока
/// цикл ещё загружается, не накапливаются.
pub struct DashboardRefreshWorker {
    aggregator: Arc<DashboardAggregator>,
    interval_seconds: u64,
}

impl DashboardRefreshWorker {
    pub fn new(aggregator: Arc<DashboardAggregator>, interval_seconds: u64) -> Self {
        Self {
            aggregator,
            interval_seconds: interval_seconds.max(1),
        }
    }

    /// Запускает цикл обновления. Первый тик пропускается: начальный цикл
    /// выполняется при старте сервера.
    pub async fn run_loop(&self) {
        info!(
            "D100 Dashboard: refresh worker started with interval {} seconds",
            self.interval_seconds
        );
        let mut interval = time::interval(Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;

        loop {
            interval.tick().await;
            self.refresh_once().await;
        }
    }

    /// Один цикл обновления; ошибка только логируется.
    /// Пока загружается другой цикл, тик пропускается.
    pub async fn refresh_once(&self) -> bool {
        let Some(result) = self.aggregator.retry_if_idle().await else {
            info!("D100 Dashboard: scheduled refresh skipped, a cycle is still loading");
            return false;
        };
        match result {
            Ok(snapshot) => {
                info!(
                    "D100 Dashboard: scheduled refresh published cycle {}",
                    snapshot.cycle_id
                );
                true
            }
            Err(e) if e.is_superseded() => {
                info!("D100 Dashboard: scheduled refresh superseded: {}", e);
                false
            }
            Err(e) => {
                error!("D100 Dashboard: scheduled refresh failed: {}", e);
                false
            }
        }
    }
}
