use anyhow::Result;
use async_trait::async_trait;
use contracts::domain::medicine::{MedicineRef, WinningProduct};
use contracts::domain::objective::Objective;
use contracts::domain::sales::SalesQueryResult;
use contracts::shared::date_range::DateRange;

/// Read-only queries the dashboard aggregates over.
///
/// An `Err` means the collaborator itself failed (network, HTTP status,
/// unparsable body) and fails the whole cycle. Payloads of an unexpected
/// shape are returned as empty results instead.
#[async_trait]
pub trait DashboardDataProvider: Send + Sync {
    async fn query_sales(&self, range: &DateRange) -> Result<SalesQueryResult>;

    async fn query_expiring_soon(&self) -> Result<Vec<MedicineRef>>;

    async fn query_expired(&self) -> Result<Vec<MedicineRef>>;

    async fn query_low_stock(&self) -> Result<Vec<MedicineRef>>;

    /// Medicine sales report ("winning products").
    async fn query_winning_products(&self) -> Result<Vec<WinningProduct>>;

    /// Only called for privileged callers.
    async fn query_objectives(&self) -> Result<Vec<Objective>>;
}

/// Identity of a collaborator query, used in failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    MonthSales,
    YearSales,
    WeekSales,
    ExpiringSoon,
    Expired,
    LowStock,
    WinningProducts,
    Objectives,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::MonthSales => "month sales",
            QueryKind::YearSales => "year sales",
            QueryKind::WeekSales => "week sales",
            QueryKind::ExpiringSoon => "expiring medicines",
            QueryKind::Expired => "expired medicines",
            QueryKind::LowStock => "low stock medicines",
            QueryKind::WinningProducts => "medicine sales report",
            QueryKind::Objectives => "objectives",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
