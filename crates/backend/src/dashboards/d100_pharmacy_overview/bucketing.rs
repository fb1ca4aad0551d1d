use chrono::Datelike;
use contracts::dashboards::d100_pharmacy_overview::SeriesPoint;
use contracts::domain::sales::SaleRecord;

use crate::shared::time_range::BusinessTimezone;

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Sum sale amounts per weekday, Monday = 0 .. Sunday = 6.
///
/// Records without a readable date and non-finite amounts contribute 0.
pub fn bucket_weekly(records: &[SaleRecord], tz: BusinessTimezone) -> [f64; 7] {
    let mut slots = [0.0; 7];
    accumulate(records, tz, &mut slots, |date| {
        ((date.weekday().num_days_from_sunday() + 6) % 7) as usize
    });
    slots
}

/// Sum sale amounts per calendar month, January = 0 .. December = 11.
pub fn bucket_yearly(records: &[SaleRecord], tz: BusinessTimezone) -> [f64; 12] {
    let mut slots = [0.0; 12];
    accumulate(records, tz, &mut slots, |date| date.month0() as usize);
    slots
}

pub fn weekly_series(slots: &[f64; 7]) -> Vec<SeriesPoint> {
    label_series(&WEEKDAY_LABELS, slots)
}

pub fn yearly_series(slots: &[f64; 12]) -> Vec<SeriesPoint> {
    label_series(&MONTH_LABELS, slots)
}

fn accumulate<F>(records: &[SaleRecord], tz: BusinessTimezone, slots: &mut [f64], slot_of: F)
where
    F: Fn(chrono::DateTime<chrono::FixedOffset>) -> usize,
{
    let mut undated = 0usize;
    for record in records {
        let Some(occurred_at) = record.occurred_at else {
            undated += 1;
            continue;
        };
        let amount = if record.amount.is_finite() { record.amount } else { 0.0 };
        if let Some(slot) = slots.get_mut(slot_of(tz.localize(&occurred_at))) {
            *slot += amount;
        }
    }
    if undated > 0 {
        tracing::debug!("{} sale records without a readable date counted as 0", undated);
    }
}

fn label_series(labels: &[&str], slots: &[f64]) -> Vec<SeriesPoint> {
    labels
        .iter()
        .zip(slots)
        .map(|(label, total)| SeriesPoint {
            label: (*label).to_string(),
            total: *total,
        })
        .collect()
}
