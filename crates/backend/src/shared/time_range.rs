//! Calendar windows (month, year, ISO week) in the business timezone.
//!
//! Every function takes the [`BusinessTimezone`] explicitly, so results do not
//! depend on the host's locale. "Now" is always normalized into the business
//! offset before any calendar field is read.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, Utc};
use contracts::shared::date_range::DateRange;
use contracts::shared::lenient;

/// Москва, UTC+3 без перехода на летнее время.
pub const DEFAULT_OFFSET_HOURS: i32 = 3;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Fixed UTC offset used for all calendar-boundary math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessTimezone {
    offset: FixedOffset,
}

impl BusinessTimezone {
    pub fn from_offset_hours(hours: i32) -> Result<Self> {
        if !(-23..=23).contains(&hours) {
            return Err(anyhow!(
                "timezone offset must be within -23..=23 hours, got {}",
                hours
            ));
        }
        let offset = FixedOffset::east_opt(hours * 3600)
            .ok_or_else(|| anyhow!("invalid timezone offset: {} hours", hours))?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The instant expressed in business time.
    pub fn localize<Tz: chrono::TimeZone>(&self, instant: &DateTime<Tz>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// Calendar date of `now` in business time.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.localize(&now).date_naive()
    }
}

impl Default for BusinessTimezone {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(DEFAULT_OFFSET_HOURS * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

/// A resolved calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthWindow {
    pub range: DateRange,
    pub year: i32,
    /// 1..=12
    pub month: u32,
    pub month_name: &'static str,
}

/// English month name for `month` in 1..=12.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

/// Month containing `now` (in business time).
pub fn current_month_range(now: DateTime<Utc>, tz: BusinessTimezone) -> Option<MonthWindow> {
    let today = tz.today(now);
    month_window(today.year(), today.month(), tz)
}

/// Month named by a `"YYYY-MM"` token. Empty or malformed tokens yield `None`.
pub fn month_range(year_month_key: &str, tz: BusinessTimezone) -> Option<MonthWindow> {
    let (year, month) = parse_month_key(year_month_key)?;
    month_window(year, month, tz)
}

/// Jan 1 00:00:00.000 .. Dec 31 23:59:59.999 of `year`.
pub fn year_range(year: i32, tz: BusinessTimezone) -> Option<DateRange> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
    DateRange::from_days(tz.offset(), first, last)
}

/// ISO week (Monday..Sunday) containing the anchor date.
///
/// The anchor is a user-selected date string; when it is absent or unreadable
/// the week of `now` is used instead.
pub fn week_range(anchor: Option<&str>, now: DateTime<Utc>, tz: BusinessTimezone) -> Option<DateRange> {
    let date = anchor
        .and_then(|s| resolve_anchor_date(s, tz))
        .unwrap_or_else(|| {
            if let Some(raw) = anchor {
                tracing::debug!("week anchor '{}' is not a date, using current week", raw);
            }
            tz.today(now)
        });
    week_containing(date, tz)
}

/// `"Feb 26 - Mar 3, 2024"`
pub fn format_week_display(range: &DateRange) -> String {
    format!(
        "{} - {}",
        range.first_day().format("%b %-d"),
        range.last_day().format("%b %-d, %Y")
    )
}

/// `"2024-03"` → `(2024, 3)`
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.trim().split_once('-')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// Calendar date picked by the user. A bare `YYYY-MM-DD` is taken as-is,
/// a full timestamp is normalized into business time first.
pub fn resolve_anchor_date(raw: &str, tz: BusinessTimezone) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    lenient::parse_datetime(trimmed).map(|dt| tz.localize(&dt).date_naive())
}

fn month_window(year: i32, month: u32, tz: BusinessTimezone) -> Option<MonthWindow> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    // last day = day before the first of the next month
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_first.pred_opt()?;
    Some(MonthWindow {
        range: DateRange::from_days(tz.offset(), first, last)?,
        year,
        month,
        month_name: month_name(month),
    })
}

fn week_containing(date: NaiveDate, tz: BusinessTimezone) -> Option<DateRange> {
    // 0 = Sunday .. 6 = Saturday; (dow + 6) % 7 is the distance back to Monday
    let dow = date.weekday().num_days_from_sunday();
    let back_to_monday = (dow + 6) % 7;
    let monday = date.checked_sub_days(Days::new(u64::from(back_to_monday)))?;
    let sunday = monday.checked_add_days(Days::new(6))?;
    DateRange::from_days(tz.offset(), monday, sunday)
}
