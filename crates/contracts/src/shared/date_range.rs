use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::{Serialize, Serializer};

/// Calendar window with an inclusive end-of-day bound.
///
/// `start` is 00:00:00.000 of the first day and `end` is 23:59:59.999 of the
/// last day, both in the business offset. The only way to build one is from
/// calendar days, see [`DateRange::from_days`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(serialize_with = "rfc3339_millis")]
    start: DateTime<FixedOffset>,
    #[serde(serialize_with = "rfc3339_millis")]
    end: DateTime<FixedOffset>,
}

impl DateRange {
    /// Range covering `first..=last` whole days in `offset`.
    /// Returns `None` when `first` is after `last`.
    pub fn from_days(offset: FixedOffset, first: NaiveDate, last: NaiveDate) -> Option<Self> {
        if first > last {
            return None;
        }
        let start = offset
            .from_local_datetime(&first.and_time(NaiveTime::MIN))
            .single()?;
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
        let end = offset.from_local_datetime(&last.and_time(end_of_day)).single()?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Inclusive containment check, comparing instants.
    pub fn contains<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        let instant = instant.with_timezone(&self.start.timezone());
        instant >= self.start && instant <= self.end
    }
}

fn rfc3339_millis<S>(dt: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msk() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_from_days_bounds() {
        let first = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let range = DateRange::from_days(msk(), first, last).unwrap();

        assert_eq!(
            range.start().to_rfc3339_opts(chrono::SecondsFormat::Millis, false),
            "2024-02-01T00:00:00.000+03:00"
        );
        assert_eq!(
            range.end().to_rfc3339_opts(chrono::SecondsFormat::Millis, false),
            "2024-02-29T23:59:59.999+03:00"
        );
        assert_eq!(range.first_day(), first);
        assert_eq!(range.last_day(), last);
    }

    #[test]
    fn test_from_days_rejects_inverted() {
        let first = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(DateRange::from_days(msk(), first, last).is_none());
    }

    #[test]
    fn test_single_day_range_and_contains() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let range = DateRange::from_days(msk(), day, day).unwrap();
        assert!(range.start() <= range.end());

        // 2024-03-03 21:30 UTC is 2024-03-04 00:30 in UTC+3
        let outside = chrono::Utc.with_ymd_and_hms(2024, 3, 3, 21, 30, 0).unwrap();
        let inside = chrono::Utc.with_ymd_and_hms(2024, 3, 3, 20, 59, 59).unwrap();
        assert!(!range.contains(&outside));
        assert!(range.contains(&inside));
    }

    #[test]
    fn test_serializes_with_millis() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let range = DateRange::from_days(msk(), day, day).unwrap();
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json["start"], "2024-12-31T00:00:00.000+03:00");
        assert_eq!(json["end"], "2024-12-31T23:59:59.999+03:00");
    }
}
