use chrono::{Datelike, NaiveDate, Weekday};

/// Maximum number of days a single forecast request may cover.
///
/// Matches the horizon of the Open-Meteo forecast endpoint.
pub const MAX_FORECAST_DAYS: usize = 16;

/// Round to the nearest integer, with halves going toward positive infinity.
///
/// `f64::round` sends halves away from zero, which would turn `-2.5` into
/// `-3`; daily means and predictions use the half-up convention instead.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Label for the n-th day of a horizon (zero-based index).
pub fn day_label(index: usize) -> String {
    format!("day {}", index + 1)
}

/// Is the civil date a Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ============================================================================
// Date range
// ============================================================================

/// Closed calendar date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, returning `None` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Smallest range covering every date yielded by the iterator.
    pub fn covering(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        let mut iter = dates.into_iter();
        let first = iter.next()?;
        let (start, end) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }

    /// Number of calendar days in the range, both ends included.
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterate over every date in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(807.5), 808.0);
        assert_eq!(round_half_up(807.49), 807.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.51), -3.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(10.0), 10.0);
    }

    #[test]
    fn test_day_label() {
        assert_eq!(day_label(0), "day 1");
        assert_eq!(day_label(6), "day 7");
    }

    #[test]
    fn test_weekend_detection() {
        // 2024-05-04 was a Saturday
        assert!(is_weekend(date("2024-05-04")));
        assert!(is_weekend(date("2024-05-05")));
        assert!(!is_weekend(date("2024-05-06")));
    }

    #[test]
    fn test_date_range() {
        assert!(DateRange::new(date("2024-05-02"), date("2024-05-01")).is_none());

        let range = DateRange::covering([date("2024-05-03"), date("2024-05-01"), date("2024-05-07")])
            .unwrap();
        assert_eq!(range.start, date("2024-05-01"));
        assert_eq!(range.end, date("2024-05-07"));
        assert_eq!(range.num_days(), 7);
        assert_eq!(range.days().count(), 7);
        assert!(range.contains(date("2024-05-04")));
        assert!(!range.contains(date("2024-05-08")));
        assert!(DateRange::covering(Vec::<NaiveDate>::new()).is_none());
    }
}
