use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Calendar window relative to "now" for history queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterPeriod {
    Day,
    Month,
    Year,
}

impl FilterPeriod {
    /// Unrecognized values yield `None`, which callers treat as "no filter"
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Some(FilterPeriod::Day),
            "month" => Some(FilterPeriod::Month),
            "year" => Some(FilterPeriod::Year),
            _ => None,
        }
    }

    /// Whether `timestamp` falls in the same window as `now`, in the
    /// server's local time zone
    pub fn matches(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.matches_in(&Local, timestamp, now)
    }

    pub fn matches_in<Tz: TimeZone>(&self, tz: &Tz, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let ts = timestamp.with_timezone(tz);
        let now = now.with_timezone(tz);

        match self {
            FilterPeriod::Day => ts.date_naive() == now.date_naive(),
            FilterPeriod::Month => ts.year() == now.year() && ts.month() == now.month(),
            FilterPeriod::Year => ts.year() == now.year(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_known_periods_only() {
        assert_eq!(FilterPeriod::parse("day"), Some(FilterPeriod::Day));
        assert_eq!(FilterPeriod::parse("Month"), Some(FilterPeriod::Month));
        assert_eq!(FilterPeriod::parse("year"), Some(FilterPeriod::Year));
        assert_eq!(FilterPeriod::parse("week"), None);
        assert_eq!(FilterPeriod::parse(""), None);
    }

    #[test]
    fn day_excludes_yesterday_and_tomorrow() {
        let now = noon();
        assert!(FilterPeriod::Day.matches_in(&Utc, now - Duration::hours(11), now));
        assert!(!FilterPeriod::Day.matches_in(&Utc, now - Duration::days(1), now));
        assert!(!FilterPeriod::Day.matches_in(&Utc, now + Duration::days(1), now));
    }

    #[test]
    fn month_and_year_windows() {
        let now = noon();
        let last_month = Utc.with_ymd_and_hms(2024, 5, 31, 23, 0, 0).unwrap();
        let last_year = Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap();

        assert!(FilterPeriod::Month.matches_in(&Utc, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(), now));
        assert!(!FilterPeriod::Month.matches_in(&Utc, last_month, now));
        assert!(FilterPeriod::Year.matches_in(&Utc, last_month, now));
        assert!(!FilterPeriod::Year.matches_in(&Utc, last_year, now));
        assert!(!FilterPeriod::Month.matches_in(&Utc, last_year, now));
    }

    proptest! {
        #[test]
        fn day_implies_month_implies_year(offset_minutes in -1_000_000i64..1_000_000i64) {
            let now = noon();
            let ts = now + Duration::minutes(offset_minutes);
            if FilterPeriod::Day.matches_in(&Utc, ts, now) {
                prop_assert!(FilterPeriod::Month.matches_in(&Utc, ts, now));
            }
            if FilterPeriod::Month.matches_in(&Utc, ts, now) {
                prop_assert!(FilterPeriod::Year.matches_in(&Utc, ts, now));
            }
        }

        #[test]
        fn samples_a_full_day_away_never_match_day(days in 1i64..400) {
            let now = noon();
            prop_assert!(!FilterPeriod::Day.matches_in(&Utc, now - Duration::days(days), now));
            prop_assert!(!FilterPeriod::Day.matches_in(&Utc, now + Duration::days(days), now));
        }
    }
}
