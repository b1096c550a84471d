//! Grouping of 3-hour forecast samples into per-day summaries.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{LocalResult, NaiveDate, TimeZone, Timelike};

use crate::model::{DailySummary, ForecastSample};

/// Local hours whose sample best represents the whole day.
pub const REPRESENTATIVE_HOURS: RangeInclusive<u32> = 11..=14;

/// Days skipped at the head of the sorted summaries.
pub const WINDOW_SKIP: usize = 1;

/// Maximum number of days returned by [`aggregate`].
pub const WINDOW_DAYS: usize = 5;

#[derive(Debug)]
struct DayAccumulator {
    temp_max: f64,
    temp_min: f64,
    icon: String,
    description: String,
    representative: bool,
}

impl DayAccumulator {
    fn from_sample(sample: &ForecastSample, representative: bool) -> Self {
        Self {
            temp_max: sample.temp_max,
            temp_min: sample.temp_min,
            icon: sample.icon.clone(),
            description: sample.description.clone(),
            representative,
        }
    }

    fn absorb(&mut self, sample: &ForecastSample, midday: bool) {
        // Only the first midday sample replaces the day's values.
        if midday && !self.representative {
            *self = Self::from_sample(sample, true);
            return;
        }
        self.temp_max = self.temp_max.max(sample.temp_max);
        self.temp_min = self.temp_min.min(sample.temp_min);
    }
}

/// Summarize every day other than `reference_date`, ascending by date.
///
/// Calendar days and hours are evaluated in `tz`.
pub fn summarize_days<Tz: TimeZone>(
    samples: &[ForecastSample],
    reference_date: NaiveDate,
    tz: &Tz,
) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for sample in samples {
        let local = match tz.timestamp_opt(sample.timestamp, 0) {
            LocalResult::Single(dt) => dt,
            _ => {
                tracing::debug!(timestamp = sample.timestamp, "skipping unmappable sample");
                continue;
            }
        };

        let date = local.date_naive();
        if date == reference_date {
            continue;
        }

        let midday = REPRESENTATIVE_HOURS.contains(&local.hour());
        days.entry(date)
            .and_modify(|acc| acc.absorb(sample, midday))
            .or_insert_with(|| DayAccumulator::from_sample(sample, midday));
    }

    days.into_iter()
        .map(|(date, acc)| DailySummary {
            date,
            temp_max: acc.temp_max,
            temp_min: acc.temp_min,
            icon: acc.icon,
            description: acc.description,
        })
        .collect()
}

/// Daily forecast strip: summaries after `reference_date`, windowed.
///
/// NOTE: the window starts at index 1, so the first day after the
/// reference date is dropped and at most five days remain. Whether
/// dropping that day is intended (partial day) or a bug is unresolved;
/// callers see the literal behavior.
pub fn aggregate<Tz: TimeZone>(
    samples: &[ForecastSample],
    reference_date: NaiveDate,
    tz: &Tz,
) -> Vec<DailySummary> {
    summarize_days(samples, reference_date, tz)
        .into_iter()
        .skip(WINDOW_SKIP)
        .take(WINDOW_DAYS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use std::collections::HashSet;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp()
    }

    fn sample(timestamp: i64, temp_max: f64, temp_min: f64, icon: &str, desc: &str) -> ForecastSample {
        ForecastSample {
            timestamp,
            temp_max,
            temp_min,
            icon: icon.to_string(),
            description: desc.to_string(),
        }
    }

    fn june(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    /// `days` consecutive days of 3-hour samples starting at `first_day`.
    fn three_hourly(first_day: u32, days: u32) -> Vec<ForecastSample> {
        let mut out = Vec::new();
        for d in first_day..first_day + days {
            for h in (0..24).step_by(3) {
                let t = f64::from(h);
                out.push(sample(ts(2024, 6, d, h), 20.0 + t, 10.0 + t, "03n", "clouds"));
            }
        }
        out
    }

    #[test]
    fn midday_scenario() {
        let samples = vec![
            sample(ts(2024, 6, 10, 0), 30.0, 1.0, "10n", "rain"),
            sample(ts(2024, 6, 10, 3), 30.0, 1.0, "10n", "rain"),
            sample(ts(2024, 6, 10, 6), 30.0, 1.0, "10n", "rain"),
            sample(ts(2024, 6, 11, 2), 20.0, 10.0, "02n", "few clouds"),
            sample(ts(2024, 6, 11, 11), 25.0, 15.0, "01d", "clear"),
            sample(ts(2024, 6, 11, 14), 28.0, 18.0, "02d", "few clouds"),
            sample(ts(2024, 6, 11, 23), 22.0, 12.0, "03n", "clouds"),
        ];

        let days = summarize_days(&samples, june(10), &Utc);

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.date_key(), "2024-06-11");
        assert_eq!(day.temp_max, 28.0);
        assert_eq!(day.temp_min, 12.0);
        assert_eq!(day.icon, "01d");
        assert_eq!(day.description, "clear");
    }

    #[test]
    fn aggregate_drops_first_day_after_today() {
        let samples = vec![
            sample(ts(2024, 6, 11, 2), 20.0, 10.0, "02n", "few clouds"),
            sample(ts(2024, 6, 11, 11), 25.0, 15.0, "01d", "clear"),
        ];

        assert!(aggregate(&samples, june(10), &Utc).is_empty());
    }

    #[test]
    fn aggregate_windows_to_five_days() {
        let samples = three_hourly(10, 8);

        let all = summarize_days(&samples, june(10), &Utc);
        assert_eq!(all.len(), 7);

        let window = aggregate(&samples, june(10), &Utc);
        let keys: Vec<String> = window.iter().map(DailySummary::date_key).collect();
        assert_eq!(
            keys,
            vec!["2024-06-12", "2024-06-13", "2024-06-14", "2024-06-15", "2024-06-16"]
        );
    }

    #[test]
    fn aggregate_returns_what_is_left_after_skip() {
        let samples = three_hourly(11, 3);
        let window = aggregate(&samples, june(10), &Utc);
        let keys: Vec<String> = window.iter().map(DailySummary::date_key).collect();
        assert_eq!(keys, vec!["2024-06-12", "2024-06-13"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(summarize_days(&[], june(10), &Utc).is_empty());
        assert!(aggregate(&[], june(10), &Utc).is_empty());
    }

    #[test]
    fn only_today_yields_empty_output() {
        let samples = three_hourly(10, 1);
        assert!(summarize_days(&samples, june(10), &Utc).is_empty());
    }

    #[test]
    fn keys_are_unique_and_exclude_today() {
        let samples = three_hourly(9, 7);
        let days = summarize_days(&samples, june(10), &Utc);

        let keys: HashSet<String> = days.iter().map(DailySummary::date_key).collect();
        assert_eq!(keys.len(), days.len());
        assert!(!keys.contains("2024-06-10"));
        // Days before the reference date are kept too.
        assert!(keys.contains("2024-06-09"));
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn later_midday_sample_only_widens_range() {
        let samples = vec![
            sample(ts(2024, 6, 11, 11), 25.0, 15.0, "01d", "clear"),
            sample(ts(2024, 6, 11, 12), 31.0, 5.0, "11d", "storm"),
        ];

        let days = summarize_days(&samples, june(10), &Utc);
        assert_eq!(days[0].icon, "01d");
        assert_eq!(days[0].description, "clear");
        assert_eq!(days[0].temp_max, 31.0);
        assert_eq!(days[0].temp_min, 5.0);
    }

    #[test]
    fn without_midday_first_sample_sets_icon() {
        let samples = vec![
            sample(ts(2024, 6, 11, 3), 18.0, 9.0, "04n", "overcast"),
            sample(ts(2024, 6, 11, 21), 19.0, 8.0, "01n", "clear"),
        ];

        let days = summarize_days(&samples, june(10), &Utc);
        assert_eq!(days[0].icon, "04n");
        assert_eq!(days[0].temp_max, 19.0);
        assert_eq!(days[0].temp_min, 8.0);
    }

    #[test]
    fn days_follow_the_given_timezone() {
        // 2024-06-11 01:00 UTC is still 2024-06-10 in UTC-3.
        let samples = vec![sample(ts(2024, 6, 11, 1), 20.0, 10.0, "01n", "clear")];
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();

        assert!(summarize_days(&samples, june(10), &sao_paulo).is_empty());
        assert_eq!(summarize_days(&samples, june(10), &Utc).len(), 1);
    }

    #[test]
    fn midday_window_uses_local_hour() {
        // 15:00 UTC is 12:00 in UTC-3, so it is representative there.
        let samples = vec![
            sample(ts(2024, 6, 11, 6), 15.0, 8.0, "04n", "overcast"),
            sample(ts(2024, 6, 11, 15), 22.0, 14.0, "01d", "clear"),
        ];
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();

        let local = summarize_days(&samples, june(10), &sao_paulo);
        assert_eq!(local[0].icon, "01d");
        assert_eq!(local[0].temp_min, 14.0);

        let utc = summarize_days(&samples, june(10), &Utc);
        assert_eq!(utc[0].icon, "04n");
        assert_eq!(utc[0].temp_min, 8.0);
    }
}
