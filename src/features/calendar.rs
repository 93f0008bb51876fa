//! Calendar features derived from the arrival timestamp.

use chrono::{Datelike, Timelike, Weekday};

use crate::record::LoadRecord;

pub const PEAK_START_HOUR: u32 = 6;
pub const PEAK_END_HOUR: u32 = 16;

/// Three-letter label, `Mon` through `Sun`.
pub fn day_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Weekday index with Monday as 0.
pub fn day_index(day: Weekday) -> u32 {
    day.num_days_from_monday()
}

/// 1 when `6 <= hour < 16`, else 0.
pub fn peak_hour(hour: u32) -> u8 {
    u8::from((PEAK_START_HOUR..PEAK_END_HOUR).contains(&hour))
}

/// Fills day-of-week, hour-of-day and peak-hour from `ArriveDateTime`.
/// A null arrival leaves all three null.
#[tracing::instrument(skip(records), fields(rows = records.len()))]
pub fn add_calendar_features(mut records: Vec<LoadRecord>) -> Vec<LoadRecord> {
    for r in &mut records {
        r.day_of_week = r.arrive_date_time.map(|t| t.weekday());
        r.hour_of_day = r.arrive_date_time.map(|t| t.hour());
        r.peak_hour = r.hour_of_day.map(peak_hour);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_peak_hour_boundaries() {
        assert_eq!(peak_hour(5), 0);
        assert_eq!(peak_hour(6), 1);
        assert_eq!(peak_hour(15), 1);
        assert_eq!(peak_hour(16), 0);
        assert_eq!(peak_hour(0), 0);
    }

    #[test]
    fn test_day_label_and_index() {
        assert_eq!(day_label(Weekday::Mon), "Mon");
        assert_eq!(day_label(Weekday::Sun), "Sun");
        assert_eq!(day_index(Weekday::Mon), 0);
        assert_eq!(day_index(Weekday::Sun), 6);
    }

    #[test]
    fn test_add_calendar_features() {
        // 2019-03-04 was a Monday
        let arrive = NaiveDate::from_ymd_opt(2019, 3, 4)
            .unwrap()
            .and_hms_opt(15, 59, 0)
            .unwrap();
        let records = vec![
            LoadRecord {
                arrive_date_time: Some(arrive),
                ..Default::default()
            },
            LoadRecord::default(),
        ];
        let out = add_calendar_features(records);

        assert_eq!(out[0].day_of_week, Some(Weekday::Mon));
        assert_eq!(out[0].hour_of_day, Some(15));
        assert_eq!(out[0].peak_hour, Some(1));

        assert_eq!(out[1].day_of_week, None);
        assert_eq!(out[1].hour_of_day, None);
        assert_eq!(out[1].peak_hour, None);
    }
}
