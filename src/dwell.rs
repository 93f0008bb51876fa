//! Dwell-time calculation.
//!
//! A truck that arrives before a gated facility opens is not charged for the
//! wait until opening. "Open" schedules, and arrivals or departures that fall
//! outside the opening instant, fall back to raw elapsed time.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::record::LoadRecord;

pub const OPEN_SCHEDULE: &str = "Open";

/// Elapsed dock time for one stop.
///
/// Returns `depart - arrive` when the schedule is `"Open"`, when the truck
/// departs before the open time, or when it arrives after the open time.
/// Otherwise the open time lies within `[arrive, depart]` and the result is
/// `depart - schedule_open`.
///
/// Both boundary equalities take the schedule branch: `arrive == open` and
/// `depart == open` satisfy neither strict comparison.
pub fn dwell_time(
    depart: NaiveDateTime,
    arrive: NaiveDateTime,
    schedule_open: NaiveDateTime,
    schedule_type: &str,
) -> Duration {
    if schedule_type == OPEN_SCHEDULE || depart < schedule_open || arrive > schedule_open {
        depart - arrive
    } else {
        depart - schedule_open
    }
}

/// Null-aware variant over record fields. A null schedule type counts as
/// "not Open"; a null open time on a non-Open schedule yields null.
pub fn record_dwell_time(record: &LoadRecord) -> Option<Duration> {
    let depart = record.depart_date_time?;
    let arrive = record.arrive_date_time?;
    let is_open = record.schedule_type.as_deref() == Some(OPEN_SCHEDULE);

    if is_open {
        return Some(depart - arrive);
    }

    let open = record.schedule_open_time?;
    Some(dwell_time(depart, arrive, open, ""))
}

/// Converts to fractional hours via whole minutes truncated toward zero.
pub fn to_hours(duration: Duration) -> f64 {
    duration.num_minutes() as f64 / 60.0
}

/// Sets `dwell_time` (hours) on every record.
#[tracing::instrument(skip(records), fields(rows = records.len()))]
pub fn apply_dwell_time(mut records: Vec<LoadRecord>) -> Vec<LoadRecord> {
    for record in &mut records {
        record.dwell_time = record_dwell_time(record).map(to_hours);
    }
    let missing = records.iter().filter(|r| r.dwell_time.is_none()).count();
    debug!(missing, "Dwell time computed");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn hours(d: Duration) -> f64 {
        to_hours(d)
    }

    #[test]
    fn test_closed_schedule_early_arrival_counts_from_open() {
        // arrive 08:00, open 09:00, depart 10:30
        let d = dwell_time(at(10, 30), at(8, 0), at(9, 0), "Closed");
        assert_eq!(hours(d), 1.5);
    }

    #[test]
    fn test_open_and_closed_differ_for_early_arrival() {
        assert_eq!(hours(dwell_time(at(10, 30), at(7, 0), at(9, 0), "Open")), 3.5);
        assert_eq!(hours(dwell_time(at(10, 30), at(7, 0), at(9, 0), "Closed")), 1.5);
    }

    #[test]
    fn test_open_schedule_uses_raw_elapsed() {
        let d = dwell_time(at(10, 30), at(8, 0), at(9, 0), "Open");
        assert_eq!(hours(d), 2.5);
    }

    #[test]
    fn test_arrival_after_open_uses_raw_elapsed() {
        let d = dwell_time(at(12, 0), at(9, 30), at(9, 0), "Closed");
        assert_eq!(hours(d), 2.5);
    }

    #[test]
    fn test_departure_before_open_uses_raw_elapsed() {
        let d = dwell_time(at(8, 45), at(8, 0), at(9, 0), "Closed");
        assert_eq!(hours(d), 0.75);
    }

    #[test]
    fn test_arrive_equal_to_open_takes_schedule_branch() {
        // both branches give the same value; check the branch via the formula
        let d = dwell_time(at(11, 0), at(9, 0), at(9, 0), "Closed");
        assert_eq!(d, at(11, 0) - at(9, 0));
        assert_eq!(hours(d), 2.0);
    }

    #[test]
    fn test_depart_equal_to_open_takes_schedule_branch() {
        let d = dwell_time(at(9, 0), at(8, 0), at(9, 0), "Closed");
        assert_eq!(d, Duration::zero());
    }

    #[test]
    fn test_to_hours_truncates_to_whole_minutes() {
        assert_eq!(to_hours(Duration::minutes(90)), 1.5);
        assert_eq!(to_hours(Duration::seconds(90 * 60 + 59)), 1.5);
        assert_eq!(to_hours(Duration::seconds(59)), 0.0);
        assert_eq!(to_hours(Duration::minutes(360)), 6.0);
    }

    #[test]
    fn test_record_dwell_time_nulls() {
        let mut r = LoadRecord {
            arrive_date_time: Some(at(8, 0)),
            depart_date_time: Some(at(10, 30)),
            schedule_type: Some("Closed".to_string()),
            ..Default::default()
        };
        assert_eq!(record_dwell_time(&r), None);

        r.schedule_type = Some("Open".to_string());
        assert_eq!(record_dwell_time(&r), Some(Duration::minutes(150)));

        r.schedule_type = None;
        r.schedule_open_time = Some(at(9, 0));
        assert_eq!(record_dwell_time(&r), Some(Duration::minutes(90)));

        r.depart_date_time = None;
        assert_eq!(record_dwell_time(&r), None);
    }

    #[test]
    fn test_apply_dwell_time_sets_hours() {
        let r = LoadRecord {
            arrive_date_time: Some(at(7, 0)),
            depart_date_time: Some(at(10, 30)),
            schedule_open_time: Some(at(9, 0)),
            schedule_type: Some("Closed".to_string()),
            ..Default::default()
        };
        let out = apply_dwell_time(vec![r]);
        assert_eq!(out[0].dwell_time, Some(1.5));
    }
}
