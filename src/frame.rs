//! Columnar view of the cleaned records.
//!
//! Aggregation and both encoders work on a polars [`DataFrame`] built here
//! once the per-record stages are done. Column names match the input headers,
//! plus the derived `DwellTime`, calendar columns and a `DayIndex` helper.

use chrono::Datelike;
use polars::prelude::*;

use crate::features::calendar::{day_index, day_label};
use crate::record::LoadRecord;

pub const FACILITY_ID: &str = "FacilityID";
pub const CARRIER_ID: &str = "CarrierID";
pub const CUSTOMER_ID: &str = "CustomerID";
pub const DWELL_TIME: &str = "DwellTime";
pub const DAY_OF_WEEK: &str = "DayOfWeek";
pub const HOUR_OF_DAY: &str = "HourOfDay";
pub const PEAK_HOUR: &str = "PeakHour";
/// Weekday of the arrival, 0 (Mon) to 6 (Sun).
pub const DAY_INDEX: &str = "DayIndex";

fn text(
    records: &[LoadRecord],
    name: &str,
    field: impl Fn(&LoadRecord) -> Option<&str>,
) -> Column {
    Column::new(name.into(), records.iter().map(field).collect::<Vec<_>>())
}

fn number(
    records: &[LoadRecord],
    name: &str,
    field: impl Fn(&LoadRecord) -> Option<f64>,
) -> Column {
    Column::new(name.into(), records.iter().map(field).collect::<Vec<_>>())
}

fn whole(
    records: &[LoadRecord],
    name: &str,
    field: impl Fn(&LoadRecord) -> Option<u32>,
) -> Column {
    Column::new(name.into(), records.iter().map(field).collect::<Vec<_>>())
}

fn flag(
    records: &[LoadRecord],
    name: &str,
    field: impl Fn(&LoadRecord) -> Option<bool>,
) -> Column {
    Column::new(name.into(), records.iter().map(field).collect::<Vec<_>>())
}

/// One row per record, in record order. Nulls stay null.
pub fn load_frame(records: &[LoadRecord]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        text(records, FACILITY_ID, |r| r.facility_id.as_deref()),
        text(records, CARRIER_ID, |r| r.carrier_id.as_deref()),
        text(records, CUSTOMER_ID, |r| r.customer_id.as_deref()),
        text(records, "ClusterId", |r| r.cluster_id.as_deref()),
        text(records, "ArriveTimeUpdateType", |r| r.arrive_time_update_type.as_deref()),
        text(records, "DnBIndustry", |r| r.dnb_industry.as_deref()),
        text(records, "ScheduleType", |r| r.schedule_type.as_deref()),
        text(records, "EquipmentType", |r| r.equipment_type.as_deref()),
        text(records, "LoadStopType", |r| r.load_stop_type.as_deref()),
        text(records, "WorkType", |r| r.work_type.as_deref()),
        number(records, "Miles", |r| r.miles),
        number(records, "MilesToNextStop", |r| r.miles_to_next_stop),
        number(records, "BounceCount", |r| r.bounce_count),
        number(records, "TotalPallets", |r| r.total_pallets),
        number(records, "TotalWeight", |r| r.total_weight),
        number(records, "EquipmentLength", |r| r.equipment_length),
        number(records, "LoadStopSequence", |r| r.load_stop_sequence),
        flag(records, "Hot", |r| r.hot),
        flag(records, "OnTime", |r| r.on_time),
        number(records, DWELL_TIME, |r| r.dwell_time),
        text(records, DAY_OF_WEEK, |r| r.day_of_week.map(day_label)),
        whole(records, HOUR_OF_DAY, |r| r.hour_of_day),
        whole(records, PEAK_HOUR, |r| r.peak_hour.map(u32::from)),
        whole(records, DAY_INDEX, |r| {
            r.arrive_date_time.map(|t| day_index(t.weekday()))
        }),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn test_load_frame_keeps_order_and_nulls() {
        let arrive = NaiveDate::from_ymd_opt(2019, 3, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let records = vec![
            LoadRecord {
                facility_id: Some("F1".to_string()),
                hot: Some(true),
                dwell_time: Some(1.5),
                arrive_date_time: Some(arrive),
                day_of_week: Some(Weekday::Wed),
                hour_of_day: Some(9),
                peak_hour: Some(1),
                ..Default::default()
            },
            LoadRecord::default(),
        ];

        let df = load_frame(&records).unwrap();
        assert_eq!(df.height(), 2);

        let facility = df.column(FACILITY_ID).unwrap().str().unwrap();
        assert_eq!(facility.get(0), Some("F1"));
        assert_eq!(facility.get(1), None);

        let day = df.column(DAY_OF_WEEK).unwrap().str().unwrap();
        assert_eq!(day.get(0), Some("Wed"));
        assert_eq!(df.column(DAY_INDEX).unwrap().u32().unwrap().get(0), Some(2));
        assert_eq!(df.column("Hot").unwrap().bool().unwrap().get(0), Some(true));
        assert_eq!(df.column(DWELL_TIME).unwrap().f64().unwrap().get(1), None);
    }

    #[test]
    fn test_load_frame_empty() {
        let df = load_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 24);
    }
}
