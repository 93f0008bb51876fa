//! Group statistics joined back onto every record.
//!
//! Three passes run in order, each over the output of the previous one:
//! facility traffic per `(FacilityID, DayOfWeek, HourOfDay)`, carrier
//! experience and complexity per `CarrierID`, and facility complexity plus
//! the dwell-time distribution per `FacilityID`. Every join is inner: rows
//! with a null key, or whose group produced no summary, are dropped.
//! Summaries have one row per key, so a join never duplicates a row.

use polars::prelude::*;
use tracing::info;

use crate::frame::{CARRIER_ID, CUSTOMER_ID, DAY_OF_WEEK, DWELL_TIME, FACILITY_ID, HOUR_OF_DAY};

pub const FACILITY_TRAFFIC: &str = "facility_traffic";
pub const DRIVER_EXP: &str = "driver_exp";
pub const DRIVER_COMPLEXITY: &str = "driver_complexity";
pub const FACILITY_COMPLEXITY: &str = "facility_complexity";
pub const AVG_DT: &str = "avg_dt";
pub const MEDIAN_DT: &str = "median_dt";
pub const MIN_DT: &str = "min_dt";
pub const MAX_DT: &str = "max_dt";
/// Sample deviation; null for a single-record facility.
pub const STD_DT: &str = "std_dt";

const ROW_INDEX: &str = "__row";

fn traffic_keys() -> [Expr; 3] {
    [col(FACILITY_ID), col(DAY_OF_WEEK), col(HOUR_OF_DAY)]
}

/// Dwell-time count per `(FacilityID, DayOfWeek, HourOfDay)`.
pub fn facility_traffic(rows: LazyFrame) -> LazyFrame {
    rows.group_by(traffic_keys())
        .agg([col(DWELL_TIME).count().alias(FACILITY_TRAFFIC)])
}

/// Experience and customer variety per `CarrierID`.
pub fn carrier_stats(rows: LazyFrame) -> LazyFrame {
    rows.group_by([col(CARRIER_ID)]).agg([
        col(DWELL_TIME).count().alias(DRIVER_EXP),
        col(CUSTOMER_ID)
            .drop_nulls()
            .n_unique()
            .alias(DRIVER_COMPLEXITY),
    ])
}

/// Carrier variety and dwell-time distribution per `FacilityID`.
pub fn facility_stats(rows: LazyFrame) -> LazyFrame {
    rows.group_by([col(FACILITY_ID)]).agg([
        col(CARRIER_ID)
            .drop_nulls()
            .n_unique()
            .alias(FACILITY_COMPLEXITY),
        col(DWELL_TIME).mean().alias(AVG_DT),
        col(DWELL_TIME).median().alias(MEDIAN_DT),
        col(DWELL_TIME).min().alias(MIN_DT),
        col(DWELL_TIME).max().alias(MAX_DT),
        col(DWELL_TIME).std(1).alias(STD_DT),
    ])
}

/// Runs the traffic, carrier and facility joins in that order and restores
/// the input row order.
#[tracing::instrument(skip(frame), fields(rows_in = frame.height()))]
pub fn add_aggregates(frame: DataFrame) -> PolarsResult<DataFrame> {
    let rows_in = frame.height();

    let keyed = frame.lazy().with_row_index(ROW_INDEX, None).filter(
        col(FACILITY_ID)
            .is_not_null()
            .and(col(DAY_OF_WEEK).is_not_null())
            .and(col(HOUR_OF_DAY).is_not_null()),
    );
    let with_traffic = keyed
        .clone()
        .join(
            facility_traffic(keyed),
            traffic_keys(),
            traffic_keys(),
            JoinArgs::new(JoinType::Inner),
        )
        .filter(col(CARRIER_ID).is_not_null());

    let with_carrier = with_traffic.clone().join(
        carrier_stats(with_traffic),
        [col(CARRIER_ID)],
        [col(CARRIER_ID)],
        JoinArgs::new(JoinType::Inner),
    );

    let joined = with_carrier
        .clone()
        .join(
            facility_stats(with_carrier),
            [col(FACILITY_ID)],
            [col(FACILITY_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([ROW_INDEX], SortMultipleOptions::default())
        .collect()?
        .drop(ROW_INDEX)?;

    info!(rows_in, rows_out = joined.height(), "Aggregates joined");
    Ok(joined)
}
