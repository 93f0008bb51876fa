//! Final feature selection and the two encodings of it.
//!
//! Both encoders read the same aggregated frame and neither mutates it.
//! Rows with a null anywhere in the selection are dropped, never imputed.

use polars::prelude::*;
use tracing::{debug, info};

use crate::frame::{DAY_INDEX, DAY_OF_WEEK, DWELL_TIME};

/// Name of the target column split out by the one-hot encoder.
pub const TARGET_COLUMN: &str = DWELL_TIME;

/// Selected feature columns in export order.
pub const FEATURE_COLUMNS: &[&str] = &[
    "Miles",
    "MilesToNextStop",
    "ClusterId",
    "ArriveTimeUpdateType",
    "BounceCount",
    "TotalPallets",
    "TotalWeight",
    "Hot",
    "DnBIndustry",
    "ScheduleType",
    "EquipmentType",
    "EquipmentLength",
    "LoadStopType",
    "LoadStopSequence",
    "WorkType",
    "OnTime",
    "DayOfWeek",
    "HourOfDay",
    "PeakHour",
    "facility_traffic",
    "driver_exp",
    "driver_complexity",
    "facility_complexity",
    "avg_dt",
    "median_dt",
    "min_dt",
    "max_dt",
    "std_dt",
];

/// Columns the one-hot encoder expands into indicators. `ClusterId` is an
/// identifier, so it is expanded like the text columns.
pub const ONE_HOT_CATEGORICAL: &[&str] = &[
    "ClusterId",
    "ArriveTimeUpdateType",
    "DnBIndustry",
    "ScheduleType",
    "EquipmentType",
    "LoadStopType",
    "WorkType",
    "DayOfWeek",
];

/// Columns the numeric encoder replaces with first-appearance codes.
const FACTORIZED: &[&str] = &["ClusterId", "DnBIndustry", "ScheduleType", "WorkType"];

const CODE: &str = "__code";
const ROW_INDEX: &str = "__row";

/// One-hot feature matrix plus the single-column `DwellTime` target.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoded {
    pub features: DataFrame,
    pub target: DataFrame,
}

/// 1.0 where `column` equals `level`, else 0.0.
fn indicator(column: &str, level: &str) -> Expr {
    when(col(column).eq(lit(level)))
        .then(lit(1.0))
        .otherwise(lit(0.0))
}

/// [`FEATURE_COLUMNS`] with `day` standing in for `DayOfWeek`, plus `extra`,
/// keeping only rows without a null.
fn select_complete(aggregated: &DataFrame, day: Expr, extra: &[&str]) -> PolarsResult<DataFrame> {
    let exprs: Vec<Expr> = FEATURE_COLUMNS
        .iter()
        .map(|&c| if c == DAY_OF_WEEK { day.clone() } else { col(c) })
        .chain(extra.iter().map(|&c| col(c)))
        .collect();
    aggregated
        .clone()
        .lazy()
        .select(exprs)
        .collect()?
        .drop_nulls::<String>(None)
}

/// Distinct values of a string column in ascending order.
fn levels(frame: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
    let unique = frame
        .clone()
        .lazy()
        .select([col(column).unique().sort(SortOptions::default())])
        .collect()?;
    let levels = unique
        .column(column)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok(levels)
}

/// Codes for `column` in order of first appearance, as a float column of
/// the same name.
pub fn factorize(frame: &DataFrame, column: &str) -> PolarsResult<Column> {
    let uniques = frame
        .clone()
        .lazy()
        .select([col(column).unique_stable()])
        .with_row_index(CODE, None);
    let coded = frame
        .clone()
        .lazy()
        .select([col(column)])
        .with_row_index(ROW_INDEX, None)
        .join(
            uniques,
            [col(column)],
            [col(column)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([ROW_INDEX], SortMultipleOptions::default())
        .select([col(CODE).cast(DataType::Float64).alias(column)])
        .collect()?;
    Ok(coded.column(column)?.clone())
}

/// Expands every categorical column into one indicator column per observed
/// value (sorted, named `<Column>_<value>`) after the numeric columns, and
/// splits the dwell time out as the target.
#[tracing::instrument(skip(aggregated), fields(rows_in = aggregated.height()))]
pub fn encode_one_hot(aggregated: &DataFrame) -> PolarsResult<OneHotEncoded> {
    let selected = select_complete(aggregated, col(DAY_OF_WEEK), &[TARGET_COLUMN])?;

    let mut exprs: Vec<Expr> = FEATURE_COLUMNS
        .iter()
        .filter(|c| !ONE_HOT_CATEGORICAL.contains(*c))
        .map(|&c| col(c).cast(DataType::Float64))
        .collect();
    for &column in ONE_HOT_CATEGORICAL {
        let levels = levels(&selected, column)?;
        debug!(column, levels = levels.len(), "Expanding column");
        exprs.extend(
            levels
                .iter()
                .map(|level| indicator(column, level).alias(format!("{column}_{level}"))),
        );
    }

    let target = selected.select([TARGET_COLUMN])?;
    let features = selected.lazy().select(exprs).collect()?;

    let (rows, columns) = features.shape();
    info!(rows_out = rows, columns, "One-hot encoding done");
    Ok(OneHotEncoded { features, target })
}

/// Encodes [`FEATURE_COLUMNS`] as plain numbers: weekday as 0 (Mon) to 6
/// (Sun), binary indicators for stop type, arrival update type and
/// equipment type, and first-appearance codes for cluster, industry,
/// schedule type and work type. The code tables are discarded.
#[tracing::instrument(skip(aggregated), fields(rows_in = aggregated.height()))]
pub fn encode_numeric(aggregated: &DataFrame) -> PolarsResult<DataFrame> {
    let mut selected = select_complete(aggregated, col(DAY_INDEX).alias(DAY_OF_WEEK), &[])?;
    for &column in FACTORIZED {
        let codes = factorize(&selected, column)?;
        selected.with_column(codes)?;
    }

    let exprs: Vec<Expr> = FEATURE_COLUMNS
        .iter()
        .map(|&c| match c {
            "LoadStopType" => indicator(c, "Pick Up").alias(c),
            "ArriveTimeUpdateType" => indicator(c, "Automated").alias(c),
            "EquipmentType" => indicator(c, "R").alias(c),
            _ => col(c).cast(DataType::Float64),
        })
        .collect();
    let features = selected.lazy().select(exprs).collect()?;

    info!(rows_out = features.height(), "Numeric encoding done");
    Ok(features)
}
