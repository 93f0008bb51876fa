//! The load record and its mapping onto the fixed input schema.
//!
//! Every input column is nullable. Null cells deserialize to `None` and all
//! filters treat a comparison against `None` as false, so a record with a
//! null in a filtered column never survives that filter.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer};

/// Columns that every input file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "FacilityID",
    "CarrierID",
    "CustomerID",
    "ClusterId",
    "LoadDate",
    "ScheduleOpenTime",
    "ScheduleCloseTime",
    "ArriveDateTime",
    "DepartDateTime",
    "ScheduleType",
    "TotalPallets",
    "TotalWeight",
    "TrailerDropped",
    "BounceCount",
    "Miles",
    "MilesToNextStop",
    "EquipmentType",
    "EquipmentLength",
    "LoadStopType",
    "LoadStopSequence",
    "WorkType",
    "OnTime",
    "Hot",
    "DnBIndustry",
    "ArriveTimeUpdateType",
    "ClusterName",
];

/// One truck load/stop event.
///
/// The trailing `#[serde(skip)]` fields are derived by later stages and are
/// `None` straight out of the loader.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadRecord {
    #[serde(rename = "FacilityID", deserialize_with = "nullable::text")]
    pub facility_id: Option<String>,
    #[serde(rename = "CarrierID", deserialize_with = "nullable::text")]
    pub carrier_id: Option<String>,
    #[serde(rename = "CustomerID", deserialize_with = "nullable::text")]
    pub customer_id: Option<String>,
    #[serde(rename = "ClusterId", deserialize_with = "nullable::text")]
    pub cluster_id: Option<String>,

    #[serde(deserialize_with = "nullable::timestamp")]
    pub load_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "nullable::timestamp")]
    pub schedule_open_time: Option<NaiveDateTime>,
    #[serde(deserialize_with = "nullable::timestamp")]
    pub schedule_close_time: Option<NaiveDateTime>,
    #[serde(deserialize_with = "nullable::timestamp")]
    pub arrive_date_time: Option<NaiveDateTime>,
    #[serde(deserialize_with = "nullable::timestamp")]
    pub depart_date_time: Option<NaiveDateTime>,

    #[serde(deserialize_with = "nullable::text")]
    pub schedule_type: Option<String>,

    #[serde(deserialize_with = "nullable::number")]
    pub total_pallets: Option<f64>,
    #[serde(deserialize_with = "nullable::number")]
    pub total_weight: Option<f64>,
    #[serde(deserialize_with = "nullable::flag")]
    pub trailer_dropped: Option<bool>,
    #[serde(deserialize_with = "nullable::number")]
    pub bounce_count: Option<f64>,
    #[serde(deserialize_with = "nullable::number")]
    pub miles: Option<f64>,
    #[serde(deserialize_with = "nullable::number")]
    pub miles_to_next_stop: Option<f64>,
    #[serde(deserialize_with = "nullable::text")]
    pub equipment_type: Option<String>,
    #[serde(deserialize_with = "nullable::number")]
    pub equipment_length: Option<f64>,
    #[serde(deserialize_with = "nullable::text")]
    pub load_stop_type: Option<String>,
    #[serde(deserialize_with = "nullable::number")]
    pub load_stop_sequence: Option<f64>,
    #[serde(deserialize_with = "nullable::text")]
    pub work_type: Option<String>,
    #[serde(deserialize_with = "nullable::flag")]
    pub on_time: Option<bool>,
    #[serde(deserialize_with = "nullable::flag")]
    pub hot: Option<bool>,
    #[serde(rename = "DnBIndustry", deserialize_with = "nullable::text")]
    pub dnb_industry: Option<String>,
    #[serde(deserialize_with = "nullable::text")]
    pub arrive_time_update_type: Option<String>,
    #[serde(deserialize_with = "nullable::text")]
    pub cluster_name: Option<String>,

    // derived
    #[serde(skip)]
    pub dwell_time: Option<f64>,
    #[serde(skip)]
    pub day_of_week: Option<Weekday>,
    #[serde(skip)]
    pub hour_of_day: Option<u32>,
    #[serde(skip)]
    pub peak_hour: Option<u8>,
}

/// Text markers read as null, in addition to the empty cell.
const NULL_MARKERS: &[&str] = &["NA", "N/A", "NULL", "null", "NaN", "nan", "None", "NaT"];

pub fn is_null_marker(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NULL_MARKERS.contains(&trimmed)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a timestamp in any of the accepted layouts. Date-only values land
/// on midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "True" | "true" | "TRUE" | "1" | "1.0" | "Y" | "y" | "yes" | "Yes" => Some(true),
        "False" | "false" | "FALSE" | "0" | "0.0" | "N" | "n" | "no" | "No" => Some(false),
        _ => None,
    }
}

/// `deserialize_with` helpers for nullable cells.
mod nullable {
    use super::*;
    use serde::de::Error;

    fn cell<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.filter(|s| !is_null_marker(s)))
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        cell(d)
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        cell(d)?
            .map(|s| {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("invalid number '{s}'")))
            })
            .transpose()
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        cell(d)?
            .map(|s| {
                parse_flag(&s).ok_or_else(|| D::Error::custom(format!("invalid boolean '{s}'")))
            })
            .transpose()
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        cell(d)?
            .map(|s| {
                parse_timestamp(&s)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{s}'")))
            })
            .transpose()
    }
}
