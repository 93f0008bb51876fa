//! Record filters applied before and after dwell-time derivation.

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info};

use crate::record::LoadRecord;

pub const MAX_ARRIVAL_AGE_DAYS: i64 = 15;
pub const MAX_PALLETS: f64 = 80.0;
pub const MAX_WEIGHT: f64 = 50_000.0;
pub const MAX_DWELL_HOURS: f64 = 6.0;

/// Cluster names excluded as non-contiguous regions.
pub const EXCLUDED_REGIONS: &[&str] = &["HI Region", "AK Region"];

/// How the post-load cleaner treats Hawaii and Alaska records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionFilter {
    /// Drop records whose cluster is any of [`EXCLUDED_REGIONS`].
    #[default]
    ExcludeRemote,
    /// Keep every record. Matches the historical exports, whose region
    /// condition could never be false.
    LegacyTautology,
}

impl RegionFilter {
    pub fn keeps(self, cluster_name: Option<&str>) -> bool {
        match self {
            RegionFilter::LegacyTautology => true,
            RegionFilter::ExcludeRemote => {
                !cluster_name.is_some_and(|name| EXCLUDED_REGIONS.contains(&name))
            }
        }
    }
}

fn arrival_is_recent(r: &LoadRecord) -> bool {
    match (r.load_date, r.arrive_date_time) {
        (Some(load), Some(arrive)) => load - arrive <= Duration::days(MAX_ARRIVAL_AGE_DAYS),
        _ => false,
    }
}

fn in_bounds(value: Option<f64>, max: f64) -> bool {
    value.is_some_and(|v| v > 0.0 && v <= max)
}

fn fill_bounce_count(records: &mut [LoadRecord]) {
    for r in records {
        if r.bounce_count.is_none() {
            r.bounce_count = Some(0.0);
        }
    }
}

/// Drops stale arrivals, out-of-range pallets and weights, and dropped
/// trailers, then fills missing bounce counts with zero.
#[tracing::instrument(skip(records), fields(rows_in = records.len()))]
pub fn clean_preload(records: Vec<LoadRecord>) -> Vec<LoadRecord> {
    let rows_in = records.len();
    let mut kept: Vec<LoadRecord> = records
        .into_iter()
        .filter(arrival_is_recent)
        .filter(|r| in_bounds(r.total_pallets, MAX_PALLETS))
        .filter(|r| in_bounds(r.total_weight, MAX_WEIGHT))
        .filter(|r| r.trailer_dropped == Some(false))
        .collect();
    fill_bounce_count(&mut kept);

    debug!(rows_in, rows_out = kept.len(), "Pre-load clean done");
    kept
}

/// Keeps `0 < DwellTime <= 6` hours, refills bounce counts, and applies the
/// region filter.
#[tracing::instrument(skip(records), fields(rows_in = records.len()))]
pub fn clean_postload(records: Vec<LoadRecord>, regions: RegionFilter) -> Vec<LoadRecord> {
    let rows_in = records.len();
    let mut kept: Vec<LoadRecord> = records
        .into_iter()
        .filter(|r| in_bounds(r.dwell_time, MAX_DWELL_HOURS))
        .collect();
    fill_bounce_count(&mut kept);

    let before_regions = kept.len();
    kept.retain(|r| regions.keeps(r.cluster_name.as_deref()));

    info!(
        rows_in,
        rows_out = kept.len(),
        region_dropped = before_regions - kept.len(),
        "Post-load clean done"
    );
    kept
}
