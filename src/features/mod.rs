//! Derived per-record features.
//!
//! Calendar fields come straight from the arrival timestamp; the aggregated
//! fields are polars group statistics joined back onto every record.

pub mod aggregate;
pub mod calendar;
