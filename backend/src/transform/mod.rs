//! Transformation module.
//!
//! This module turns a raw CSV table into the promotion summary:
//! - Schema: header normalization and required-column lookup
//! - Enrich: typed records, null filling, derived metrics
//! - Grouper: per (channel, category, cycle) aggregation
//! - Rollup: per-year totals and channel shares
//! - Pipeline: orchestration of the steps above

pub mod enrich;
pub mod grouper;
pub mod pipeline;
pub mod rollup;
pub mod schema;

pub use enrich::{discount_percentage, enrich, extract_records, fill_financial_nulls, normalize_cycle};
pub use grouper::aggregate;
pub use pipeline::*;
pub use rollup::{channel_year_shares, rollup, year_of, year_totals, YearRollup};
pub use schema::{normalize_header, resolve_columns, ColumnIndex};
