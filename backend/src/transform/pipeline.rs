//! High-level pipeline API: CSV upload to summary table.
//!
//! [`summarize_table`] is the pure core. [`summarize_bytes`] and
//! [`summarize_csv`] add reading, decoding and progress logs on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use promoview::transform::pipeline::{summarize_csv, PipelineOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = summarize_csv(Path::new("promocoes.csv"), PipelineOptions::default())?;
//!     println!("{} summary rows", result.summary.rows.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::enrich::{enrich, extract_records, fill_financial_nulls};
use super::grouper::aggregate;
use super::rollup::{rollup, YearRollup};
use super::schema::resolve_columns;
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::PipelineError;
use crate::models::{ChannelYearShare, SummaryRow, Variant, YearTotal};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult, RawTable};
use crate::validation::validate_output;

/// Options for the summary pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Basic or extended (cycle normalization + year rollups)
    #[serde(default)]
    pub variant: Variant,

    /// Skip output schema validation
    #[serde(default)]
    pub skip_validation: bool,
}

/// Aggregated output of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub variant: Variant,
    /// One row per (channel, category, cycle)
    pub rows: Vec<SummaryRow>,
    /// Empty in the basic variant
    pub year_totals: Vec<YearTotal>,
    /// Empty in the basic variant
    pub channel_year_shares: Vec<ChannelYearShare>,
}

/// CSV file information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub summary: Summary,
    pub csv_info: CsvInfo,
}

/// Run the pipeline over an already-parsed table.
///
/// Pure: the table is only read, and the same input always gives the same
/// output. Any error aborts the whole computation.
pub fn summarize_table(table: &RawTable, options: &PipelineOptions) -> Result<Summary, PipelineError> {
    let columns = resolve_columns(&table.headers)?;

    if table.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let raw = extract_records(table, &columns, options.variant)?;
    let filled = fill_financial_nulls(&raw);
    let enriched: Vec<_> = filled.iter().map(enrich).collect();
    let rows = aggregate(&enriched);

    let years = if options.variant.is_extended() {
        rollup(&rows)
    } else {
        YearRollup::default()
    };

    check_finite(&rows, &years)?;

    if !options.skip_validation {
        validate_output(&rows, &years)?;
    }

    Ok(Summary {
        variant: options.variant,
        rows,
        year_totals: years.year_totals,
        channel_year_shares: years.channel_year_shares,
    })
}

/// Inputs are finite, so a non-finite total can only come from overflow.
fn check_finite(rows: &[SummaryRow], years: &YearRollup) -> Result<(), PipelineError> {
    let overflow = |group: String| PipelineError::Overflow { group };

    for row in rows {
        let totals = [
            row.total_discount,
            row.total_revenue,
            row.net_revenue,
            row.average_discount_percentage,
        ];
        if totals.iter().any(|v| !v.is_finite()) {
            return Err(overflow(format!("{}/{}/{}", row.channel, row.category, row.cycle)));
        }
    }

    if let Some(total) = years.year_totals.iter().find(|t| !t.net_revenue.is_finite()) {
        return Err(overflow(total.year.clone()));
    }

    if let Some(share) = years
        .channel_year_shares
        .iter()
        .find(|s| !s.net_revenue.is_finite() || !s.percentage.is_finite())
    {
        return Err(overflow(format!("{}/{}", share.year, share.channel)));
    }

    Ok(())
}

/// Summarize a CSV file with encoding and delimiter auto-detection.
pub fn summarize_csv(path: &Path, options: PipelineOptions) -> Result<PipelineResult, PipelineError> {
    log_info(format!("📖 Reading {}", path.display()));
    let parse_result = parse_csv_file_auto(path).map_err(|e| {
        log_error(format!("Cannot read CSV: {}", e));
        e
    })?;
    summarize_parsed(parse_result, options)
}

/// Summarize raw CSV bytes (an upload body).
pub fn summarize_bytes(bytes: &[u8], options: PipelineOptions) -> Result<PipelineResult, PipelineError> {
    log_info(format!("📖 Reading upload ({} bytes)", bytes.len()));
    let parse_result = parse_bytes_auto(bytes).map_err(|e| {
        log_error(format!("Cannot read CSV: {}", e));
        e
    })?;
    summarize_parsed(parse_result, options)
}

fn summarize_parsed(parse_result: ParseResult, options: PipelineOptions) -> Result<PipelineResult, PipelineError> {
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parse_result.delimiter)));
    log_success(format!("Read {} rows", parse_result.table.len()));

    let csv_info = CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.table.headers.clone(),
        row_count: parse_result.table.len(),
    };

    log_info(format!("⚙️  Summarizing ({:?} variant)...", options.variant));
    let summary = summarize_table(&parse_result.table, &options).map_err(|e| {
        log_error(e.to_string());
        e
    })?;

    log_success(format!("{} summary rows", summary.rows.len()));
    if options.variant.is_extended() {
        log_success(format!(
            "{} years, {} channel/year shares",
            summary.year_totals.len(),
            summary.channel_year_shares.len()
        ));
    }
    if options.skip_validation {
        log_warning("(validation skipped)");
    } else {
        log_success("Output validated");
    }

    Ok(PipelineResult { summary, csv_info })
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
