//! REST API types for the dashboard front-end.
//!
//! Summary rows keep the dashboard column names; envelope fields are
//! camelCase like the rest of the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::charts::Chart;
use crate::models::{ChannelYearShare, SummaryRow, Variant, YearTotal};
use crate::transform::pipeline::format_delimiter;
use crate::session::Session;

/// Response sent after an upload, and by `/api/summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub job_id: String,

    /// Always "ready"; errors use [`error_response`]
    pub status: String,

    pub file_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,

    pub summary: Vec<SummaryRow>,
    pub year_totals: Vec<YearTotal>,
    pub channel_year_shares: Vec<ChannelYearShare>,

    pub metadata: ResponseMetadata,
}

/// Metadata about the run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub variant: Variant,
    pub group_count: usize,
    pub totals: Totals,
    pub csv_info: CsvMetadata,
}

/// Grand totals across all groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_discount: f64,
    pub total_revenue: f64,
    pub net_revenue: f64,
}

impl Totals {
    pub fn from_rows(rows: &[SummaryRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, r| Self {
            total_discount: acc.total_discount + r.total_discount,
            total_revenue: acc.total_revenue + r.total_revenue,
            net_revenue: acc.net_revenue + r.net_revenue,
        })
    }
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// Response of `/api/charts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartsResponse {
    pub job_id: String,
    pub status: String,
    pub charts: Vec<Chart>,
}

impl From<&Session> for UploadResponse {
    fn from(session: &Session) -> Self {
        let summary = &session.result.summary;
        let csv_info = &session.result.csv_info;

        UploadResponse {
            job_id: session.job_id.clone(),
            status: "ready".to_string(),
            file_name: session.file_name.clone(),
            uploaded_at: session.uploaded_at,
            summary: summary.rows.clone(),
            year_totals: summary.year_totals.clone(),
            channel_year_shares: summary.channel_year_shares.clone(),
            metadata: ResponseMetadata {
                variant: summary.variant,
                group_count: summary.rows.len(),
                totals: Totals::from_rows(&summary.rows),
                csv_info: CsvMetadata {
                    encoding: csv_info.encoding.clone(),
                    delimiter: format_delimiter(csv_info.delimiter),
                    row_count: csv_info.row_count,
                    columns: csv_info.headers.clone(),
                },
            },
        }
    }
}

impl From<&Session> for ChartsResponse {
    fn from(session: &Session) -> Self {
        ChartsResponse {
            job_id: session.job_id.clone(),
            status: "ready".to_string(),
            charts: session.charts.clone(),
        }
    }
}

/// Create an error response
pub fn error_response(kind: &str, error: &str) -> Value {
    json!({
        "status": "error",
        "kind": kind,
        "error": error,
        "summary": [],
    })
}

/// Body returned before any file was uploaded.
pub fn waiting_response() -> Value {
    json!({
        "status": "waiting",
        "message": "Upload a CSV file to start the analysis.",
    })
}
