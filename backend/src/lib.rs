//! # Promoview - promotion performance summaries
//!
//! Promoview reads sales/promotion CSV exports and aggregates them per
//! channel, material category and commercial cycle, with optional per-year
//! rollups, for the promotion dashboards.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│   Summary   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (fill+group)│     │ (+ rollups) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use promoview::{summarize_csv, PipelineOptions};
//! use std::path::Path;
//!
//! let result = summarize_csv(Path::new("promocoes.csv"), PipelineOptions::default()).unwrap();
//! println!("{} groups", result.summary.rows.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Column names, records and summary rows
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Cleaning, aggregation, rollups and pipeline
//! - [`validation`] - Output schema validation
//! - [`charts`] - Chart series for the dashboards
//! - [`session`] - Latest upload held in memory
//! - [`config`] - Server settings
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Presentation data
pub mod charts;
pub mod session;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, ParseError, PipelineError, SchemaError, ServerError, ValidationError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ChannelYearShare,
    EnrichedRecord,
    RawFinancials,
    RawRecord,
    SummaryRow,
    Variant,
    YearTotal,
    REQUIRED_COLUMNS,
    SUMMARY_COLUMNS,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_csv_file_auto,
    parse_str,
    ParseResult,
    RawTable,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    summarize_bytes,
    summarize_csv,
    summarize_table,
    CsvInfo,
    PipelineOptions,
    PipelineResult,
    Summary,
};

// =============================================================================
// Re-exports - Validation, charts, session
// =============================================================================

pub use validation::{is_valid_summary_row, validate_output, validate_summary_row};

pub use charts::{build_charts, Chart, ChartKind};

pub use session::{Session, SessionStore};

pub use config::ServerConfig;

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{
    error_response,
    waiting_response,
    ChartsResponse,
    CsvMetadata,
    ResponseMetadata,
    UploadResponse,
};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
