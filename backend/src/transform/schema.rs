//! Column-name normalization and required-column resolution.

use crate::error::SchemaError;
use crate::models::{
    COL_CATEGORY, COL_CHANNEL, COL_CYCLE, FINANCIAL_COLUMNS, REQUIRED_COLUMNS,
};

/// Lower-case a header and strip surrounding whitespace (including a stray BOM).
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
}

/// Normalize every header, keeping positions.
pub fn normalize_headers(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_header(h)).collect()
}

/// Positions of the required columns within a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    pub channel: usize,
    pub category: usize,
    pub cycle: usize,
    /// Ordered like [`FINANCIAL_COLUMNS`].
    pub financials: [usize; 7],
}

/// Locate the required columns in a raw header row.
///
/// Headers are normalized first; when two headers normalize to the same
/// name the first one is used. Every missing column is reported at once.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnIndex, SchemaError> {
    let normalized = normalize_headers(headers);
    let position = |name: &str| normalized.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| position(col).is_none())
        .map(|col| col.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(SchemaError { missing });
    }

    let locate = |name: &str| {
        position(name).ok_or_else(|| SchemaError {
            missing: vec![name.to_string()],
        })
    };

    let mut financials = [0usize; 7];
    for (slot, name) in financials.iter_mut().zip(FINANCIAL_COLUMNS.iter()) {
        *slot = locate(name)?;
    }

    Ok(ColumnIndex {
        channel: locate(COL_CHANNEL)?,
        category: locate(COL_CATEGORY)?,
        cycle: locate(COL_CYCLE)?,
        financials,
    })
}
