//! JSON Schema validation of pipeline output.
//!
//! Every summary row (and, in the extended variant, every rollup entry) is
//! serialized and checked against a schema embedded from `schemas/`:
//!
//! - `summary-row.json`
//! - `year-total.json`
//! - `channel-year-share.json`
//!
//! `serde_json` writes non-finite floats as `null`, so a metric that went
//! undefined fails the `"type": "number"` constraint.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use promoview::validation::is_valid_summary_row;
//!
//! let row = json!({
//!     "cod_canal": "A",
//!     "des_categoria_material": "X",
//!     "cod_ciclo": "202401",
//!     "total_desconto": 30.0,
//!     "total_receita": 150.0,
//!     "receita_liquida": 120.0,
//!     "desconto_medio": 2.5,
//!     "linhas": 2
//! });
//! assert!(is_valid_summary_row(&row));
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::SummaryRow;
use crate::transform::rollup::YearRollup;

static SUMMARY_ROW: Lazy<Result<Validator, String>> =
    Lazy::new(|| compile(include_str!("../../schemas/summary-row.json")));

static YEAR_TOTAL: Lazy<Result<Validator, String>> =
    Lazy::new(|| compile(include_str!("../../schemas/year-total.json")));

static CHANNEL_YEAR_SHARE: Lazy<Result<Validator, String>> =
    Lazy::new(|| compile(include_str!("../../schemas/channel-year-share.json")));

fn compile(source: &str) -> Result<Validator, String> {
    let schema: Value = serde_json::from_str(source).map_err(|e| e.to_string())?;
    jsonschema::draft7::new(&schema).map_err(|e| e.to_string())
}

/// Validate a JSON value against an arbitrary schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    collect_errors(&validator, data)
}

/// Quick check against an arbitrary schema.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    validate(schema, data).is_ok()
}

fn collect_errors(validator: &Validator, data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check(
    compiled: &Lazy<Result<Validator, String>>,
    data: &Value,
) -> Result<Result<(), Vec<String>>, ValidationError> {
    let validator = compiled
        .as_ref()
        .map_err(|e| ValidationError::InvalidSchema(e.clone()))?;
    Ok(collect_errors(validator, data))
}

/// Validate one serialized summary row.
pub fn validate_summary_row(data: &Value) -> Result<(), Vec<String>> {
    check(&SUMMARY_ROW, data).unwrap_or_else(|e| Err(vec![e.to_string()]))
}

/// Quick check against the summary row schema.
pub fn is_valid_summary_row(data: &Value) -> bool {
    validate_summary_row(data).is_ok()
}

fn check_all<T: Serialize>(
    compiled: &Lazy<Result<Validator, String>>,
    kind: &'static str,
    items: &[T],
) -> Result<(), ValidationError> {
    for (index, item) in items.iter().enumerate() {
        let value = serde_json::to_value(item)?;
        if let Err(errors) = check(compiled, &value)? {
            return Err(ValidationError::Row { kind, index, errors });
        }
    }
    Ok(())
}

/// Validate a whole summary plus its rollups. Stops at the first bad entry.
pub fn validate_output(rows: &[SummaryRow], rollup: &YearRollup) -> Result<(), ValidationError> {
    check_all(&SUMMARY_ROW, "Summary row", rows)?;
    check_all(&YEAR_TOTAL, "Year total", &rollup.year_totals)?;
    check_all(&CHANNEL_YEAR_SHARE, "Channel share", &rollup.channel_year_shares)?;
    Ok(())
}
