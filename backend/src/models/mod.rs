//! Domain models for the Promoview summary pipeline.
//!
//! - [`RawRecord`] - one transaction as read from the upload
//! - [`RawFinancials`] - the seven financial cells, possibly absent
//! - [`EnrichedRecord`] - a filled record plus derived metrics
//! - [`SummaryRow`] - one aggregate per (channel, category, cycle)
//! - [`YearTotal`] / [`ChannelYearShare`] - per-year rollups
//!
//! Serialized names follow the column names used by the dashboards
//! (`total_desconto`, `receita_liquida`, ...).

use serde::{Deserialize, Serialize};

// =============================================================================
// Column Names
// =============================================================================

pub const COL_CHANNEL: &str = "cod_canal";
pub const COL_CATEGORY: &str = "des_categoria_material";
pub const COL_CYCLE: &str = "cod_ciclo";

pub const COL_REAL_DISCOUNT: &str = "vlr_desconto_real";
pub const COL_RBV_TABLE_TOTAL: &str = "vlr_rbv_tabela_so_tt";
pub const COL_RBV_REAL_TOTAL: &str = "vlr_rbv_real_so_tt";
pub const COL_BASE_PRICE: &str = "vlr_preco_base";
pub const COL_SALE_PRICE: &str = "vlr_preco_venda";
pub const COL_TABLE_PRICE: &str = "vlr_preco_tabela";
pub const COL_REAL_DISCOUNT2: &str = "vlr_desconto_real2";

/// Grouping key columns, in key order.
pub const KEY_COLUMNS: [&str; 3] = [COL_CHANNEL, COL_CATEGORY, COL_CYCLE];

/// Financial columns, in the order of [`RawFinancials::from_values`].
pub const FINANCIAL_COLUMNS: [&str; 7] = [
    COL_REAL_DISCOUNT,
    COL_RBV_TABLE_TOTAL,
    COL_RBV_REAL_TOTAL,
    COL_BASE_PRICE,
    COL_SALE_PRICE,
    COL_TABLE_PRICE,
    COL_REAL_DISCOUNT2,
];

/// Every column an upload must carry after normalization.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_CHANNEL,
    COL_CATEGORY,
    COL_CYCLE,
    COL_REAL_DISCOUNT,
    COL_RBV_TABLE_TOTAL,
    COL_RBV_REAL_TOTAL,
    COL_BASE_PRICE,
    COL_SALE_PRICE,
    COL_TABLE_PRICE,
    COL_REAL_DISCOUNT2,
];

/// Summary table header as written to CSV.
pub const SUMMARY_COLUMNS: [&str; 7] = [
    COL_CHANNEL,
    COL_CATEGORY,
    COL_CYCLE,
    "total_desconto",
    "total_receita",
    "receita_liquida",
    "desconto_medio",
];

/// Cell contents treated as a missing value.
pub const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Whether a (trimmed) cell counts as missing.
pub fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

// =============================================================================
// Variant
// =============================================================================

/// Which flavour of the dashboard pipeline to run.
///
/// `Extended` adds cycle normalization and the per-year rollups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Basic,
    #[default]
    Extended,
}

impl Variant {
    pub fn is_extended(self) -> bool {
        matches!(self, Variant::Extended)
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Variant::Basic),
            "extended" => Ok(Variant::Extended),
            other => Err(format!("Unknown variant: {}", other)),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Financial cells of one transaction. `None` means the cell was missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFinancials {
    pub real_discount: Option<f64>,
    pub rbv_table_total: Option<f64>,
    pub rbv_real_total: Option<f64>,
    pub base_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub table_price: Option<f64>,
    pub real_discount2: Option<f64>,
}

impl RawFinancials {
    /// Build from values ordered like [`FINANCIAL_COLUMNS`].
    pub fn from_values(values: [Option<f64>; 7]) -> Self {
        let [real_discount, rbv_table_total, rbv_real_total, base_price, sale_price, table_price, real_discount2] =
            values;
        Self {
            real_discount,
            rbv_table_total,
            rbv_real_total,
            base_price,
            sale_price,
            table_price,
            real_discount2,
        }
    }

    /// Values ordered like [`FINANCIAL_COLUMNS`].
    pub fn values(&self) -> [Option<f64>; 7] {
        [
            self.real_discount,
            self.rbv_table_total,
            self.rbv_real_total,
            self.base_price,
            self.sale_price,
            self.table_price,
            self.real_discount2,
        ]
    }

    /// True once every cell holds a value.
    pub fn is_filled(&self) -> bool {
        self.values().iter().all(Option::is_some)
    }
}

/// One transaction row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub channel: String,
    pub category: String,
    pub cycle: String,
    pub financials: RawFinancials,
    /// 1-based line in the source file (header is line 1).
    pub line: usize,
}

/// A filled record with its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub channel: String,
    pub category: String,
    pub cycle: String,
    pub real_discount: f64,
    pub rbv_table_total: f64,
    pub rbv_real_total: f64,
    pub net_revenue: f64,
    pub discount_percentage: f64,
}

// =============================================================================
// Aggregates
// =============================================================================

/// One aggregate per distinct (channel, category, cycle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "cod_canal")]
    pub channel: String,
    #[serde(rename = "des_categoria_material")]
    pub category: String,
    #[serde(rename = "cod_ciclo")]
    pub cycle: String,
    #[serde(rename = "total_desconto")]
    pub total_discount: f64,
    #[serde(rename = "total_receita")]
    pub total_revenue: f64,
    #[serde(rename = "receita_liquida")]
    pub net_revenue: f64,
    #[serde(rename = "desconto_medio")]
    pub average_discount_percentage: f64,
    /// Number of transactions in the group.
    #[serde(rename = "linhas")]
    pub row_count: usize,
}

impl SummaryRow {
    /// Cells in [`SUMMARY_COLUMNS`] order.
    pub fn to_record(&self) -> [String; 7] {
        [
            self.channel.clone(),
            self.category.clone(),
            self.cycle.clone(),
            self.total_discount.to_string(),
            self.total_revenue.to_string(),
            self.net_revenue.to_string(),
            self.average_discount_percentage.to_string(),
        ]
    }
}

/// Net revenue summed over a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTotal {
    #[serde(rename = "ano")]
    pub year: String,
    #[serde(rename = "receita_liquida")]
    pub net_revenue: f64,
}

/// A channel's share of a year's net revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelYearShare {
    #[serde(rename = "ano")]
    pub year: String,
    #[serde(rename = "cod_canal")]
    pub channel: String,
    #[serde(rename = "receita_liquida")]
    pub net_revenue: f64,
    /// Percentage of the year's total (0 when the total is 0).
    #[serde(rename = "percentual")]
    pub percentage: f64,
}
