//! Record extraction, null filling and derived metrics.
//!
//! The order matters: cells are extracted, every financial gap is filled
//! with `0`, and only then are `net_revenue` and `discount_percentage`
//! computed, so the arithmetic never sees a missing value.

use crate::error::ParseError;
use crate::models::{
    is_na, EnrichedRecord, RawFinancials, RawRecord, Variant, FINANCIAL_COLUMNS,
};
use crate::parser::RawTable;

use super::schema::ColumnIndex;

/// Strip thousands separators from a cycle identifier (`"2,024"` -> `"2024"`).
pub fn normalize_cycle(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != ',').collect()
}

/// Parse one financial cell. Missing markers yield `None`.
pub fn parse_financial(cell: &str, line: usize, column: &str) -> Result<Option<f64>, ParseError> {
    let cell = cell.trim();
    if is_na(cell) {
        return Ok(None);
    }

    let value: f64 = cell.parse().map_err(|_| {
        ParseError::new(line, "not a number")
            .with_column(column)
            .with_value(cell)
    })?;

    if !value.is_finite() {
        return Err(ParseError::new(line, "number is not finite")
            .with_column(column)
            .with_value(cell));
    }

    Ok(Some(value))
}

/// Read every row of `table` into a [`RawRecord`].
///
/// Rows with a missing channel, category or cycle are left out, since they
/// belong to no group. Fails on the first financial cell that is neither
/// missing nor numeric.
pub fn extract_records(
    table: &RawTable,
    columns: &ColumnIndex,
    variant: Variant,
) -> Result<Vec<RawRecord>, ParseError> {
    let mut records = Vec::with_capacity(table.len());

    for row in &table.rows {
        let channel = row.cell(columns.channel).trim();
        let category = row.cell(columns.category).trim();
        let raw_cycle = row.cell(columns.cycle).trim();

        if is_na(channel) || is_na(category) || is_na(raw_cycle) {
            continue;
        }

        let mut values = [None; 7];
        for (i, (slot, idx)) in values.iter_mut().zip(columns.financials).enumerate() {
            *slot = parse_financial(row.cell(idx), row.line, FINANCIAL_COLUMNS[i])?;
        }

        let cycle = if variant.is_extended() {
            normalize_cycle(raw_cycle)
        } else {
            raw_cycle.to_string()
        };

        records.push(RawRecord {
            channel: channel.to_string(),
            category: category.to_string(),
            cycle,
            financials: RawFinancials::from_values(values),
            line: row.line,
        });
    }

    Ok(records)
}

/// Replace every missing financial value with `0`.
pub fn fill_nulls(financials: &RawFinancials) -> RawFinancials {
    RawFinancials::from_values(financials.values().map(|v| Some(v.unwrap_or(0.0))))
}

/// [`fill_nulls`] over a whole batch; the input is left untouched.
pub fn fill_financial_nulls(records: &[RawRecord]) -> Vec<RawRecord> {
    records
        .iter()
        .map(|r| RawRecord {
            financials: fill_nulls(&r.financials),
            ..r.clone()
        })
        .collect()
}

/// `real_discount / rbv_table_total * 100`, or `0` when that is undefined.
pub fn discount_percentage(real_discount: f64, rbv_table_total: f64) -> f64 {
    if rbv_table_total == 0.0 {
        return 0.0;
    }
    let pct = real_discount / rbv_table_total * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Compute the derived metrics of a filled record.
pub fn enrich(record: &RawRecord) -> EnrichedRecord {
    // Filled upstream; a gap here still reads as 0.
    let f = fill_nulls(&record.financials);
    let real_discount = f.real_discount.unwrap_or(0.0);
    let rbv_table_total = f.rbv_table_total.unwrap_or(0.0);
    let rbv_real_total = f.rbv_real_total.unwrap_or(0.0);

    EnrichedRecord {
        channel: record.channel.clone(),
        category: record.category.clone(),
        cycle: record.cycle.clone(),
        real_discount,
        rbv_table_total,
        rbv_real_total,
        net_revenue: rbv_real_total - real_discount,
        discount_percentage: discount_percentage(real_discount, rbv_table_total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::schema::resolve_columns;

    const HEADER: &str = "cod_canal,des_categoria_material,cod_ciclo,vlr_desconto_real,\
        vlr_rbv_tabela_so_tt,vlr_rbv_real_so_tt,vlr_preco_base,vlr_preco_venda,\
        vlr_preco_tabela,vlr_desconto_real2";

    fn table(body: &str) -> RawTable {
        crate::parser::parse_str(&format!("{}\n{}", HEADER, body), ',').unwrap()
    }

    fn record(values: [Option<f64>; 7]) -> RawRecord {
        RawRecord {
            channel: "A".into(),
            category: "X".into(),
            cycle: "1".into(),
            financials: RawFinancials::from_values(values),
            line: 2,
        }
    }

    #[test]
    fn test_normalize_cycle() {
        assert_eq!(normalize_cycle("2,024"), "2024");
        assert_eq!(normalize_cycle(" 202,401 "), "202401");
        assert_eq!(normalize_cycle("202401"), "202401");
    }

    #[test]
    fn test_parse_financial() {
        assert_eq!(parse_financial(" 12.5 ", 2, "vlr_preco_base"), Ok(Some(12.5)));
        assert_eq!(parse_financial("", 2, "vlr_preco_base"), Ok(None));
        assert_eq!(parse_financial("NaN", 2, "vlr_preco_base"), Ok(None));
        assert_eq!(parse_financial("-3", 2, "vlr_preco_base"), Ok(Some(-3.0)));
    }

    #[test]
    fn test_parse_financial_rejects_text_and_infinity() {
        let err = parse_financial("abc", 7, "vlr_preco_venda").unwrap_err();
        assert_eq!(err.line, 7);
        assert_eq!(err.column.as_deref(), Some("vlr_preco_venda"));
        assert_eq!(err.value.as_deref(), Some("abc"));

        assert!(parse_financial("inf", 2, "vlr_preco_venda").is_err());
    }

    #[test]
    fn test_extract_records_extended_normalizes_cycle() {
        let t = table("A,X,\"2,024\",10,200,100,,,,");
        let columns = resolve_columns(&t.headers).unwrap();

        let records = extract_records(&t, &columns, Variant::Extended).unwrap();
        assert_eq!(records[0].cycle, "2024");
        assert_eq!(records[0].financials.real_discount, Some(10.0));
        assert_eq!(records[0].financials.base_price, None);

        let basic = extract_records(&t, &columns, Variant::Basic).unwrap();
        assert_eq!(basic[0].cycle, "2,024");
    }

    #[test]
    fn test_extract_records_short_row_is_missing() {
        let t = table("A,X,1,10");
        let columns = resolve_columns(&t.headers).unwrap();

        let records = extract_records(&t, &columns, Variant::Basic).unwrap();
        assert_eq!(records[0].financials.real_discount, Some(10.0));
        assert_eq!(records[0].financials.real_discount2, None);
    }

    #[test]
    fn test_extract_records_bad_number() {
        let t = table("A,X,1,10,200,100,0,0,0,0\nB,Y,1,1,2,abc,0,0,0,0");
        let columns = resolve_columns(&t.headers).unwrap();

        let err = extract_records(&t, &columns, Variant::Basic).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.column.as_deref(), Some("vlr_rbv_real_so_tt"));
    }

    #[test]
    fn test_extract_records_skips_missing_keys() {
        let t = table("A,X,202401,10,200,100,,,,\n,X,202401,5,50,50,,,,\nA, ,202401,5,50,50,,,,\nA,X,NA,5,50,50,,,,");
        let columns = resolve_columns(&t.headers).unwrap();

        let records = extract_records(&t, &columns, Variant::Extended).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 2);
    }

    #[test]
    fn test_fill_nulls_is_idempotent() {
        let records = vec![
            record([None, Some(2.0), None, None, Some(5.0), None, None]),
            record([Some(1.0); 7]),
        ];

        let once = fill_financial_nulls(&records);
        let twice = fill_financial_nulls(&once);

        assert_eq!(once, twice);
        assert!(once.iter().all(|r| r.financials.is_filled()));
        assert_eq!(once[0].financials.real_discount, Some(0.0));
        assert_eq!(once[0].financials.sale_price, Some(5.0));
        // input untouched
        assert_eq!(records[0].financials.real_discount, None);
    }

    #[test]
    fn test_discount_percentage_zero_denominator() {
        assert_eq!(discount_percentage(10.0, 200.0), 5.0);
        assert_eq!(discount_percentage(20.0, 0.0), 0.0);
        assert_eq!(discount_percentage(0.0, 0.0), 0.0);
        assert_eq!(discount_percentage(1.0, f64::MIN_POSITIVE / 4.0), 0.0);
    }

    #[test]
    fn test_enrich() {
        let r = record([Some(10.0), Some(200.0), Some(100.0), None, None, None, None]);
        let e = enrich(&r);

        assert_eq!(e.net_revenue, 90.0);
        assert_eq!(e.discount_percentage, 5.0);
    }

    #[test]
    fn test_enrich_all_missing_is_zero() {
        let e = enrich(&fill_financial_nulls(&[record([None; 7])])[0]);

        assert_eq!(e.discount_percentage, 0.0);
        assert_eq!(e.net_revenue, 0.0);
    }
}
