//! Per-year rollups of net revenue, overall and by channel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ChannelYearShare, SummaryRow, YearTotal};

/// Year of a normalized cycle identifier: its first four characters.
pub fn year_of(cycle: &str) -> String {
    cycle.chars().take(4).collect()
}

/// Net revenue summed by year.
pub fn year_totals(summary: &[SummaryRow]) -> Vec<YearTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in summary {
        *totals.entry(year_of(&row.cycle)).or_insert(0.0) += row.net_revenue;
    }

    totals
        .into_iter()
        .map(|(year, net_revenue)| YearTotal { year, net_revenue })
        .collect()
}

/// Net revenue by (year, channel) with each channel's percentage of the year.
pub fn channel_year_shares(summary: &[SummaryRow]) -> Vec<ChannelYearShare> {
    let mut by_channel: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut by_year: BTreeMap<String, f64> = BTreeMap::new();

    for row in summary {
        let year = year_of(&row.cycle);
        *by_year.entry(year.clone()).or_insert(0.0) += row.net_revenue;
        *by_channel.entry((year, row.channel.clone())).or_insert(0.0) += row.net_revenue;
    }

    by_channel
        .into_iter()
        .map(|((year, channel), net_revenue)| {
            let year_total = by_year.get(&year).copied().unwrap_or(0.0);
            ChannelYearShare {
                percentage: share(net_revenue, year_total),
                year,
                channel,
                net_revenue,
            }
        })
        .collect()
}

fn share(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let pct = part / total * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Both rollups together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRollup {
    pub year_totals: Vec<YearTotal>,
    pub channel_year_shares: Vec<ChannelYearShare>,
}

pub fn rollup(summary: &[SummaryRow]) -> YearRollup {
    YearRollup {
        year_totals: year_totals(summary),
        channel_year_shares: channel_year_shares(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(channel: &str, cycle: &str, net: f64) -> SummaryRow {
        SummaryRow {
            channel: channel.into(),
            category: "X".into(),
            cycle: cycle.into(),
            total_discount: 0.0,
            total_revenue: net,
            net_revenue: net,
            average_discount_percentage: 0.0,
            row_count: 1,
        }
    }

    #[test]
    fn test_year_of() {
        assert_eq!(year_of("202401"), "2024");
        assert_eq!(year_of("2024"), "2024");
        assert_eq!(year_of("24"), "24");
        assert_eq!(year_of(""), "");
    }

    #[test]
    fn test_year_totals() {
        let summary = vec![row("A", "202401", 10.0), row("B", "202402", 30.0), row("A", "202301", 5.0)];

        let totals = year_totals(&summary);
        assert_eq!(
            totals,
            vec![
                YearTotal { year: "2023".into(), net_revenue: 5.0 },
                YearTotal { year: "2024".into(), net_revenue: 40.0 },
            ]
        );
    }

    #[test]
    fn test_channel_shares_sum_to_hundred() {
        let summary = vec![
            row("A", "202401", 10.0),
            row("B", "202401", 30.0),
            row("A", "202402", 60.0),
            row("C", "202301", 5.0),
        ];

        let shares = channel_year_shares(&summary);
        let y2024: Vec<&ChannelYearShare> = shares.iter().filter(|s| s.year == "2024").collect();

        assert_eq!(y2024.len(), 2);
        assert_eq!(y2024[0].channel, "A");
        assert_eq!(y2024[0].net_revenue, 70.0);
        assert_eq!(y2024[0].percentage, 70.0);
        assert_eq!(y2024[1].percentage, 30.0);

        let total: f64 = y2024.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_year_total_gives_zero_share() {
        let summary = vec![row("A", "202401", 10.0), row("B", "202401", -10.0)];

        let shares = channel_year_shares(&summary);
        assert!(shares.iter().all(|s| s.percentage == 0.0));
    }
}
