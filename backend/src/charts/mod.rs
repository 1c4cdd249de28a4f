//! Chart series derived from a summary.
//!
//! The series are computed from the summary table (not the raw rows), the
//! way the dashboards group it before plotting. Rendering is left to the
//! front-end; this module only produces labelled points.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::SummaryRow;
use crate::transform::pipeline::Summary;

/// How the front-end should draw a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    GroupedBar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

impl Chart {
    fn single(id: &str, title: &str, kind: ChartKind, x_label: &str, y_label: &str, points: Vec<ChartPoint>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: vec![ChartSeries {
                name: y_label.to_string(),
                points,
            }],
        }
    }
}

enum Reduce {
    Sum,
    Mean,
}

fn group_points<'a>(
    rows: &'a [SummaryRow],
    key: impl Fn(&'a SummaryRow) -> &'a str,
    value: impl Fn(&SummaryRow) -> f64,
    reduce: Reduce,
) -> Vec<ChartPoint> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry(key(row)).or_insert((0.0, 0));
        entry.0 += value(row);
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(label, (sum, count))| ChartPoint {
            label: label.to_string(),
            value: match reduce {
                Reduce::Sum => sum,
                Reduce::Mean => sum / count as f64,
            },
        })
        .collect()
}

/// Total revenue summed by channel.
pub fn revenue_by_channel(rows: &[SummaryRow]) -> Chart {
    Chart::single(
        "receita_por_canal",
        "Receita Total por Canal",
        ChartKind::Bar,
        "Canal",
        "Receita Total",
        group_points(rows, |r| r.channel.as_str(), |r| r.total_revenue, Reduce::Sum),
    )
}

/// Mean of the per-group average discount, by category.
pub fn discount_by_category(rows: &[SummaryRow]) -> Chart {
    Chart::single(
        "desconto_por_categoria",
        "Percentual Médio de Desconto por Categoria",
        ChartKind::Bar,
        "Categoria",
        "Percentual Médio de Desconto",
        group_points(rows, |r| r.category.as_str(), |r| r.average_discount_percentage, Reduce::Mean),
    )
}

/// Net revenue summed by cycle.
pub fn net_revenue_by_cycle(rows: &[SummaryRow]) -> Chart {
    Chart::single(
        "receita_liquida_por_ciclo",
        "Receita Líquida por Ciclo",
        ChartKind::Line,
        "Ciclo",
        "Receita Líquida",
        group_points(rows, |r| r.cycle.as_str(), |r| r.net_revenue, Reduce::Sum),
    )
}

/// Net revenue by year, from the year totals.
pub fn net_revenue_by_year(summary: &Summary) -> Chart {
    let points = summary
        .year_totals
        .iter()
        .map(|y| ChartPoint {
            label: y.year.clone(),
            value: y.net_revenue,
        })
        .collect();

    Chart::single(
        "receita_liquida_por_ano",
        "Receita Líquida por Ano",
        ChartKind::Bar,
        "Ano",
        "Receita Líquida",
        points,
    )
}

/// One series per channel, x = year, y = the channel's share of that year.
pub fn share_by_channel_and_year(summary: &Summary) -> Chart {
    let mut by_channel: BTreeMap<&str, Vec<ChartPoint>> = BTreeMap::new();
    for share in &summary.channel_year_shares {
        by_channel.entry(share.channel.as_str()).or_default().push(ChartPoint {
            label: share.year.clone(),
            value: share.percentage,
        });
    }

    Chart {
        id: "percentual_canal_ano".to_string(),
        title: "Percentual de Vendas por Canal e Ano".to_string(),
        kind: ChartKind::GroupedBar,
        x_label: "Ano".to_string(),
        y_label: "Percentual (%)".to_string(),
        series: by_channel
            .into_iter()
            .map(|(name, points)| ChartSeries {
                name: name.to_string(),
                points,
            })
            .collect(),
    }
}

/// Every chart the dashboard shows for this summary.
pub fn build_charts(summary: &Summary) -> Vec<Chart> {
    let mut charts = vec![
        revenue_by_channel(&summary.rows),
        discount_by_category(&summary.rows),
        net_revenue_by_cycle(&summary.rows),
    ];

    if summary.variant.is_extended() {
        charts.push(net_revenue_by_year(summary));
        charts.push(share_by_channel_and_year(summary));
    }

    charts
}
