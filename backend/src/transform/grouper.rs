//! Aggregate enriched transactions into summary rows.
//!
//! # Architecture
//!
//! ```text
//! Enriched records                       →  Summary rows
//! ┌─────────────────────────────────┐      ┌──────────────────────────────┐
//! │ A, X, 2024 | disc 10 | rbv 100  │      │ A, X, 2024                   │
//! │ A, X, 2024 | disc 20 | rbv  50  │  →   │ total_desconto 30, ...       │
//! │ B, Y, 2024 | disc  5 | rbv  80  │      ├──────────────────────────────┤
//! └─────────────────────────────────┘      │ B, Y, 2024                   │
//!                                          └──────────────────────────────┘
//! ```
//!
//! Rows come out in lexicographic `(channel, category, cycle)` order.

use std::collections::BTreeMap;

use crate::models::{EnrichedRecord, SummaryRow};

type GroupKey = (String, String, String);

/// Group by `(channel, category, cycle)`: sums for the money columns, mean
/// for the discount percentage.
pub fn aggregate(records: &[EnrichedRecord]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<GroupKey, GroupBuilder> = BTreeMap::new();

    for record in records {
        let key = (
            record.channel.clone(),
            record.category.clone(),
            record.cycle.clone(),
        );
        groups.entry(key).or_default().add(record);
    }

    groups
        .into_iter()
        .map(|(key, builder)| builder.build(key))
        .collect()
}

/// Running totals for one group.
#[derive(Default)]
struct GroupBuilder {
    total_discount: f64,
    total_revenue: f64,
    net_revenue: f64,
    discount_percentage_sum: f64,
    count: usize,
}

impl GroupBuilder {
    fn add(&mut self, record: &EnrichedRecord) {
        self.total_discount += record.real_discount;
        self.total_revenue += record.rbv_real_total;
        self.net_revenue += record.net_revenue;
        self.discount_percentage_sum += record.discount_percentage;
        self.count += 1;
    }

    fn build(self, (channel, category, cycle): GroupKey) -> SummaryRow {
        // A group exists only once a record was added.
        let average = if self.count == 0 {
            0.0
        } else {
            self.discount_percentage_sum / self.count as f64
        };

        SummaryRow {
            channel,
            category,
            cycle,
            total_discount: self.total_discount,
            total_revenue: self.total_revenue,
            net_revenue: self.net_revenue,
            average_discount_percentage: average,
            row_count: self.count,
        }
    }
}
