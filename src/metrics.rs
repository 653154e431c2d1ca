//! Derived analytics over a clean record set.
//!
//! All aggregates are recomputed on demand and never persisted (the one
//! exception is the KPI snapshot embedded in a report's metadata record).
//!
//! The marketing gate is a provider business rule, not a bug: delivered,
//! read, and unread counts only consider rows in the marketing category,
//! while failed counts every row. The +12 shift applied to local hours
//! 1..=6 in the hourly histogram is likewise the provider's display
//! convention and is preserved exactly.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::{
    record::{CleanRecordSet, TransactionRecord},
    temporal,
};

/// Category whose rows participate in delivered/read/unread counts.
pub const GATED_CATEGORY: &str = "marketing";

const STATUS_SUCCEEDED: &str = "succeeded";
const STATUS_FAILED: &str = "failed";
const REPORT_READ: &str = "read";
const REPORT_UNREAD: &[&str] = &["delivered", "sent"];

/// Scalar campaign KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub total: usize,
    pub delivered: usize,
    pub failed: usize,
    pub read: usize,
    pub unread: usize,
    pub delivery_rate: f64,
    pub read_rate: f64,
    pub avg_rate: f64,
    pub total_cost: f64,
}

/// One labeled slice of the fixed status breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Per-category rollup, sorted descending by total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub total: usize,
    pub delivered: usize,
    pub rate_sum: f64,
}

/// One three-hour read-activity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyBucket {
    pub block: u32,
    pub read: usize,
    pub label: String,
}

fn is_gated_category(record: &TransactionRecord) -> bool {
    record.category.eq_ignore_ascii_case(GATED_CATEGORY)
}

fn is_delivered(record: &TransactionRecord) -> bool {
    record.status == STATUS_SUCCEEDED && is_gated_category(record)
}

fn is_read(record: &TransactionRecord) -> bool {
    record.delivery_report_status == REPORT_READ && is_gated_category(record)
}

fn is_unread(record: &TransactionRecord) -> bool {
    REPORT_UNREAD.contains(&record.delivery_report_status.as_str()) && is_gated_category(record)
}

/// Computes the scalar KPI set. Total functions: an empty set yields zero
/// counts and exactly `0.0` rates.
pub fn compute_kpis(set: &CleanRecordSet) -> KpiSet {
    let total = set.len();
    let delivered = set.iter().filter(|r| is_delivered(r)).count();
    let failed = set.iter().filter(|r| r.status == STATUS_FAILED).count();
    let read = set.iter().filter(|r| is_read(r)).count();
    let unread = set.iter().filter(|r| is_unread(r)).count();
    let total_cost: f64 = set.iter().map(|r| r.rate_value).sum();

    KpiSet {
        total,
        delivered,
        failed,
        read,
        unread,
        delivery_rate: rate(delivered, total),
        read_rate: rate(read, total),
        avg_rate: if total > 0 { total_cost / total as f64 } else { 0.0 },
        total_cost,
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total > 0 {
        count as f64 / total as f64
    } else {
        0.0
    }
}

/// The four gated/ungated counts as a fixed-order label table.
pub fn status_breakdown(set: &CleanRecordSet) -> Vec<StatusCount> {
    let kpis = compute_kpis(set);
    vec![
        StatusCount { status: "delivered".into(), count: kpis.delivered },
        StatusCount { status: "read".into(), count: kpis.read },
        StatusCount { status: "unread".into(), count: kpis.unread },
        StatusCount { status: "failed".into(), count: kpis.failed },
    ]
}

/// Groups rows by category, sorted descending by total; ties keep
/// first-seen order.
pub fn category_breakdown(set: &CleanRecordSet) -> Vec<CategoryAggregate> {
    let mut aggregates: Vec<CategoryAggregate> = Vec::new();
    for record in set.iter() {
        let position = aggregates
            .iter()
            .position(|agg| agg.category == record.category);
        let aggregate = match position {
            Some(idx) => &mut aggregates[idx],
            None => {
                aggregates.push(CategoryAggregate {
                    category: record.category.clone(),
                    total: 0,
                    delivered: 0,
                    rate_sum: 0.0,
                });
                aggregates.last_mut().expect("just pushed")
            }
        };
        aggregate.total += 1;
        if is_delivered(record) {
            aggregate.delivered += 1;
        }
        aggregate.rate_sum += record.rate_value;
    }
    // Stable sort keeps first-seen order for equal totals.
    aggregates.sort_by(|a, b| b.total.cmp(&a.total));
    aggregates
}

/// Eight zero-filled three-hour buckets of marketing read activity.
///
/// Hours come from `read_at` converted to the reporting zone; local hours
/// 1..=6 are shifted by +12 before bucketing (provider display convention).
pub fn hourly_activity(set: &CleanRecordSet) -> Vec<HourlyBucket> {
    let zone = temporal::reporting_zone();
    let mut counts = [0usize; 8];
    for record in set.iter().filter(|r| is_gated_category(r)) {
        let Some(read_at) = record.read_at else {
            continue;
        };
        let mut hour = read_at.with_timezone(&zone).hour();
        if (1..=6).contains(&hour) {
            hour += 12;
        }
        counts[(hour / 3) as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(idx, &read)| {
            let block = idx as u32 * 3;
            HourlyBucket {
                block,
                read,
                label: format!("{:02}:00 - {:02}:00", block, (block + 3).min(24)),
            }
        })
        .collect()
}
