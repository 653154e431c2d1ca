//! Calendar period indexing and record-set filtering.
//!
//! Periods come from `sent_at` read on the UTC calendar so reports ingested
//! from different uploads stay comparable. All operations here are pure:
//! each returns a fresh set, filters compose with AND semantics, and the
//! order filters are applied in does not change the result.

use std::{cmp::Ordering, collections::BTreeMap};

use chrono::Datelike;
use itertools::Itertools;

use crate::record::{CleanRecordSet, TransactionRecord};

/// Week-of-month values are clamped to this ceiling (days 22+ all fall in
/// week 4 on the dashboard).
pub const MAX_PERIOD_WEEK: u32 = 4;

/// Returns a copy of the set with `period_year`/`period_month`/`period_week`
/// filled from `sent_at`; rows without a send instant keep null fields.
pub fn annotate_periods(set: &CleanRecordSet) -> CleanRecordSet {
    let records = set
        .iter()
        .map(|record| {
            let mut annotated = record.clone();
            match record.sent_at {
                Some(sent_at) => {
                    annotated.period_year = Some(sent_at.year());
                    annotated.period_month = Some(sent_at.month());
                    annotated.period_week = Some(week_of_month(sent_at.day()));
                }
                None => {
                    annotated.period_year = None;
                    annotated.period_month = None;
                    annotated.period_week = None;
                }
            }
            annotated
        })
        .collect();
    CleanRecordSet::new(records, set.instants)
}

fn week_of_month(day: u32) -> u32 {
    (((day - 1) / 7) + 1).min(MAX_PERIOD_WEEK)
}

/// Keeps rows matching every supplied period predicate. Rows with null
/// period fields never match a non-null argument.
pub fn filter_by_period(
    set: &CleanRecordSet,
    year: Option<i32>,
    month: Option<u32>,
    week: Option<u32>,
) -> CleanRecordSet {
    set.retaining(|record| {
        year.is_none_or(|y| record.period_year == Some(y))
            && month.is_none_or(|m| record.period_month == Some(m))
            && week.is_none_or(|w| record.period_week == Some(w))
    })
}

/// Exact-match filter on template name; a no-op when absent.
pub fn filter_by_template(set: &CleanRecordSet, template: Option<&str>) -> CleanRecordSet {
    match template {
        Some(name) => set.retaining(|record| record.template_name == name),
        None => set.clone(),
    }
}

/// Distinct years and, per year, distinct months present in the set.
pub fn period_options(set: &CleanRecordSet) -> (Vec<i32>, BTreeMap<i32, Vec<u32>>) {
    let years: Vec<i32> = set
        .iter()
        .filter_map(|r| r.period_year)
        .sorted()
        .dedup()
        .collect();
    let mut months_by_year: BTreeMap<i32, Vec<u32>> = BTreeMap::new();
    for record in set.iter() {
        if let (Some(year), Some(month)) = (record.period_year, record.period_month) {
            let months = months_by_year.entry(year).or_default();
            if !months.contains(&month) {
                months.push(month);
            }
        }
    }
    for months in months_by_year.values_mut() {
        months.sort_unstable();
    }
    (years, months_by_year)
}

/// Sorted distinct non-empty template names.
pub fn template_options(set: &CleanRecordSet) -> Vec<String> {
    set.iter()
        .map(|r| r.template_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .sorted()
        .dedup()
        .collect()
}

/// Most recent messages by send instant, descending, nulls last.
pub fn recent_messages(set: &CleanRecordSet, limit: usize) -> Vec<TransactionRecord> {
    let mut records: Vec<TransactionRecord> = set.records.clone();
    records.sort_by(|a, b| match (&a.sent_at, &b.sent_at) {
        (Some(left), Some(right)) => right.cmp(left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    records.truncate(limit);
    records
}
