use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cleaned row of a provider delivery report.
///
/// Status fields are stored lowercased; `delivery_status` is the coalesced
/// canonical state (delivery_report_status when non-empty, else status).
/// Instants are stored as UTC; `None` marks an absent or unparsable source
/// timestamp, never a processing failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub campaign_id: String,
    pub msisdn: String,
    pub user: String,
    pub template_name: String,
    pub category: String,
    pub status: String,
    pub delivery_report_status: String,
    pub delivery_status: String,
    pub rate_value: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub period_year: Option<i32>,
    pub period_month: Option<u32>,
    pub period_week: Option<u32>,
}

/// Which of the four event-instant columns the source actually carried.
///
/// When a date column is missing from the upload the corresponding instant
/// column is not produced at all; consumers check these flags instead of
/// treating a column of nulls as evidence either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantColumns {
    pub created: bool,
    pub sent: bool,
    pub delivered: bool,
    pub read: bool,
}

/// Ordered, immutable set of cleaned records.
///
/// Order is ingestion order; aggregation does not depend on it, but
/// most-recent views do. Every transform returns a fresh set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecordSet {
    pub records: Vec<TransactionRecord>,
    pub instants: InstantColumns,
}

impl CleanRecordSet {
    pub fn new(records: Vec<TransactionRecord>, instants: InstantColumns) -> Self {
        Self { records, instants }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionRecord> {
        self.records.iter()
    }

    /// Fresh set containing only the records the predicate keeps.
    pub fn retaining<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&TransactionRecord) -> bool,
    {
        Self {
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
            instants: self.instants,
        }
    }
}
