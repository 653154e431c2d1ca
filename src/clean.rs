//! Schema normalization and record construction.
//!
//! Canonicalizes header names, enforces the fixed required-column set (the
//! only hard-fail path past ingestion), then builds one
//! [`TransactionRecord`] per row: status coalescing, rate coercion, and the
//! four event-instant reconciliations. Row-level anomalies degrade to the
//! documented defaults instead of failing the file.

use log::{debug, warn};

use crate::{
    error::SchemaError,
    ingest::RawTable,
    record::{CleanRecordSet, InstantColumns, TransactionRecord},
    temporal,
};

pub const REQUIRED_COLUMNS: &[&str] = &[
    "transaction_id",
    "campaign_id",
    "msisdn",
    "status",
    "delivery_report_status",
    "rate",
    "category",
    "template_name",
    "user",
];

/// (date column, time column, event) triples the reconciler looks for.
const DATE_TIME_PAIRS: &[(&str, &str, Event)] = &[
    ("created_date", "created_time", Event::Created),
    ("sent_date", "sent_time", Event::Sent),
    ("delivery_report_date", "delivery_report_time", Event::Delivered),
    ("delivery_report_read_date", "delivery_report_read_time", Event::Read),
];

#[derive(Debug, Clone, Copy)]
enum Event {
    Created,
    Sent,
    Delivered,
    Read,
}

/// Trim, lowercase, internal spaces to underscores.
pub fn canonicalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Validates the required-column set and builds the clean record set.
pub fn normalize(raw: &RawTable) -> Result<CleanRecordSet, SchemaError> {
    let columns: Vec<String> = raw
        .columns
        .iter()
        .map(|name| canonicalize_column_name(name))
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError { missing });
    }

    let index_of = |name: &str| columns.iter().position(|c| c == name);
    let cell = |row: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
    };

    let transaction_id = index_of("transaction_id");
    let campaign_id = index_of("campaign_id");
    let msisdn = index_of("msisdn");
    let user = index_of("user");
    let template_name = index_of("template_name");
    let category = index_of("category");
    let status = index_of("status");
    let delivery_report_status = index_of("delivery_report_status");
    let rate = index_of("rate");

    let pairs: Vec<(Option<usize>, Option<usize>, Event)> = DATE_TIME_PAIRS
        .iter()
        .map(|(date_col, time_col, event)| (index_of(date_col), index_of(time_col), *event))
        .collect();

    let mut instants = InstantColumns::default();
    for (date_idx, _, event) in &pairs {
        if date_idx.is_some() {
            match event {
                Event::Created => instants.created = true,
                Event::Sent => instants.sent = true,
                Event::Delivered => instants.delivered = true,
                Event::Read => instants.read = true,
            }
        }
    }
    if !instants.sent {
        warn!("Source carries no sent_date column; period indexing will be empty");
    }

    let mut records = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let status_value = cell(row, status).to_lowercase();
        let delivery_report_value = cell(row, delivery_report_status).to_lowercase();
        let delivery_status = if delivery_report_value.is_empty() {
            &status_value
        } else {
            &delivery_report_value
        }
        .trim()
        .to_lowercase();

        let mut record = TransactionRecord {
            transaction_id: cell(row, transaction_id),
            campaign_id: cell(row, campaign_id),
            msisdn: cell(row, msisdn).trim().to_string(),
            user: cell(row, user),
            template_name: cell(row, template_name),
            category: cell(row, category).trim().to_string(),
            status: status_value,
            delivery_report_status: delivery_report_value,
            delivery_status,
            rate_value: cell(row, rate).trim().parse::<f64>().unwrap_or(0.0),
            created_at: None,
            sent_at: None,
            delivered_at: None,
            read_at: None,
            period_year: None,
            period_month: None,
            period_week: None,
        };

        for (date_idx, time_idx, event) in &pairs {
            if date_idx.is_none() {
                continue;
            }
            let date = cell(row, *date_idx);
            let time = match time_idx {
                Some(idx) => temporal::normalize_time_component(&cell(row, Some(*idx))),
                None => String::from("00:00:00"),
            };
            let instant = temporal::build_instant(&date, &time);
            match event {
                Event::Created => record.created_at = instant,
                Event::Sent => record.sent_at = instant,
                Event::Delivered => record.delivered_at = instant,
                Event::Read => record.read_at = instant,
            }
        }

        records.push(record);
    }

    debug!(
        "Normalized {} record(s) across {} column(s)",
        records.len(),
        columns.len()
    );
    Ok(CleanRecordSet::new(records, instants))
}
