//! Persisted-artifact contract for the external storage layer.
//!
//! A processed upload is handed to storage as two pieces: the clean record
//! set in a columnar binary layout (one artifact per ingested file) and a
//! JSON metadata record carrying the period label, source filename, upload
//! instant, and a KPI snapshot taken at ingestion time. This module only
//! reads and writes that contract format; report identity, versioning, and
//! the "most recent dataset" pointer belong to the storage layer.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    metrics::KpiSet,
    record::{CleanRecordSet, InstantColumns, TransactionRecord},
};

/// Struct-of-arrays layout of a clean record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnarRecordSet {
    pub instants: InstantColumns,
    pub transaction_id: Vec<String>,
    pub campaign_id: Vec<String>,
    pub msisdn: Vec<String>,
    pub user: Vec<String>,
    pub template_name: Vec<String>,
    pub category: Vec<String>,
    pub status: Vec<String>,
    pub delivery_report_status: Vec<String>,
    pub delivery_status: Vec<String>,
    pub rate_value: Vec<f64>,
    pub created_at: Vec<Option<DateTime<Utc>>>,
    pub sent_at: Vec<Option<DateTime<Utc>>>,
    pub delivered_at: Vec<Option<DateTime<Utc>>>,
    pub read_at: Vec<Option<DateTime<Utc>>>,
    pub period_year: Vec<Option<i32>>,
    pub period_month: Vec<Option<u32>>,
    pub period_week: Vec<Option<u32>>,
}

impl From<&CleanRecordSet> for ColumnarRecordSet {
    fn from(set: &CleanRecordSet) -> Self {
        let mut columnar = ColumnarRecordSet {
            instants: set.instants,
            transaction_id: Vec::with_capacity(set.len()),
            campaign_id: Vec::with_capacity(set.len()),
            msisdn: Vec::with_capacity(set.len()),
            user: Vec::with_capacity(set.len()),
            template_name: Vec::with_capacity(set.len()),
            category: Vec::with_capacity(set.len()),
            status: Vec::with_capacity(set.len()),
            delivery_report_status: Vec::with_capacity(set.len()),
            delivery_status: Vec::with_capacity(set.len()),
            rate_value: Vec::with_capacity(set.len()),
            created_at: Vec::with_capacity(set.len()),
            sent_at: Vec::with_capacity(set.len()),
            delivered_at: Vec::with_capacity(set.len()),
            read_at: Vec::with_capacity(set.len()),
            period_year: Vec::with_capacity(set.len()),
            period_month: Vec::with_capacity(set.len()),
            period_week: Vec::with_capacity(set.len()),
        };
        for record in set.iter() {
            columnar.transaction_id.push(record.transaction_id.clone());
            columnar.campaign_id.push(record.campaign_id.clone());
            columnar.msisdn.push(record.msisdn.clone());
            columnar.user.push(record.user.clone());
            columnar.template_name.push(record.template_name.clone());
            columnar.category.push(record.category.clone());
            columnar.status.push(record.status.clone());
            columnar
                .delivery_report_status
                .push(record.delivery_report_status.clone());
            columnar.delivery_status.push(record.delivery_status.clone());
            columnar.rate_value.push(record.rate_value);
            columnar.created_at.push(record.created_at);
            columnar.sent_at.push(record.sent_at);
            columnar.delivered_at.push(record.delivered_at);
            columnar.read_at.push(record.read_at);
            columnar.period_year.push(record.period_year);
            columnar.period_month.push(record.period_month);
            columnar.period_week.push(record.period_week);
        }
        columnar
    }
}

impl ColumnarRecordSet {
    pub fn into_record_set(self) -> CleanRecordSet {
        let records = (0..self.transaction_id.len())
            .map(|i| TransactionRecord {
                transaction_id: self.transaction_id[i].clone(),
                campaign_id: self.campaign_id[i].clone(),
                msisdn: self.msisdn[i].clone(),
                user: self.user[i].clone(),
                template_name: self.template_name[i].clone(),
                category: self.category[i].clone(),
                status: self.status[i].clone(),
                delivery_report_status: self.delivery_report_status[i].clone(),
                delivery_status: self.delivery_status[i].clone(),
                rate_value: self.rate_value[i],
                created_at: self.created_at[i],
                sent_at: self.sent_at[i],
                delivered_at: self.delivered_at[i],
                read_at: self.read_at[i],
                period_year: self.period_year[i],
                period_month: self.period_month[i],
                period_week: self.period_week[i],
            })
            .collect();
        CleanRecordSet::new(records, self.instants)
    }
}

/// Metadata record persisted alongside each artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub id: Uuid,
    pub period_label: String,
    pub source_filename: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub raw_storage_path: Option<String>,
    pub clean_storage_path: Option<String>,
    pub notes: Option<String>,
    pub metrics: Option<KpiSet>,
}

impl ReportMetadata {
    pub fn new(period_label: impl Into<String>, source_filename: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            period_label: period_label.into(),
            source_filename: source_filename.into(),
            uploaded_by: String::from("system"),
            uploaded_at: Utc::now(),
            raw_storage_path: None,
            clean_storage_path: None,
            notes: None,
            metrics: None,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating metadata file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing metadata JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening metadata file {path:?}"))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context("Parsing metadata JSON")
    }
}

/// Writes the columnar artifact for `set` to `path`.
pub fn write_columnar(path: &Path, set: &CleanRecordSet) -> Result<()> {
    let columnar = ColumnarRecordSet::from(set);
    let mut writer =
        BufWriter::new(File::create(path).with_context(|| format!("Creating artifact {path:?}"))?);
    bincode::serde::encode_into_std_write(&columnar, &mut writer, bincode::config::standard())
        .context("Writing columnar artifact")?;
    Ok(())
}

/// Reads a columnar artifact back into a clean record set.
pub fn read_columnar(path: &Path) -> Result<CleanRecordSet> {
    let bytes = std::fs::read(path).with_context(|| format!("Reading artifact {path:?}"))?;
    let (columnar, _) = bincode::serde::decode_from_slice::<ColumnarRecordSet, _>(
        &bytes,
        bincode::config::standard(),
    )
    .context("Parsing columnar artifact")?;
    Ok(columnar.into_record_set())
}
