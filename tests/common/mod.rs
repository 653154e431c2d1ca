#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use blast_report::record::{CleanRecordSet, InstantColumns, TransactionRecord};
use chrono::{DateTime, TimeZone, Utc};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().expect("valid instant")
}

/// A record with every field defaulted; tests override what they exercise.
pub fn record(transaction_id: &str) -> TransactionRecord {
    TransactionRecord {
        transaction_id: transaction_id.to_string(),
        campaign_id: String::from("cmp-1"),
        msisdn: String::from("628110000001"),
        user: String::from("ops"),
        template_name: String::new(),
        category: String::new(),
        status: String::new(),
        delivery_report_status: String::new(),
        delivery_status: String::new(),
        rate_value: 0.0,
        created_at: None,
        sent_at: None,
        delivered_at: None,
        read_at: None,
        period_year: None,
        period_month: None,
        period_week: None,
    }
}

pub fn record_set(records: Vec<TransactionRecord>) -> CleanRecordSet {
    CleanRecordSet::new(
        records,
        InstantColumns {
            created: true,
            sent: true,
            delivered: true,
            read: true,
        },
    )
}

/// Pipe-delimited sample export with raw (uncanonicalized) headers.
pub fn sample_report_csv() -> String {
    let mut out = String::from(
        "Transaction ID|Campaign ID|MSISDN|Status|Delivery Report Status|Rate|Category|Template Name|User|Sent Date|Sent Time|Delivery Report Read Date|Delivery Report Read Time\n",
    );
    out.push_str("tx-1|cmp-1|628110000001 |succeeded|read|125.5|Marketing|promo_a|ops|2024-05-06|2:30 PM|2024-05-06|3:10 PM\n");
    out.push_str("tx-2|cmp-1|628110000002|failed||not-a-number|Marketing|promo_a|ops|2024-05-06|14:45:00||\n");
    out.push_str("tx-3|cmp-2|628110000003|succeeded|delivered|80|Transactional|otp_check|ops|2024-05-21|09:00:00||\n");
    out
}
