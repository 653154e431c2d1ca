//! Temporal reconciliation for provider exports.
//!
//! Provider reports split every event into a date column and an optional,
//! inconsistently formatted time column (24-hour, 12-hour with AM/PM, or
//! blank). This module normalizes the time component, combines it with the
//! date under one fixed pattern, and resolves the result against the
//! provider's reporting zone. Anything unparsable becomes `None` for that
//! row; a malformed timestamp never fails the file.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;

/// Offset of the provider's reporting zone (WIB, UTC+7, no DST).
pub const REPORTING_ZONE_OFFSET_HOURS: i32 = 7;

const INSTANT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static AMPM_MARKER: OnceLock<Regex> = OnceLock::new();

fn ampm_marker() -> &'static Regex {
    AMPM_MARKER.get_or_init(|| Regex::new(r"(?i)\b(?:am|pm)\b").expect("valid AM/PM pattern"))
}

/// The fixed local zone provider timestamps are reported in.
pub fn reporting_zone() -> FixedOffset {
    FixedOffset::east_opt(REPORTING_ZONE_OFFSET_HOURS * 3600).expect("offset within +/-24h")
}

/// Normalizes a raw time cell to 24-hour `HH:MM:SS` where possible.
///
/// Values carrying an AM/PM marker are parsed as a 12-hour clock (with
/// seconds first, then without); if both patterns fail the original literal
/// is kept unchanged so the downstream instant parse can reject it. Empty
/// cells default to midnight.
pub fn normalize_time_component(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::from("00:00:00");
    }
    if ampm_marker().is_match(trimmed) {
        for format in ["%I:%M:%S %p", "%I:%M %p"] {
            if let Ok(parsed) = NaiveTime::parse_from_str(trimmed, format) {
                return parsed.format("%H:%M:%S").to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Combines a date cell and a normalized time cell into a UTC instant.
///
/// The combined wall time is interpreted in the reporting zone and stored
/// as UTC so period indexing and recency sorting compare across reports.
/// Unparsable combinations and unresolvable local times yield `None`.
pub fn build_instant(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let combined = format!("{} {}", date.trim(), time);
    let naive = NaiveDateTime::parse_from_str(combined.trim(), INSTANT_FORMAT).ok()?;
    naive
        .and_local_timezone(reporting_zone())
        .single()
        .map(|local| local.with_timezone(&Utc))
}
