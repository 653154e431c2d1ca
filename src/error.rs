use thiserror::Error;

/// Hard failure while turning a byte source into a raw table.
///
/// These abort processing for the whole file; everything that can degrade
/// row-by-row (bad dates, non-numeric rates) deliberately does not live here.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("input is empty")]
    Empty,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("input has no detectable columns")]
    NoColumns,
    #[error("failed to parse delimited input: {0}")]
    Delimited(#[from] csv::Error),
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),
    #[error("failed to decode input as {encoding}")]
    Decode { encoding: &'static str },
}

/// Required columns absent after header canonicalization.
///
/// `missing` lists every absent canonical name, not just the first one found.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing required columns: {}", missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}
