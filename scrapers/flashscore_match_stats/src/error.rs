use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },
    #[error("no element matches {selector}")]
    ElementNotFound { selector: String },
    #[error("{selector} not clickable within {timeout:?}")]
    Timeout { selector: String, timeout: Duration },
    #[error("browser protocol error: {0}")]
    Cdp(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Cdp(e.to_string())
    }
}

/// Reasons a single field of a match page could not be read.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Page(#[from] BrowserError),
    #[error("no element matches {selector}")]
    NotFound { selector: String },
    #[error("expected at least {expected} elements for {selector}, found {found}")]
    TooFew {
        selector: String,
        expected: usize,
        found: usize,
    },
    #[error("label {0:?} holds no score")]
    Unparseable(String),
    #[error("invalid selector {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("frame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
    #[error("missing column {0}")]
    MissingColumn(String),
    #[error("row {row} has {found} fields, expected {expected}")]
    RowLength { row: usize, expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("frame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
    #[error("no usable rows left after dropping incomplete ones")]
    NoRows,
    #[error("split left an empty partition (train={train}, test={test})")]
    EmptyPartition { train: usize, test: usize },
}
