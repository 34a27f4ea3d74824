//! Error types and the error funnel.

use std::sync::Arc;
use tracing::error;

/// Failures of an upstream feed.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Cannot connect to {url}")]
    Connect { url: String },
    #[error("Upstream {url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("Failed to request {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to decode response of {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed payload from {feed}: {reason}")]
    Malformed { feed: &'static str, reason: String },
}

/// Failures classifying German administrative units.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("Unknown administrative type: {0}")]
    UnknownType(String),
}

/// Receives errors that escaped a branch of the run, e.g. a crash reporter.
pub trait ErrorSink: Send + Sync {
    fn capture(&self, code_part: &str, error: &anyhow::Error);
}

/// Log an error with its full chain and forward it to the sink, if any.
pub fn report_error(sink: Option<&Arc<dyn ErrorSink>>, code_part: &str, err: &anyhow::Error) {
    error!("[{}] error: {:#}", code_part, err);
    if let Some(sink) = sink {
        sink.capture(code_part, err);
    }
}
