//! Error types.
//!
//! Only configuration, persistence and the classifier boundary can fail.
//! Mapping, diffing, merging and caching are total.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum PiiError {
    InvalidConfig(String),
    Persistence(String),
    Serialization(String),
    UnknownRequest(u64),
}

impl std::fmt::Display for PiiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PiiError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            PiiError::Persistence(msg) => write!(f, "Persistence error: {}", msg),
            PiiError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            PiiError::UnknownRequest(id) => write!(f, "Unknown detection request: {}", id),
        }
    }
}

impl std::error::Error for PiiError {}

impl From<serde_json::Error> for PiiError {
    fn from(e: serde_json::Error) -> Self {
        PiiError::Serialization(e.to_string())
    }
}

/// Failure reported by the external classifier.
///
/// Never fatal: the session logs it and keeps the previous entity set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DetectionError {
    Network(String),
    Timeout,
    Rejected { status: u16, message: String },
    Cancelled,
}

impl std::fmt::Display for DetectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionError::Network(msg) => write!(f, "Network error: {}", msg),
            DetectionError::Timeout => write!(f, "Classifier timed out"),
            DetectionError::Rejected { status, message } => {
                write!(f, "Classifier rejected request ({}): {}", status, message)
            }
            DetectionError::Cancelled => write!(f, "Detection cancelled"),
        }
    }
}

impl std::error::Error for DetectionError {}
