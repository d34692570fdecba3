//! Classification response model
//!
//! Wire format of `/predict`:
//!
//! ```json
//! {"success": true,
//!  "data": {"top_prediction": {"genre": "rock", "confidence": 81},
//!           "results": [{"genre": "rock", "percentage": 81}],
//!           "segment_count": 3},
//!  "error": null}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::client::RawResponse;
use crate::error::{GelangError, Result};

/// Shown when no usable response arrived
pub const REQUEST_FAILED_MESSAGE: &str = "The request to the classification server failed.";

/// Shown when the server reported a failure without saying why
pub const SERVER_FAILED_MESSAGE: &str = "Something went wrong while processing the file.";

/// Best genre across all segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPrediction {
    pub genre: String,
    /// Share of segments voting for this genre, 0-100
    pub confidence: f64,
}

/// One genre of the ranked distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreScore {
    pub genre: String,
    /// 0-100
    pub percentage: f64,
}

/// Successful classification payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub top_prediction: TopPrediction,
    /// In server order
    #[serde(rename = "results")]
    pub ranked_results: Vec<GenreScore>,
    pub segment_count: u32,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    success: bool,
    #[serde(default)]
    data: Option<Prediction>,
    #[serde(default)]
    error: Option<String>,
}

/// Why a classification failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// No usable response: network failure or unreadable body
    Request,
    /// The server answered and reported a failure
    Server,
}

/// Outcome of one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClassificationResult {
    Success {
        data: Prediction,
        received_at: DateTime<Utc>,
    },
    Error {
        kind: FailureKind,
        message: String,
        received_at: DateTime<Utc>,
    },
}

impl ClassificationResult {
    pub fn success(data: Prediction) -> Self {
        ClassificationResult::Success {
            data,
            received_at: Utc::now(),
        }
    }

    pub fn error(kind: FailureKind, message: impl Into<String>) -> Self {
        ClassificationResult::Error {
            kind,
            message: message.into(),
            received_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ClassificationResult::Success { .. })
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            ClassificationResult::Success { data, .. } => Some(data),
            ClassificationResult::Error { .. } => None,
        }
    }

    /// Error message, if this is a failure
    pub fn message(&self) -> Option<&str> {
        match self {
            ClassificationResult::Success { .. } => None,
            ClassificationResult::Error { message, .. } => Some(message),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ClassificationResult::Success { .. } => None,
            ClassificationResult::Error { kind, .. } => Some(*kind),
        }
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        match self {
            ClassificationResult::Success { received_at, .. }
            | ClassificationResult::Error { received_at, .. } => *received_at,
        }
    }
}

fn parse_body(raw: &RawResponse) -> Result<PredictResponse> {
    serde_json::from_str(&raw.body).map_err(|e| GelangError::InvalidResponse {
        reason: format!("HTTP {}: {}", raw.status, e),
    })
}

/// Turn a transport outcome into a result
///
/// - transport error, or a body that is not the expected JSON: `Request`
///   failure with a generic message
/// - explicit `error` field (any status): `Server` failure with that message
/// - `success: true` with data on a 2xx status: success
/// - anything else received: `Server` failure with a generic message
pub fn interpret(outcome: Result<RawResponse>) -> ClassificationResult {
    let raw = match outcome {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("[CLASSIFY] Request failed: {}", e);
            return ClassificationResult::error(FailureKind::Request, REQUEST_FAILED_MESSAGE);
        }
    };

    let parsed = match parse_body(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("[CLASSIFY] {}", e);
            return ClassificationResult::error(FailureKind::Request, REQUEST_FAILED_MESSAGE);
        }
    };

    match parsed {
        PredictResponse {
            success: true,
            data: Some(data),
            ..
        } if raw.is_success() => ClassificationResult::success(data),
        PredictResponse {
            error: Some(message),
            ..
        } if !message.trim().is_empty() => {
            log::info!("[CLASSIFY] Server reported failure: {}", message);
            ClassificationResult::error(FailureKind::Server, message)
        }
        _ => {
            log::warn!(
                "[CLASSIFY] Server failure without message (HTTP {})",
                raw.status
            );
            ClassificationResult::error(FailureKind::Server, SERVER_FAILED_MESSAGE)
        }
    }
}
