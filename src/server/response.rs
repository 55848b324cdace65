use serde::Serialize;
use thiserror::Error;

use crate::classifier::ClassifyError;
use crate::consts::{
    MSG_MISSING_KEY, MSG_NO_PREDICTIONS, MSG_NO_UPLOAD, MSG_UNEXPECTED, MSG_UNREADABLE_RESPONSE,
};

/// A successful `/analyze` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub label: String,
    pub confidence: f64,
    pub recommendation: String,
}

/// Failure body: `{"error": ..., "raw"?: ..., "details"?: ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Success(Analysis),
    Failure(ErrorBody),
}

/// Everything that can stop an analysis.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// No classifier credential is configured.
    #[error("{}", MSG_MISSING_KEY)]
    Configuration,

    /// The classifier answered with a failure or an unreadable body.
    #[error("{message}")]
    Upstream { message: String, raw: String },

    #[error("{}", MSG_NO_PREDICTIONS)]
    EmptyPrediction,

    #[error("{}", MSG_NO_UPLOAD)]
    NoUpload,

    #[error("{0}")]
    Internal(String),
}

impl From<ClassifyError> for AnalyzeError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::MissingApiKey => AnalyzeError::Configuration,
            ClassifyError::Upstream { status, body } => AnalyzeError::Upstream {
                message: format!("Roboflow Error {}", status),
                raw: body,
            },
            ClassifyError::Malformed { body, .. } => AnalyzeError::Upstream {
                message: MSG_UNREADABLE_RESPONSE.to_string(),
                raw: body,
            },
            ClassifyError::NoPredictions => AnalyzeError::EmptyPrediction,
            ClassifyError::Transport(details) => AnalyzeError::Internal(details),
        }
    }
}

impl From<AnalyzeError> for ErrorBody {
    fn from(e: AnalyzeError) -> Self {
        match e {
            AnalyzeError::Upstream { message, raw } => ErrorBody {
                error: message,
                raw: Some(raw),
                details: None,
            },
            AnalyzeError::Internal(details) => ErrorBody {
                error: MSG_UNEXPECTED.to_string(),
                raw: None,
                details: Some(details),
            },
            other => ErrorBody {
                error: other.to_string(),
                raw: None,
                details: None,
            },
        }
    }
}
