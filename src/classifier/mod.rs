pub mod mock;
pub mod roboflow;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::consts::UNKNOWN_LABEL;

/// The top prediction for an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

/// Why a classification attempt produced no prediction.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no classifier API key configured")]
    MissingApiKey,

    #[error("classifier returned status {status}")]
    Upstream { status: u16, body: String },

    #[error("classifier response is malformed: {reason}")]
    Malformed { reason: String, body: String },

    #[error("classifier returned no predictions")]
    NoPredictions,

    #[error("classifier request failed: {0}")]
    Transport(String),
}

/// Something that turns image bytes into a prediction. The HTTP layer only
/// knows this trait, so tests can swap in a scripted one.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Whether a credential is available. Checked before the upload is read.
    fn is_configured(&self) -> bool {
        true
    }

    async fn classify(&self, image: &[u8]) -> Result<Prediction, ClassifyError>;
}

/// Pick the highest-confidence prediction from a classifier response body.
///
/// Ties go to the first maximal entry. Missing or malformed fields fall back
/// to `"unknown"` / `0.0` instead of failing; only an absent or empty
/// `predictions` array is an error.
pub fn select_best(response: &Value) -> Result<Prediction, ClassifyError> {
    let predictions = response
        .get("predictions")
        .and_then(|p| p.as_array())
        .filter(|p| !p.is_empty())
        .ok_or(ClassifyError::NoPredictions)?;

    let mut best = &predictions[0];
    let mut best_confidence = confidence_of(best);
    for candidate in &predictions[1..] {
        let confidence = confidence_of(candidate);
        if confidence > best_confidence {
            best = candidate;
            best_confidence = confidence;
        }
    }

    let label = best
        .get("class")
        .and_then(|c| c.as_str())
        .unwrap_or(UNKNOWN_LABEL)
        .to_string();

    Ok(Prediction {
        label,
        confidence: best_confidence,
    })
}

/// Read a confidence as a number, accepting numeric strings.
fn confidence_of(prediction: &Value) -> f64 {
    let value = match prediction.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}
