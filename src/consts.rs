//! Project-wide constants.

use std::time::Duration;

/// Base URL of the hosted classification API.
pub const DEFAULT_API_BASE: &str = "https://classify.roboflow.com";

/// Classification model queried when none is specified.
pub const DEFAULT_MODEL_ID: &str = "plant-disease-classification-dvfsj/1";

/// Environment variable holding the classifier API key.
pub const API_KEY_ENV: &str = "ROBOFLOW_API_KEY";

/// Default location of the optional disease database.
pub const DEFAULT_DISEASE_DB: &str = "disease_db.json";

/// Upper bound on a single classifier call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 10;

/// Multipart field the web client sends the image under.
pub const UPLOAD_FIELD: &str = "image";

/// Label used when a prediction carries no class.
pub const UNKNOWN_LABEL: &str = "unknown";

pub const MSG_MISSING_KEY: &str = "Missing Roboflow API key on server.";
pub const MSG_NO_PREDICTIONS: &str = "No predictions were returned. Try a clearer image.";
pub const MSG_UNREADABLE_RESPONSE: &str = "Roboflow returned an unreadable response";
pub const MSG_UNEXPECTED: &str = "Unexpected server error";
pub const MSG_NO_UPLOAD: &str = "No image was uploaded.";
pub const MSG_RECOMMEND_INFO: &str =
    "Upload an image on /analyze to receive AI-generated disease recommendations.";

/// Round a confidence score to 4 decimal places for display.
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 10_000.0).round() / 10_000.0
}

/// Turn a raw classifier label into display text (`Late_Blight` -> `Late Blight`).
pub fn display_label(label: &str) -> String {
    label.replace('_', " ")
}
