//! Runtime configuration and the optional disease database.
//!
//! Both are built once at startup and handed to the classifier and the
//! recommender by value (or behind an `Arc`). Nothing here is mutated after
//! construction.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::consts::{DEFAULT_API_BASE, DEFAULT_MAX_UPLOAD_MB, DEFAULT_MODEL_ID, DEFAULT_TIMEOUT};

/// Settings for the classification gateway and HTTP surface.
#[derive(Debug, Clone)]
pub struct Config {
    /// Classifier API key. `None` is reported per request, not at startup.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model_id: String,
    pub timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl Config {
    /// Set the API key. Blank keys count as missing.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    /// Full classifier endpoint without the credential, e.g.
    /// `https://classify.roboflow.com/plant-disease-classification-dvfsj/1`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            self.model_id.trim_start_matches('/')
        )
    }
}

/// Treatment and prevention actions for one disease label.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiseaseEntry {
    #[serde(default)]
    pub treatment: Option<Vec<String>>,
    #[serde(default)]
    pub prevention: Option<Vec<String>>,
}

/// Read-only label -> [`DiseaseEntry`] mapping. Keys are matched exactly.
#[derive(Debug, Clone, Default)]
pub struct DiseaseDb {
    entries: HashMap<String, DiseaseEntry>,
}

impl DiseaseDb {
    pub fn new(entries: HashMap<String, DiseaseEntry>) -> Self {
        Self { entries }
    }

    /// Load from a JSON file. A missing or unparseable file yields an empty
    /// database rather than an error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no disease database, using rules only");
                return Self::default();
            }
        };

        match Self::from_json(&text) {
            Ok(db) => {
                info!(path = %path.display(), entries = db.len(), "loaded disease database");
                db
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparseable disease database");
                Self::default()
            }
        }
    }

    /// Parse a JSON document of the form `{"label": {"treatment": [...], "prevention": [...]}}`.
    ///
    /// Only a document that is not a JSON object fails. Individual entries
    /// with the wrong shape are skipped.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(text)?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (label, value) in raw {
            match serde_json::from_value::<DiseaseEntry>(value) {
                Ok(entry) => {
                    entries.insert(label, entry);
                }
                Err(e) => warn!(%label, error = %e, "skipping malformed disease entry"),
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, label: &str) -> Option<&DiseaseEntry> {
        self.entries.get(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn blank_api_key_is_missing() {
        let config = Config::default().with_api_key(Some("   ".to_string()));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn api_key_is_trimmed() {
        let config = Config::default().with_api_key(Some(" abc \n".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let config = Config {
            api_base: "http://127.0.0.1:9000/".to_string(),
            model_id: "/leaf/3".to_string(),
            ..Config::default()
        };
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/leaf/3");
    }

    #[test]
    fn default_endpoint() {
        assert_eq!(
            Config::default().endpoint(),
            "https://classify.roboflow.com/plant-disease-classification-dvfsj/1"
        );
    }

    #[test]
    fn parses_partial_entries() {
        let db = DiseaseDb::from_json(
            r#"{
                "Late_Blight": {"treatment": ["a", "b"]},
                "Rust": {"prevention": ["c"]},
                "Odd": {}
            }"#,
        )
        .unwrap();

        assert_eq!(db.len(), 3);
        let blight = db.get("Late_Blight").unwrap();
        assert_eq!(blight.treatment.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
        assert!(blight.prevention.is_none());
        assert_eq!(db.get("Odd").unwrap(), &DiseaseEntry::default());
    }

    #[test]
    fn bad_entry_does_not_drop_good_ones() {
        let db = DiseaseDb::from_json(
            r#"{"Late_Blight": {"treatment": ["copper"]}, "Odd": {"treatment": [1]}, "Worse": "text"}"#,
        )
        .unwrap();
        assert_eq!(db.len(), 1);
        assert!(db.get("Odd").is_none());
        assert!(db.get("Worse").is_none());
        assert_eq!(
            db.get("Late_Blight").unwrap().treatment.as_deref(),
            Some(&["copper".to_string()][..])
        );
    }

    #[test]
    fn non_object_document_fails() {
        assert!(DiseaseDb::from_json("[1, 2]").is_err());
    }

    #[test]
    fn load_keeps_good_entries_beside_bad_ones() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"Late_Blight": {"treatment": ["copper"]}, "Odd": {"treatment": [1]}}"#)
            .unwrap();
        let db = DiseaseDb::load(file.path());
        assert_eq!(db.len(), 1);
        assert!(db.get("Late_Blight").is_some());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let db = DiseaseDb::from_json(r#"{"Late_Blight": {"treatment": ["a"]}}"#).unwrap();
        assert!(db.get("Late_Blight").is_some());
        assert!(db.get("late_blight").is_none());
        assert!(db.get("Late Blight").is_none());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = DiseaseDb::load(dir.path().join("nope.json"));
        assert!(db.is_empty());
    }

    #[test]
    fn garbage_file_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let db = DiseaseDb::load(file.path());
        assert!(db.is_empty());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"Scab": {"treatment": ["prune"], "prevention": ["rake leaves"]}}"#)
            .unwrap();
        let db = DiseaseDb::load(file.path());
        assert_eq!(db.len(), 1);
        assert!(db.get("Scab").is_some());
    }
}
