pub mod rules;

use std::sync::Arc;

use crate::config::{DiseaseDb, DiseaseEntry};

use rules::{RULES, Rule};

const MAX_TREATMENTS: usize = 3;
const MAX_PREVENTIONS: usize = 2;

/// Turns a (label, confidence) pair into advice text.
///
/// Database entries win when they produce any text; otherwise the keyword
/// rules and a confidence-based severity prefix take over. Never fails.
#[derive(Debug, Clone)]
pub struct Recommender {
    db: Arc<DiseaseDb>,
    rules: &'static [Rule],
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(Arc::new(DiseaseDb::default()))
    }
}

impl Recommender {
    pub fn new(db: Arc<DiseaseDb>) -> Self {
        Self { db, rules: RULES }
    }

    /// Replace the keyword rule chain.
    pub fn with_rules(mut self, rules: &'static [Rule]) -> Self {
        self.rules = rules;
        self
    }

    /// `label` must be the raw classifier label; lookups are exact.
    pub fn recommend(&self, label: &str, confidence: f64) -> String {
        if let Some(text) = self.db.get(label).and_then(from_entry) {
            return text;
        }
        rules::apply(self.rules, label, confidence)
    }
}

/// Render a database entry, or `None` if it renders to nothing.
///
/// Blank items are skipped; a list with no usable items is treated as absent.
fn from_entry(entry: &DiseaseEntry) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(items) = section(entry.treatment.as_deref(), MAX_TREATMENTS) {
        parts.push(format!("Treatment: {}", items));
    }
    if let Some(items) = section(entry.prevention.as_deref(), MAX_PREVENTIONS) {
        parts.push(format!("Prevention: {}", items));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(". "))
    }
}

fn section(items: Option<&[String]>, limit: usize) -> Option<String> {
    let items: Vec<&str> = items?
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(limit)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items.join(", "))
    }
}

/// Free-function form using only the built-in rules and no database.
pub fn generate_recommendation(label: &str, confidence: f64) -> String {
    rules::apply(RULES, label, confidence)
}
