use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Classifier, ClassifyError, Prediction};

/// A scripted classifier for tests. Returns pre-defined results in order.
pub struct MockClassifier {
    results: Mutex<Vec<Result<Prediction, ClassifyError>>>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new(results: Vec<Result<Prediction, ClassifyError>>) -> Self {
        Self {
            results: Mutex::new(results),
            calls: AtomicUsize::new(0),
        }
    }

    /// Convenience for a single successful prediction.
    pub fn predicting(label: &str, confidence: f64) -> Self {
        Self::new(vec![Ok(Prediction {
            label: label.to_string(),
            confidence,
        })])
    }

    /// Convenience for a single failure.
    pub fn failing(error: ClassifyError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// How many times `classify` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, _image: &[u8]) -> Result<Prediction, ClassifyError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self
            .results
            .lock()
            .map_err(|_| ClassifyError::Transport("MockClassifier: poisoned".to_string()))?;
        if results.is_empty() {
            return Err(ClassifyError::Transport(format!(
                "MockClassifier: no more results (called {} times)",
                i + 1
            )));
        }
        results.remove(0)
    }
}
