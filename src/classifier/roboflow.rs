use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Url;
use tracing::debug;

use crate::config::Config;

use super::{Classifier, ClassifyError, Prediction, select_best};

/// Classifies images through the hosted Roboflow classification API.
///
/// One request per image: base64 body, key in the query string, bounded by
/// the configured timeout. No retries.
pub struct RoboflowClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RoboflowClassifier {
    pub fn new(config: &Config) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self, api_key: &str) -> Result<Url, ClassifyError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| ClassifyError::Transport(format!("invalid endpoint {}: {}", self.endpoint, e)))?;
        url.query_pairs_mut().append_pair("api_key", api_key);
        Ok(url)
    }
}

#[async_trait]
impl Classifier for RoboflowClassifier {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn classify(&self, image: &[u8]) -> Result<Prediction, ClassifyError> {
        let api_key = self.api_key.as_deref().ok_or(ClassifyError::MissingApiKey)?;
        let url = self.request_url(api_key)?;
        let encoded = STANDARD.encode(image);

        debug!(endpoint = %self.endpoint, bytes = image.len(), "sending image to classifier");

        let resp = self
            .client
            .post(url)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(encoded)
            .send()
            .await
            .map_err(|e| ClassifyError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ClassifyError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(ClassifyError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ClassifyError::Malformed {
                reason: e.to_string(),
                body: text.clone(),
            })?;

        if !body.is_object() {
            return Err(ClassifyError::Malformed {
                reason: "expected a JSON object".to_string(),
                body: text,
            });
        }

        let best = select_best(&body)?;
        debug!(label = %best.label, confidence = best.confidence, "classifier prediction");
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_embeds_key() {
        let config = Config::default().with_api_key(Some("k3y".to_string()));
        let classifier = RoboflowClassifier::new(&config).unwrap();
        let url = classifier.request_url("k3y").unwrap();
        assert_eq!(
            url.as_str(),
            "https://classify.roboflow.com/plant-disease-classification-dvfsj/1?api_key=k3y"
        );
    }

    #[test]
    fn request_url_escapes_key() {
        let classifier = RoboflowClassifier::new(&Config::default()).unwrap();
        let url = classifier.request_url("a b&c").unwrap();
        assert!(url.as_str().ends_with("?api_key=a+b%26c"));
    }

    #[test]
    fn configured_only_with_key() {
        let without = RoboflowClassifier::new(&Config::default()).unwrap();
        assert!(!without.is_configured());

        let config = Config::default().with_api_key(Some("k".to_string()));
        let with = RoboflowClassifier::new(&config).unwrap();
        assert!(with.is_configured());
    }

    #[tokio::test]
    async fn missing_key_fails_before_request() {
        let classifier = RoboflowClassifier::new(&Config::default()).unwrap();
        let result = classifier.classify(b"img").await;
        assert!(matches!(result, Err(ClassifyError::MissingApiKey)));
    }
}
