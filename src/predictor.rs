//! Prediction service client.
//!
//! The predictor is an external collaborator: one JSON POST carrying the
//! image as a data URL, answered by a `{success, prediction?, error?}`
//! envelope. `HttpPredictor` talks to the real service, `MockPredictor`
//! stands in for it in tests and when `MOCK_PREDICTION` is set.

use crate::constants::*;
use crate::error::IdentifyError;
use crate::settings::Settings;
use crate::types::*;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub trait Predictor: Send + Sync {
    /// Send one identification request for a `data:image/jpeg;base64,...` URL
    fn predict(&self, image_data_url: String) -> BoxFuture<'_, Result<RawPrediction, IdentifyError>>;

    /// Human-readable target, for logs and the status line
    fn describe(&self) -> String;
}

// ============================================================================
// HTTP
// ============================================================================

pub struct HttpPredictor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPredictor {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, IdentifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sneaker-identifier/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    fn request(&self, image_data_url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(&self.endpoint)
            .json(&PredictRequest { image: image_data_url })
    }
}

impl Predictor for HttpPredictor {
    fn predict(&self, image_data_url: String) -> BoxFuture<'_, Result<RawPrediction, IdentifyError>> {
        Box::pin(async move {
            debug!(endpoint = %self.endpoint, payload_len = image_data_url.len(), "Sending prediction request");
            let response = self.request(&image_data_url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            debug!(status, body_len = body.len(), "Prediction response received");
            parse_response(status, &body)
        })
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// Interpret a prediction response. Non-2xx, malformed JSON and
/// `success: false` are all failures.
pub fn parse_response(status: u16, body: &str) -> Result<RawPrediction, IdentifyError> {
    let parsed = serde_json::from_str::<PredictResponse>(body);

    if !(200..300).contains(&status) {
        let message = parsed.ok().and_then(|r| r.error).unwrap_or_default();
        return Err(IdentifyError::NetworkFailure { status: Some(status), message });
    }

    let response = parsed.map_err(|e| {
        IdentifyError::network(format!("Malformed response from prediction service: {}", e))
    })?;

    if !response.success {
        let message = response
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "Prediction failed".to_string());
        return Err(IdentifyError::ServerFailure(message));
    }

    let prediction = response
        .prediction
        .ok_or_else(|| IdentifyError::network("Response is missing the prediction"))?;

    let top5 = prediction
        .top5
        .unwrap_or_default()
        .into_iter()
        .take(TOP_PREDICTIONS)
        .map(|p| TopPrediction { label: p.label, confidence: p.confidence })
        .collect();

    let bounding_box = prediction
        .bbox
        .filter(|b| b.iter().all(|v| v.is_finite()) && b[2] > 0.0 && b[3] > 0.0)
        .map(BoundingBox::from_array);

    Ok(RawPrediction {
        shoe_model: prediction.shoe_model,
        confidence: prediction.confidence,
        top5,
        bounding_box,
    })
}

/// Health endpoint next to the prediction endpoint (`.../predict` -> `.../health`)
pub fn health_url(endpoint: &str) -> Option<String> {
    let url = reqwest::Url::parse(endpoint).ok()?;
    url.join("health").ok().map(|u| u.to_string())
}

/// Blocking health probe, run off the UI thread at start-up
pub fn check_health(endpoint: &str, timeout: Duration) -> Result<HealthStatus, IdentifyError> {
    let url = health_url(endpoint)
        .ok_or_else(|| IdentifyError::network(format!("Invalid endpoint URL: {}", endpoint)))?;
    let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
    let response = client.get(&url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(IdentifyError::NetworkFailure { status: Some(status.as_u16()), message: String::new() });
    }
    Ok(response.json::<HealthStatus>()?)
}

// ============================================================================
// MOCK
// ============================================================================

/// Deterministic predictor with a fixed outcome
pub struct MockPredictor {
    outcome: Result<RawPrediction, IdentifyError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockPredictor {
    pub fn succeeding(prediction: RawPrediction) -> Self {
        Self { outcome: Ok(prediction), delay: Duration::ZERO, calls: AtomicUsize::new(0) }
    }

    pub fn failing(error: IdentifyError) -> Self {
        Self { outcome: Err(error), delay: Duration::ZERO, calls: AtomicUsize::new(0) }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Mock selected by `MOCK_PREDICTION=success|fail`
    pub fn from_env_value(value: &str) -> Self {
        let mock = if value.eq_ignore_ascii_case("fail") {
            Self::failing(IdentifyError::ServerFailure("model unavailable".into()))
        } else {
            Self::succeeding(RawPrediction {
                shoe_model: "AirMax90".into(),
                confidence: 92.5,
                top5: vec![
                    TopPrediction { label: "AirMax90".into(), confidence: 0.925 },
                    TopPrediction { label: "AirMax1".into(), confidence: 0.041 },
                    TopPrediction { label: "AirForce1".into(), confidence: 0.018 },
                    TopPrediction { label: "Cortez".into(), confidence: 0.009 },
                    TopPrediction { label: "Dunk".into(), confidence: 0.004 },
                ],
                bounding_box: None,
            })
        };
        mock.with_delay(Duration::from_millis(1500))
    }
}

impl Predictor for MockPredictor {
    fn predict(&self, _image_data_url: String) -> BoxFuture<'_, Result<RawPrediction, IdentifyError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        })
    }

    fn describe(&self) -> String {
        format!("mock predictor ({} calls so far)", self.calls())
    }
}

/// Build the predictor for the current settings and environment
pub fn from_settings(settings: &Settings) -> Result<Arc<dyn Predictor>, IdentifyError> {
    if let Ok(value) = std::env::var(MOCK_PREDICTION_ENV) {
        warn!(mode = %value, "Using mock predictor");
        return Ok(Arc::new(MockPredictor::from_env_value(&value)));
    }
    let endpoint = settings.resolved_endpoint();
    let predictor = HttpPredictor::new(endpoint, Duration::from_secs(settings.request_timeout_secs))?;
    info!(endpoint = %predictor.describe(), "Prediction endpoint configured");
    Ok(Arc::new(predictor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_only_the_jpeg_data_url() {
        let pixels = image::RgbaImage::from_pixel(4, 4, image::Rgba([120, 30, 30, 255]));
        let data_url = crate::intake::to_jpeg_data_url(&pixels).unwrap();
        let predictor = HttpPredictor::new(DEFAULT_ENDPOINT, Duration::from_secs(5)).unwrap();
        let request = predictor.request(&data_url).build().unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), DEFAULT_ENDPOINT);
        assert_eq!(request.headers()[reqwest::header::CONTENT_TYPE], "application/json");

        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        let fields = body.as_object().unwrap();
        assert_eq!(fields.len(), 1);
        let sent = fields["image"].as_str().unwrap();
        assert!(sent.starts_with("data:image/jpeg;base64,"));
        assert_eq!(sent, data_url);
    }

    #[test]
    fn parses_minimal_success() {
        let body = r#"{"success":true,"prediction":{"shoeModel":"AirMax90","confidence":92.5}}"#;
        let raw = parse_response(200, body).unwrap();
        assert_eq!(raw.shoe_model, "AirMax90");
        assert_eq!(raw.confidence, 92.5);
        assert!(raw.top5.is_empty());
        assert!(raw.bounding_box.is_none());
    }

    #[test]
    fn parses_top5_and_truncates() {
        let body = r#"{"success":true,"prediction":{"shoeModel":"Samba","confidence":71.0,
            "top5_predictions":[
                {"class":"Samba","confidence":0.71},{"class":"Gazelle","confidence":0.1},
                {"class":"Spezial","confidence":0.08},{"class":"Campus","confidence":0.05},
                {"class":"Forum","confidence":0.03},{"class":"Superstar","confidence":0.01}]}}"#;
        let raw = parse_response(200, body).unwrap();
        assert_eq!(raw.top5.len(), TOP_PREDICTIONS);
        assert_eq!(raw.top5[1], TopPrediction { label: "Gazelle".into(), confidence: 0.1 });
    }

    #[test]
    fn keeps_valid_reported_box() {
        let body = r#"{"success":true,"prediction":{"shoeModel":"X","confidence":50,"bbox":[1,2,30,40]}}"#;
        let raw = parse_response(200, body).unwrap();
        assert_eq!(raw.bounding_box, Some(BoundingBox::from_array([1.0, 2.0, 30.0, 40.0])));

        let body = r#"{"success":true,"prediction":{"shoeModel":"X","confidence":50,"bbox":[1,2,0,40]}}"#;
        assert!(parse_response(200, body).unwrap().bounding_box.is_none());
    }

    #[test]
    fn server_failure_is_verbatim() {
        let err = parse_response(200, r#"{"success":false,"error":"model unavailable"}"#).unwrap_err();
        assert_eq!(err, IdentifyError::ServerFailure("model unavailable".into()));
        assert_eq!(err.to_string(), "model unavailable");
    }

    #[test]
    fn server_failure_without_message_uses_fallback() {
        let err = parse_response(200, r#"{"success":false}"#).unwrap_err();
        assert_eq!(err.to_string(), "Prediction failed");
    }

    #[test]
    fn non_2xx_is_network_failure_with_status() {
        let err = parse_response(500, r#"{"error":"Prediction failed"}"#).unwrap_err();
        assert_eq!(
            err,
            IdentifyError::NetworkFailure { status: Some(500), message: "Prediction failed".into() }
        );
        let err = parse_response(502, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 502");
    }

    #[test]
    fn malformed_json_is_failure() {
        let err = parse_response(200, "not json").unwrap_err();
        assert!(matches!(err, IdentifyError::NetworkFailure { status: None, .. }));
        let err = parse_response(200, r#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, IdentifyError::NetworkFailure { .. }));
    }

    #[test]
    fn health_url_replaces_last_segment() {
        assert_eq!(
            health_url("http://localhost:5000/predict").as_deref(),
            Some("http://localhost:5000/health")
        );
        assert_eq!(
            health_url("http://host/sneaker_identification/predict").as_deref(),
            Some("http://host/sneaker_identification/health")
        );
        assert_eq!(health_url("not a url"), None);
    }

    #[tokio::test]
    async fn mock_counts_calls() {
        let mock = MockPredictor::failing(IdentifyError::network("down"));
        assert!(mock.predict("data:".into()).await.is_err());
        assert!(mock.predict("data:".into()).await.is_err());
        assert_eq!(mock.calls(), 2);
    }
}
