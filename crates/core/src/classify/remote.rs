use crate::capture::Payload;
use crate::classify::{Classifier, ClassifierError};
use crate::config::{ApiKey, ClassifierConfig, ClassifierEndpoint};
use crate::mood::ExpressionScores;
use crate::util::{retry_with_backoff, RetryConfig};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const LOG_TARGET: &str = "classify::remote";

/// Client for the HTTP mood-detection service.
///
/// Images go to `detect-mood` and voice clips to `detect-voice-mood`, both as
/// a multipart upload in the `file` field.
#[derive(Clone)]
pub struct RemoteClassifier {
    client: Client,
    endpoint: ClassifierEndpoint,
    api_key: Option<ApiKey>,
    retry: RetryConfig,
}

impl RemoteClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(config.timeout.duration())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            retry: match config.retry_attempts {
                0 | 1 => RetryConfig::none(),
                attempts => RetryConfig {
                    max_attempts: attempts,
                    ..RetryConfig::default()
                },
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn send_once(&self, url: &Url, payload: &Payload) -> Result<ExpressionScores, ClassifierError> {
        let part = Part::bytes(payload.bytes.to_vec())
            .file_name(payload.file_name.clone())
            .mime_str(&payload.media_type)?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(url.clone()).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::HttpStatus(status.as_u16(), body));
        }

        let body: DetectMoodResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;
        body.into_scores()
    }
}

impl Classifier for RemoteClassifier {
    fn classify(&self, payload: Payload) -> BoxFuture<'_, Result<ExpressionScores, ClassifierError>> {
        async move {
            let url = self.endpoint.join(payload.kind.endpoint())?;
            tracing::debug!(
                target: LOG_TARGET,
                url = %url,
                bytes = payload.bytes.len(),
                "sending payload to classifier"
            );

            let scores = retry_with_backoff(
                &self.retry,
                || self.send_once(&url, &payload),
                ClassifierError::is_retryable,
            )
            .await
            .inspect_err(|e| tracing::warn!(target: LOG_TARGET, error = %e, "classification failed"))?;

            tracing::debug!(target: LOG_TARGET, categories = scores.len(), "classifier responded");
            Ok(scores)
        }
        .boxed()
    }
}

/// Accepts both the per-expression shape and the single-mood shape the
/// service has returned over time.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectMoodResponse {
    expressions: Option<ExpressionScores>,
    mood: Option<String>,
    confidence: Option<f32>,
    face_detected: Option<bool>,
    error: Option<String>,
}

impl DetectMoodResponse {
    fn into_scores(self) -> Result<ExpressionScores, ClassifierError> {
        if let Some(message) = self.error {
            return Err(ClassifierError::Service(message));
        }
        if self.face_detected == Some(false) {
            return Ok(ExpressionScores::new());
        }
        if let Some(expressions) = self.expressions {
            return Ok(expressions);
        }
        Ok(match self.mood {
            Some(mood) => ExpressionScores::new().with(mood, self.confidence.unwrap_or(1.0)),
            None => ExpressionScores::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RequestTimeout;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn classifier_for(server: &MockServer) -> RemoteClassifier {
        let mut config = ClassifierConfig::new(
            ClassifierEndpoint::new(&server.uri()).expect("mock server uri"),
        );
        config.timeout = RequestTimeout::new(2_000).expect("non-zero");
        RemoteClassifier::new(&config)
            .expect("client builds")
            .with_retry(RetryConfig::new(3, Duration::from_millis(1)))
    }

    fn json_response(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_owned(), "application/json")
    }

    #[tokio::test]
    async fn image_expressions_keep_document_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect-mood"))
            .respond_with(json_response(
                r#"{"expressions": {"happy": 0.5, "angry": 0.5, "sad": 0.1}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let scores = classifier_for(&server)
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect("classified");

        let names: Vec<_> = scores.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["happy", "angry", "sad"]);
    }

    #[tokio::test]
    async fn voice_goes_to_voice_endpoint_with_mood_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect-voice-mood"))
            .respond_with(json_response(r#"{"mood": "angry"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let scores = classifier_for(&server)
            .classify(Payload::audio(&b"RIFF"[..]))
            .await
            .expect("classified");

        assert_eq!(scores, ExpressionScores::new().with("angry", 1.0));
    }

    #[tokio::test]
    async fn proxy_shape_uses_reported_confidence() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect-mood"))
            .respond_with(json_response(
                r#"{"mood": "sad", "confidence": 0.62, "faceDetected": true}"#,
            ))
            .mount(&server)
            .await;

        let scores = classifier_for(&server)
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect("classified");

        assert_eq!(scores.get("sad"), Some(0.62));
    }

    #[tokio::test]
    async fn no_face_means_empty_scores() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect-mood"))
            .respond_with(json_response(
                r#"{"mood": "neutral", "confidence": 0, "faceDetected": false}"#,
            ))
            .mount(&server)
            .await;

        let scores = classifier_for(&server)
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect("classified");

        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn service_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(json_response(r#"{"error": "Image data is required"}"#))
            .mount(&server)
            .await;

        let err = classifier_for(&server)
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect_err("service reported an error");

        assert!(matches!(err, ClassifierError::Service(ref m) if m == "Image data is required"));
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let err = classifier_for(&server)
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect_err("always unavailable");

        assert!(matches!(err, ClassifierError::HttpStatus(503, _)));
    }

    #[tokio::test]
    async fn single_attempt_config_makes_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ClassifierConfig::new(
            ClassifierEndpoint::new(&server.uri()).expect("mock server uri"),
        );
        config.retry_attempts = 0;
        let classifier = RemoteClassifier::new(&config).expect("client builds");
        assert_eq!(classifier.retry, RetryConfig::none());

        let err = classifier
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect_err("unavailable");
        assert!(matches!(err, ClassifierError::HttpStatus(503, _)));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad upload"))
            .expect(1)
            .mount(&server)
            .await;

        let err = classifier_for(&server)
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect_err("bad request");

        assert!(matches!(err, ClassifierError::HttpStatus(400, ref body) if body == "bad upload"));
    }

    #[tokio::test]
    async fn bearer_token_is_sent_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(json_response(r#"{"expressions": {"happy": 0.8}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ClassifierConfig::new(
            ClassifierEndpoint::new(&server.uri()).expect("mock server uri"),
        );
        config.api_key = Some(ApiKey::new("s3cret").expect("non-empty"));
        let classifier = RemoteClassifier::new(&config).expect("client builds");

        let scores = classifier
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect("classified");
        assert_eq!(scores.get("happy"), Some(0.8));
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(json_response("not json"))
            .mount(&server)
            .await;

        let err = classifier_for(&server)
            .classify(Payload::image(&b"jpeg"[..]))
            .await
            .expect_err("garbage body");

        assert!(matches!(err, ClassifierError::InvalidResponse(_)));
    }
}
