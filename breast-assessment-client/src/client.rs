use std::time::Duration;

use serde_json::Value;
use tracing::info;

use breast_assessment_core::{DiagnosisResult, InvalidImageReport, validate_request};

use crate::{encoder, error::DiagnosisError, form::AssessmentForm};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/diagnosis";

/// Generous enough to cover server-side model latency including image
/// analysis.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the diagnosis endpoint. One logical request in flight per
/// form; a failed attempt surfaces directly, with no retry.
pub struct DiagnosisClient {
    http: reqwest::Client,
    endpoint: String,
}

impl DiagnosisClient {
    pub fn new() -> Result<Self, DiagnosisError> {
        Self::with_endpoint(default_endpoint())
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, DiagnosisError> {
        Self::with_timeout(endpoint, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DiagnosisError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiagnosisError::Unexpected(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Run one submission end to end: gate check, request assembly, lazy
    /// image encode, validation, POST, response classification.
    pub async fn submit(&self, form: &AssessmentForm) -> Result<DiagnosisResult, DiagnosisError> {
        let mut request = form.to_request()?;

        // attach the inline payload just before transmission
        if let (Some(selected), Some(image_ref)) = (form.image(), request.medical_image.as_mut()) {
            let payload = encoder::encode_image(&selected.path).await?;
            image_ref.inline_data = Some(payload);
        }

        validate_request(&request).map_err(DiagnosisError::Validation)?;

        info!(
            endpoint = %self.endpoint,
            has_image = request.has_image(),
            "submitting diagnosis request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_transport_error)?;

        if (200..300).contains(&status) {
            serde_json::from_str::<DiagnosisResult>(&body)
                .map_err(|e| DiagnosisError::Unexpected(format!("malformed diagnosis response: {e}")))
        } else {
            Err(classify_error_body(status, &body))
        }
    }
}

fn default_endpoint() -> String {
    std::env::var("DIAGNOSIS_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
}

/// No response reached us: connection failures and timeout expiry both
/// classify as network errors rather than hanging or surfacing raw detail.
fn classify_transport_error(error: reqwest::Error) -> DiagnosisError {
    if error.is_decode() {
        DiagnosisError::Unexpected(error.to_string())
    } else {
        DiagnosisError::Network(error.to_string())
    }
}

/// An HTTP error body is either the structured image-rejection report or a
/// `{ message }` wrapper.
fn classify_error_body(status: u16, body: &str) -> DiagnosisError {
    if let Ok(report) = serde_json::from_str::<InvalidImageReport>(body) {
        if report.is_rejection() {
            return DiagnosisError::InvalidImage(report);
        }
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Server error occurred".to_string());

    DiagnosisError::Server { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejection_body_classifies_as_invalid_image() {
        let body = json!({
            "error": "INVALID_IMAGE",
            "message": "The image appears to be a selfie",
            "imageType": "personal photo",
            "suggestions": ["Upload a mammogram instead"]
        })
        .to_string();

        let err = classify_error_body(400, &body);
        let DiagnosisError::InvalidImage(report) = err else {
            panic!("expected an image rejection");
        };
        assert_eq!(report.image_type.as_deref(), Some("personal photo"));
    }

    #[test]
    fn message_body_classifies_as_server_error() {
        let err = classify_error_body(500, r#"{"message":"API service temporarily unavailable"}"#);
        assert!(matches!(
            err,
            DiagnosisError::Server { status: 500, ref message }
                if message == "API service temporarily unavailable"
        ));
    }

    #[test]
    fn unparsable_body_falls_back_to_generic_server_error() {
        let err = classify_error_body(502, "<html>bad gateway</html>");
        assert!(matches!(
            err,
            DiagnosisError::Server { status: 502, ref message } if message == "Server error occurred"
        ));
    }

    #[test]
    fn non_rejection_error_field_is_not_an_invalid_image() {
        let err = classify_error_body(400, r#"{"error":"OTHER","message":"nope"}"#);
        assert!(matches!(err, DiagnosisError::Server { .. }));
    }
}
