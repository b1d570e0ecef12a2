use std::io::Write;
use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use breast_assessment_client::{
    AssessmentFlow, AssessmentState, DiagnosisClient, DiagnosisError, testkit,
};

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api/diagnosis")
}

#[tokio::test]
async fn successful_submission_returns_a_result() {
    let router = Router::new().route(
        "/api/diagnosis",
        post(|| async { (StatusCode::OK, Json(testkit::mock_success_response())) }),
    );
    let client = DiagnosisClient::with_endpoint(serve(router).await).unwrap();

    let result = client.submit(&testkit::sample_form()).await.unwrap();
    assert_eq!(result.diagnosis, "Benign breast tissue");
    assert_eq!(result.confidence, 75);
}

#[tokio::test]
async fn image_payload_is_encoded_before_transmission() {
    let router = Router::new().route(
        "/api/diagnosis",
        post(|Json(body): Json<Value>| async move {
            let payload = body["medicalImage"]["inlineData"]
                .as_str()
                .unwrap_or_default();
            if payload.is_empty() {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "missing inline payload" })),
                );
            }
            (StatusCode::OK, Json(testkit::mock_success_response()))
        }),
    );
    let endpoint = serve(router).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.png");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"fake image bytes")
        .unwrap();

    let mut form = testkit::sample_form();
    form.attach_image(&path).unwrap();

    let client = DiagnosisClient::with_endpoint(endpoint).unwrap();
    let result = client.submit(&form).await.unwrap();
    assert_eq!(result.diagnosis, "Benign breast tissue");
}

#[tokio::test]
async fn image_rejection_surfaces_as_invalid_image() {
    let router = Router::new().route(
        "/api/diagnosis",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(testkit::mock_invalid_image_response()),
            )
        }),
    );
    let client = DiagnosisClient::with_endpoint(serve(router).await).unwrap();

    let err = client.submit(&testkit::sample_form()).await.unwrap_err();
    let DiagnosisError::InvalidImage(report) = err else {
        panic!("expected an image rejection, got {err:?}");
    };
    assert_eq!(report.image_type.as_deref(), Some("selfie"));
    assert!(!report.suggestions.is_empty());
}

#[tokio::test]
async fn server_error_body_is_wrapped_with_its_message() {
    let router = Router::new().route(
        "/api/diagnosis",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(testkit::mock_error_response()),
            )
        }),
    );
    let client = DiagnosisClient::with_endpoint(serve(router).await).unwrap();

    let err = client.submit(&testkit::sample_form()).await.unwrap_err();
    assert!(matches!(
        err,
        DiagnosisError::Server { status: 500, ref message }
            if message == "API service temporarily unavailable"
    ));
}

#[tokio::test]
async fn quota_status_gets_try_later_messaging() {
    let router = Router::new().route(
        "/api/diagnosis",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "message": "API quota exceeded. Please try again later." })),
            )
        }),
    );
    let client = DiagnosisClient::with_endpoint(serve(router).await).unwrap();

    let err = client.submit(&testkit::sample_form()).await.unwrap_err();
    assert!(err.user_message().contains("try again later"));
}

#[tokio::test]
async fn invalid_age_is_rejected_before_any_network_call() {
    // nothing listens on the discard port; reaching the network would fail
    // with a different error class
    let client = DiagnosisClient::with_endpoint("http://127.0.0.1:9/api/diagnosis").unwrap();

    let err = client.submit(&testkit::invalid_age_form()).await.unwrap_err();
    let DiagnosisError::Validation(errors) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert!(errors.iter().any(|e| e.contains("between 1 and 120")));
}

#[tokio::test]
async fn connection_failure_classifies_as_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DiagnosisClient::with_endpoint(format!("http://{addr}/api/diagnosis")).unwrap();
    let err = client.submit(&testkit::sample_form()).await.unwrap_err();
    assert!(matches!(err, DiagnosisError::Network(_)));
}

#[tokio::test]
async fn timeout_ends_in_network_error_never_infinite_loading() {
    let router = Router::new().route(
        "/api/diagnosis",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            (StatusCode::OK, Json(testkit::mock_success_response()))
        }),
    );
    let endpoint = serve(router).await;
    let client = DiagnosisClient::with_timeout(endpoint, Duration::from_millis(200)).unwrap();

    let mut flow = AssessmentFlow::new();
    assert!(flow.begin());

    let outcome = client.submit(&testkit::sample_form()).await;
    assert!(matches!(outcome, Err(DiagnosisError::Network(_))));

    flow.complete(outcome);
    assert!(!flow.is_loading());
    assert!(matches!(flow.state(), AssessmentState::Failed(_)));
}
