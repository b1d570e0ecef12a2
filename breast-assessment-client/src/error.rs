use breast_assessment_core::InvalidImageReport;
use thiserror::Error;

/// Everything that can go wrong between pressing submit and seeing a result.
/// Every variant maps to exactly one terminal UI state.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("failed to process medical image: {0}")]
    ImageProcessing(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("invalid medical image: {}", .0.message)]
    InvalidImage(InvalidImageReport),
    #[error("{0}")]
    Unexpected(String),
}

impl DiagnosisError {
    /// Text safe to present. Raw transport details, panics and unparsed
    /// bodies never pass through here.
    pub fn user_message(&self) -> String {
        match self {
            DiagnosisError::Validation(errors) => errors.join("\n"),
            DiagnosisError::ImageProcessing(_) => {
                "The selected image could not be read. Please choose a different file.".to_string()
            }
            DiagnosisError::Network(_) => {
                "Network error: Unable to connect to the diagnosis service".to_string()
            }
            DiagnosisError::Server { status: 429, .. } => {
                "API quota exceeded. Please try again later.".to_string()
            }
            DiagnosisError::Server { status: 401, .. } => {
                "Invalid API configuration. Please contact support.".to_string()
            }
            DiagnosisError::Server { message, .. } => format!("API Error: {message}"),
            DiagnosisError::InvalidImage(report) => report.message.clone(),
            DiagnosisError::Unexpected(_) => "An unexpected error occurred".to_string(),
        }
    }
}
