pub mod client;
pub mod encoder;
pub mod error;
pub mod form;
pub mod state;
pub mod testkit;

pub use client::{DiagnosisClient, DEFAULT_ENDPOINT, REQUEST_TIMEOUT};
pub use error::DiagnosisError;
pub use form::{AssessmentForm, SelectedImage};
pub use state::{AssessmentFlow, AssessmentState};
