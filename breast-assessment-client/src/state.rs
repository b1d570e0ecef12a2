use breast_assessment_core::{DiagnosisResult, InvalidImageReport};

use crate::error::DiagnosisError;

/// UI states of one assessment flow. Exactly one is active at a time; a
/// result and an image rejection are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AssessmentState {
    #[default]
    Idle,
    Loading,
    Result(DiagnosisResult),
    ImageError(InvalidImageReport),
    Failed(String),
}

/// The form's submit/response state machine:
/// idle → loading → {result, image error, failure} → (reset) → idle.
/// No transition skips loading.
#[derive(Debug, Default)]
pub struct AssessmentFlow {
    state: AssessmentState,
}

impl AssessmentFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AssessmentState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, AssessmentState::Loading)
    }

    /// Start a submission. Returns false while a request is outstanding or a
    /// terminal state is showing, which is how duplicate submissions are
    /// prevented.
    pub fn begin(&mut self) -> bool {
        if matches!(self.state, AssessmentState::Idle) {
            self.state = AssessmentState::Loading;
            true
        } else {
            false
        }
    }

    /// Settle the outstanding request into exactly one terminal state.
    /// Ignored unless a request is actually loading.
    pub fn complete(&mut self, outcome: Result<DiagnosisResult, DiagnosisError>) {
        if !self.is_loading() {
            return;
        }
        self.state = match outcome {
            Ok(result) => AssessmentState::Result(result),
            Err(DiagnosisError::InvalidImage(report)) => AssessmentState::ImageError(report),
            Err(err) => AssessmentState::Failed(err.user_message()),
        };
    }

    /// Back to the empty form from any state.
    pub fn reset(&mut self) {
        self.state = AssessmentState::Idle;
    }
}
