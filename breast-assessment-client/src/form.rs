use std::path::{Path, PathBuf};

use breast_assessment_core::{
    Answer, DiagnosisRequest, Hardness, LumpPosition, MedicalImageRef, PainSeverity, PatientInfo,
    SymptomDuration, SymptomSet,
};

use crate::encoder::mime_for_path;
use crate::error::DiagnosisError;

/// File chosen in the upload control. Only metadata is held here; the
/// payload is encoded lazily at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

/// In-memory form state: patient fields, the three required toggles, the
/// conditional lump details and at most one selected image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessmentForm {
    pub name: String,
    pub age: Option<u8>,
    pub symptoms: String,
    pub feel_lump: Option<Answer>,
    pub lump_painful: Option<Answer>,
    pub lump_stiff: Option<Answer>,
    pub hardness: Option<Hardness>,
    pub position: Option<LumpPosition>,
    pub pain_severity: Option<PainSeverity>,
    pub duration: Option<SymptomDuration>,
    pub(crate) image: Option<SelectedImage>,
}

impl AssessmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an image, replacing any prior selection. Fails when the file
    /// cannot be inspected or its extension falls outside the accept filter.
    pub fn attach_image(&mut self, path: impl AsRef<Path>) -> Result<(), DiagnosisError> {
        let path = path.as_ref();

        let mime_type = mime_for_path(path).ok_or_else(|| {
            DiagnosisError::Validation(vec![format!(
                "Unsupported image type: {}",
                path.display()
            )])
        })?;

        let metadata = std::fs::metadata(path).map_err(|e| {
            DiagnosisError::ImageProcessing(format!("could not read {}: {e}", path.display()))
        })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        self.image = Some(SelectedImage {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            mime_type: mime_type.to_string(),
        });
        Ok(())
    }

    /// Clear the selection entirely. No partial state is kept.
    pub fn remove_image(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    /// The client-side submission gate: all three toggles must be answered,
    /// and a reported lump additionally requires the four detail fields.
    /// With no lump reported those fields stay optional.
    pub fn is_submittable(&self) -> bool {
        let toggles_answered =
            self.feel_lump.is_some() && self.lump_painful.is_some() && self.lump_stiff.is_some();

        let details_complete = self.feel_lump != Some(Answer::Yes)
            || (self.hardness.is_some()
                && self.position.is_some()
                && self.pain_severity.is_some()
                && self.duration.is_some());

        toggles_answered && details_complete
    }

    /// Reset every field to its initial empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Assemble a fresh submission payload. The inline image payload is NOT
    /// attached here; the client encodes it just before the network call.
    pub fn to_request(&self) -> Result<DiagnosisRequest, DiagnosisError> {
        let (Some(feel_lump), Some(lump_painful), Some(lump_stiff)) =
            (self.feel_lump, self.lump_painful, self.lump_stiff)
        else {
            return Err(DiagnosisError::Validation(vec![
                "All assessment questions must be answered".to_string(),
            ]));
        };

        let Some(age) = self.age else {
            return Err(DiagnosisError::Validation(vec![
                "Age must be between 1 and 120 years".to_string(),
            ]));
        };

        Ok(DiagnosisRequest {
            patient: PatientInfo {
                name: self.name.clone(),
                age,
            },
            symptoms: SymptomSet {
                hardness: self.hardness,
                pain_severity: self.pain_severity,
                position: self.position,
                duration: self.duration,
                feel_lump,
                lump_painful,
                lump_stiff,
                symptoms: self.symptoms.clone(),
            },
            medical_image: self.image.as_ref().map(|image| MedicalImageRef {
                name: image.name.clone(),
                size: image.size,
                mime_type: image.mime_type.clone(),
                inline_data: None,
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}
