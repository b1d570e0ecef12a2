use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::models::{Answer, DiagnosisRequest};

/// Upper bound on the uploaded image, matching the limit advertised by the
/// intake form.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted by the upload filter. DICOM is deliberately absent.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Field-level validation of a submission. Collects every violation rather
/// than stopping at the first, so the caller can show the complete list.
///
/// The same checks run on both sides of the wire: the client gates
/// submission on them, the server re-validates before spending a model call.
pub fn validate_request(request: &DiagnosisRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if request.patient.name.trim().chars().count() < 2 {
        errors.push("Name must be at least 2 characters long".to_string());
    }

    if request.patient.age < 1 || request.patient.age > 120 {
        errors.push("Age must be between 1 and 120 years".to_string());
    }

    // The four detail fields are mandatory only when a lump is reported.
    if request.symptoms.feel_lump == Answer::Yes {
        if request.symptoms.hardness.is_none() {
            errors.push("Hardness of lump is required".to_string());
        }
        if request.symptoms.position.is_none() {
            errors.push("Position of lump is required".to_string());
        }
        if request.symptoms.pain_severity.is_none() {
            errors.push("Pain severity is required".to_string());
        }
        if request.symptoms.duration.is_none() {
            errors.push("Duration of symptoms is required".to_string());
        }
    }

    if let Some(image) = &request.medical_image {
        if !ACCEPTED_IMAGE_TYPES.contains(&image.mime_type.as_str()) {
            errors.push(format!("Unsupported image type: {}", image.mime_type));
        }
        if image.size > MAX_IMAGE_BYTES {
            errors.push("Medical image exceeds the 10MB limit".to_string());
        }
        if let Some(payload) = &image.inline_data {
            if payload.is_empty() || STANDARD.decode(payload).is_err() {
                errors.push("Medical image payload is not valid base64".to_string());
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
