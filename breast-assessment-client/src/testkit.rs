//! Explicit test utilities: canned forms, canned server responses and a
//! rule-based risk oracle. Invoked by tests and demos only; nothing here is
//! wired into the production pipeline.

use serde_json::{Value, json};

use breast_assessment_core::{
    Answer, Hardness, LumpPosition, PainSeverity, RiskLevel, SymptomDuration, SymptomSet,
};

use crate::form::AssessmentForm;

/// A complete, submittable form with a reported lump.
pub fn sample_form() -> AssessmentForm {
    AssessmentForm {
        name: "John Doe".to_string(),
        age: Some(35),
        symptoms: String::new(),
        feel_lump: Some(Answer::Yes),
        lump_painful: Some(Answer::No),
        lump_stiff: Some(Answer::No),
        hardness: Some(Hardness::Medium),
        position: Some(LumpPosition::Top),
        pain_severity: Some(PainSeverity::Mild),
        duration: Some(SymptomDuration::Weeks1To2),
        ..AssessmentForm::default()
    }
}

/// The high-risk reference scenario: hard lump with severe pain.
pub fn high_risk_form() -> AssessmentForm {
    AssessmentForm {
        hardness: Some(Hardness::Hard),
        pain_severity: Some(PainSeverity::Severe),
        lump_painful: Some(Answer::Yes),
        ..sample_form()
    }
}

/// A form that must be rejected before any network call is made.
pub fn invalid_age_form() -> AssessmentForm {
    AssessmentForm {
        age: Some(150),
        ..sample_form()
    }
}

/// A schema-valid diagnosis body as the server would return it.
pub fn mock_success_response() -> Value {
    json!({
        "diagnosis": "Benign breast tissue",
        "confidence": 75,
        "riskLevel": "Low",
        "recommendations": [
            "Monitor the lump for any changes in size or texture",
            "Schedule a follow-up appointment with your healthcare provider",
            "Perform regular self-examinations"
        ],
        "metadata": {
            "analysisDate": "2025-05-01T10:00:05Z",
            "patientAge": 35,
            "symptoms": {
                "hardness": "medium",
                "painSeverity": "mild",
                "position": "top",
                "duration": "1-2 weeks",
                "feelLump": "Yes",
                "lumpPainful": "No",
                "lumpStiff": "No",
                "symptoms": ""
            },
            "medicalImageProvided": false
        },
        "imageAnalyzed": false,
        "analysisMethod": "text-based"
    })
}

pub fn mock_error_response() -> Value {
    json!({ "message": "API service temporarily unavailable" })
}

pub fn mock_invalid_image_response() -> Value {
    json!({
        "error": "INVALID_IMAGE",
        "message": "The uploaded image appears to be a personal photo, not a medical image",
        "imageType": "selfie",
        "suggestions": [
            "Upload a mammogram, breast ultrasound, or breast MRI image",
            "Clinical breast examination photos are also accepted"
        ]
    })
}

/// Rule-based stand-in for the model's risk classification. Used only as a
/// test oracle, never as production logic.
pub fn risk_oracle(symptoms: &SymptomSet) -> RiskLevel {
    match (symptoms.hardness, symptoms.pain_severity) {
        (Some(Hardness::Hard), Some(PainSeverity::Severe)) => RiskLevel::High,
        (Some(Hardness::Hard), _) | (_, Some(PainSeverity::Moderate)) => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}
