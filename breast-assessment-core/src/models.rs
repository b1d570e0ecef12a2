use serde::{Deserialize, Serialize};

/// Marker value carried in the `error` field of an image-rejection body.
pub const INVALID_IMAGE_MARKER: &str = "INVALID_IMAGE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hardness {
    Soft,
    Medium,
    Hard,
}

impl Hardness {
    pub fn label(&self) -> &'static str {
        match self {
            Hardness::Soft => "Soft",
            Hardness::Medium => "Medium",
            Hardness::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PainSeverity {
    None,
    Mild,
    Moderate,
    Severe,
}

impl PainSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            PainSeverity::None => "None",
            PainSeverity::Mild => "Mild",
            PainSeverity::Moderate => "Moderate",
            PainSeverity::Severe => "Severe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LumpPosition {
    Top,
    Bottom,
    NippleArea,
}

impl LumpPosition {
    pub fn label(&self) -> &'static str {
        match self {
            LumpPosition::Top => "Top",
            LumpPosition::Bottom => "Bottom",
            LumpPosition::NippleArea => "Nipple Area",
        }
    }
}

/// The eight fixed duration buckets offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymptomDuration {
    #[serde(rename = "1-3 days")]
    Days1To3,
    #[serde(rename = "4-7 days")]
    Days4To7,
    #[serde(rename = "1-2 weeks")]
    Weeks1To2,
    #[serde(rename = "3-4 weeks")]
    Weeks3To4,
    #[serde(rename = "1-3 months")]
    Months1To3,
    #[serde(rename = "3-6 months")]
    Months3To6,
    #[serde(rename = "6-12 months")]
    Months6To12,
    #[serde(rename = "over 1 year")]
    OverOneYear,
}

impl SymptomDuration {
    pub fn label(&self) -> &'static str {
        match self {
            SymptomDuration::Days1To3 => "1-3 days",
            SymptomDuration::Days4To7 => "4-7 days",
            SymptomDuration::Weeks1To2 => "1-2 weeks",
            SymptomDuration::Weeks3To4 => "3-4 weeks",
            SymptomDuration::Months1To3 => "1-3 months",
            SymptomDuration::Months3To6 => "3-6 months",
            SymptomDuration::Months6To12 => "6-12 months",
            SymptomDuration::OverOneYear => "over 1 year",
        }
    }
}

/// Yes/No answer to one of the required assessment toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn label(&self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMethod {
    #[serde(rename = "vision-enhanced")]
    VisionEnhanced,
    #[serde(rename = "text-based")]
    TextBased,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub name: String,
    pub age: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardness: Option<Hardness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_severity: Option<PainSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<LumpPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<SymptomDuration>,
    pub feel_lump: Answer,
    pub lump_painful: Answer,
    pub lump_stiff: Answer,
    /// Free-text symptom description, may be empty.
    #[serde(default)]
    pub symptoms: String,
}

/// Reference to the uploaded image. `inline_data` is attached lazily just
/// before network submission so the form can hold a selection without
/// keeping the encoded payload in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalImageRef {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    pub patient: PatientInfo,
    pub symptoms: SymptomSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_image: Option<MedicalImageRef>,
    /// ISO-8601 submission time, stamped fresh per submission.
    pub timestamp: String,
}

impl DiagnosisRequest {
    pub fn has_image(&self) -> bool {
        self.medical_image.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_evaluation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differential_diagnosis: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_correlations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpProtocol {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warning_signs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub analysis_date: String,
    pub patient_age: u8,
    pub symptoms: SymptomSet,
    pub medical_image_provided: bool,
}

/// Narrative assessment returned to the form. Produced once per request and
/// held in UI state until reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub diagnosis: String,
    pub confidence: u8,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<DetailedAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_protocol: Option<FollowUpProtocol>,
    pub metadata: ResultMetadata,
    #[serde(default)]
    pub image_analyzed: bool,
    pub analysis_method: AnalysisMethod,
}

/// Terminal image-rejection state, mutually exclusive with a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidImageReport {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl InvalidImageReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: INVALID_IMAGE_MARKER.to_string(),
            message: message.into(),
            image_type: None,
            suggestions: Vec::new(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.error == INVALID_IMAGE_MARKER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn symptom_enums_use_wire_strings() {
        assert_eq!(serde_json::to_value(Hardness::Hard).unwrap(), json!("hard"));
        assert_eq!(
            serde_json::to_value(LumpPosition::NippleArea).unwrap(),
            json!("nipple_area")
        );
        assert_eq!(
            serde_json::to_value(SymptomDuration::Weeks3To4).unwrap(),
            json!("3-4 weeks")
        );
        assert_eq!(serde_json::to_value(Answer::Yes).unwrap(), json!("Yes"));
        assert_eq!(
            serde_json::to_value(AnalysisMethod::VisionEnhanced).unwrap(),
            json!("vision-enhanced")
        );
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = DiagnosisRequest {
            patient: PatientInfo {
                name: "Jane Doe".to_string(),
                age: 41,
            },
            symptoms: SymptomSet {
                hardness: Some(Hardness::Medium),
                pain_severity: Some(PainSeverity::Mild),
                position: Some(LumpPosition::Top),
                duration: Some(SymptomDuration::Weeks1To2),
                feel_lump: Answer::Yes,
                lump_painful: Answer::No,
                lump_stiff: Answer::Yes,
                symptoms: String::new(),
            },
            medical_image: Some(MedicalImageRef {
                name: "scan.png".to_string(),
                size: 1024,
                mime_type: "image/png".to_string(),
                inline_data: None,
            }),
            timestamp: "2025-05-01T10:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["symptoms"]["feelLump"], json!("Yes"));
        assert_eq!(value["symptoms"]["painSeverity"], json!("mild"));
        assert_eq!(value["medicalImage"]["type"], json!("image/png"));
        // inline payload not yet attached, so the key must be absent
        assert!(value["medicalImage"].get("inlineData").is_none());
    }

    #[test]
    fn conditional_fields_may_be_absent_on_the_wire() {
        let body = json!({
            "patient": { "name": "Jane Doe", "age": 29 },
            "symptoms": {
                "feelLump": "No",
                "lumpPainful": "No",
                "lumpStiff": "No"
            },
            "timestamp": "2025-05-01T10:00:00Z"
        });

        let request: DiagnosisRequest = serde_json::from_value(body).unwrap();
        assert!(request.symptoms.hardness.is_none());
        assert!(request.symptoms.duration.is_none());
        assert!(request.symptoms.symptoms.is_empty());
        assert!(!request.has_image());
    }

    #[test]
    fn invalid_image_report_carries_marker() {
        let report = InvalidImageReport::new("not a medical image");
        assert!(report.is_rejection());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["error"], json!("INVALID_IMAGE"));
        assert!(value.get("imageType").is_none());
    }
}
