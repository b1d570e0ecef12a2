use breast_assessment_core::{DiagnosisRequest, SymptomSet};

/// The prompt text and the response schema below form one contract with the
/// model; bump the version whenever either side changes.
pub const PROMPT_VERSION: &str = "2";

pub const SAMPLING_TEMPERATURE: f64 = 0.3;
pub const MAX_COMPLETION_TOKENS: u32 = 1500;

/// Response contract embedded verbatim in the system instruction. Field
/// names mirror the `DiagnosisResult` wire shape.
const RESPONSE_SCHEMA: &str = r#"{
  "diagnosis": "Brief assessment description",
  "confidence": number (0-100),
  "riskLevel": "Low|Medium|High",
  "riskScore": number (0-100),
  "recommendations": ["list", "of", "recommendations"],
  "explanation": "Detailed explanation of the assessment",
  "detailedAnalysis": {
    "symptomEvaluation": "Evaluation of the reported symptoms",
    "riskFactors": ["relevant", "risk", "factors"],
    "differentialDiagnosis": ["possible", "alternative", "explanations"],
    "clinicalCorrelations": "How the findings relate clinically"
  },
  "followUpProtocol": {
    "urgency": "How soon professional evaluation is needed",
    "warningSigns": ["signs", "that", "warrant", "immediate", "care"],
    "monitoring": "What to monitor and how often"
  },
  "metadata": {
    "analysisDate": "ISO date string",
    "patientAge": number,
    "symptoms": object (echo of the submitted symptoms),
    "medicalImageProvided": boolean
  },
  "imageAnalyzed": boolean,
  "analysisMethod": "vision-enhanced|text-based"
}"#;

const IMAGE_VALIDATION_PROTOCOL: &str = r#"A medical image is attached to this request. Before producing any assessment, decide whether the image is medically relevant to breast health. Accept: mammograms, breast ultrasound scans, breast MRI imaging, and clinical breast examination photos. Reject: selfies, casual or unrelated photos, images of other body parts, screenshots, and any non-medical content.

If the image is NOT medically relevant, do not produce an assessment. Respond instead with ONLY this JSON object:
{
  "error": "INVALID_IMAGE",
  "message": "Short explanation of why the image was rejected",
  "imageType": "What the image appears to show",
  "suggestions": ["What the patient should upload instead"]
}

If the image is acceptable, incorporate the visual findings into the assessment, set "imageAnalyzed" to true and "analysisMethod" to "vision-enhanced"."#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// Complete instruction set for one model call. The image payload travels
/// inline with the text instructions, never by URL.
#[derive(Debug, Clone)]
pub struct AssessmentPrompt {
    pub system: String,
    pub user: String,
    pub image: Option<InlineImage>,
}

impl AssessmentPrompt {
    pub fn data_url(&self) -> Option<String> {
        self.image
            .as_ref()
            .map(|image| format!("data:{};base64,{}", image.mime_type, image.data))
    }
}

pub fn build_prompt(request: &DiagnosisRequest) -> AssessmentPrompt {
    let image = request.medical_image.as_ref().and_then(|image| {
        image.inline_data.as_ref().map(|data| InlineImage {
            mime_type: image.mime_type.clone(),
            data: data.clone(),
        })
    });

    AssessmentPrompt {
        system: system_prompt(image.is_some()),
        user: user_prompt(request),
        image,
    }
}

fn system_prompt(with_image: bool) -> String {
    let mut prompt = format!(
        "You are a medical AI assistant specializing in breast health assessment. \
         You provide educational information and risk assessments based on symptoms, \
         but always emphasize the need for professional medical consultation.\n\n\
         Respond with a single JSON object and nothing else, using this structure:\n{RESPONSE_SCHEMA}\n\n\
         IMPORTANT: Always include disclaimers about seeking professional medical \
         advice and that this is not a substitute for medical diagnosis."
    );

    if with_image {
        prompt.push_str("\n\n");
        prompt.push_str(IMAGE_VALIDATION_PROTOCOL);
    }

    prompt
}

fn user_prompt(request: &DiagnosisRequest) -> String {
    let image_info = match &request.medical_image {
        Some(image) => format!(
            "- Medical image provided: {} ({})",
            image.name, image.mime_type
        ),
        None => "- No medical image provided".to_string(),
    };

    format!(
        "Please provide a breast health risk assessment for the following patient information:\n\n\
         **Patient Information:**\n\
         - Name: {}\n\
         - Age: {} years\n\n\
         **Symptoms and Clinical Findings:**\n\
         {}\n\
         {}\n\n\
         **Additional Context:**\n\
         Please assess the potential risk level and provide educational recommendations. Consider factors such as:\n\
         - Age-related risk factors\n\
         - Symptom characteristics\n\
         - Duration and progression\n\
         - Need for professional medical evaluation\n\n\
         Remember to:\n\
         1. Provide a confidence level (0-100%) for your assessment\n\
         2. Categorize risk as Low, Medium, or High\n\
         3. Give specific, actionable recommendations\n\
         4. Include appropriate medical disclaimers\n\
         5. Emphasize the importance of professional medical consultation\n\n\
         Please respond in the JSON format specified in the system message.",
        request.patient.name,
        request.patient.age,
        symptom_lines(&request.symptoms),
        image_info,
    )
}

fn symptom_lines(symptoms: &SymptomSet) -> String {
    let description = if symptoms.symptoms.trim().is_empty() {
        "None provided"
    } else {
        symptoms.symptoms.trim()
    };

    [
        format!("- Feels a lump: {}", symptoms.feel_lump.label()),
        format!("- Lump is painful: {}", symptoms.lump_painful.label()),
        format!("- Lump feels stiff: {}", symptoms.lump_stiff.label()),
        format!(
            "- Lump hardness: {}",
            symptoms
                .hardness
                .map_or("Not provided", |hardness| hardness.label())
        ),
        format!(
            "- Lump position: {}",
            symptoms
                .position
                .map_or("Not provided", |position| position.label())
        ),
        format!(
            "- Pain severity: {}",
            symptoms
                .pain_severity
                .map_or("Not provided", |severity| severity.label())
        ),
        format!(
            "- Duration of symptoms: {}",
            symptoms
                .duration
                .map_or("Not provided", |duration| duration.label())
        ),
        format!("- Additional description: {description}"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use breast_assessment_core::{
        Answer, Hardness, LumpPosition, MedicalImageRef, PainSeverity, PatientInfo,
        SymptomDuration, SymptomSet,
    };

    fn request(with_image: bool) -> DiagnosisRequest {
        DiagnosisRequest {
            patient: PatientInfo {
                name: "Jane Doe".to_string(),
                age: 35,
            },
            symptoms: SymptomSet {
                hardness: Some(Hardness::Hard),
                pain_severity: Some(PainSeverity::Severe),
                position: Some(LumpPosition::NippleArea),
                duration: Some(SymptomDuration::Weeks1To2),
                feel_lump: Answer::Yes,
                lump_painful: Answer::Yes,
                lump_stiff: Answer::No,
                symptoms: "growing over two weeks".to_string(),
            },
            medical_image: with_image.then(|| MedicalImageRef {
                name: "scan.png".to_string(),
                size: 2048,
                mime_type: "image/png".to_string(),
                inline_data: Some("aGVsbG8=".to_string()),
            }),
            timestamp: "2025-05-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn system_prompt_fixes_the_response_contract() {
        let prompt = build_prompt(&request(false));
        assert!(prompt.system.contains("single JSON object"));
        assert!(prompt.system.contains("\"riskLevel\": \"Low|Medium|High\""));
        assert!(prompt.system.contains("\"analysisMethod\""));
        // no image, so no validation protocol
        assert!(!prompt.system.contains("INVALID_IMAGE"));
        assert!(prompt.image.is_none());
        assert!(prompt.data_url().is_none());
    }

    #[test]
    fn image_extends_the_instruction_set() {
        let prompt = build_prompt(&request(true));
        assert!(prompt.system.contains("INVALID_IMAGE"));
        assert!(prompt.system.contains("mammograms"));
        assert!(prompt.system.contains("selfies"));

        let url = prompt.data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,aGVsbG8="));
    }

    #[test]
    fn user_prompt_enumerates_every_symptom_field() {
        let prompt = build_prompt(&request(true));
        assert!(prompt.user.contains("- Name: Jane Doe"));
        assert!(prompt.user.contains("- Age: 35 years"));
        assert!(prompt.user.contains("- Feels a lump: Yes"));
        assert!(prompt.user.contains("- Lump is painful: Yes"));
        assert!(prompt.user.contains("- Lump feels stiff: No"));
        assert!(prompt.user.contains("- Lump hardness: Hard"));
        assert!(prompt.user.contains("- Lump position: Nipple Area"));
        assert!(prompt.user.contains("- Pain severity: Severe"));
        assert!(prompt.user.contains("- Duration of symptoms: 1-2 weeks"));
        assert!(prompt.user.contains("growing over two weeks"));
        assert!(prompt.user.contains("- Medical image provided: scan.png (image/png)"));
    }

    #[test]
    fn missing_conditional_fields_render_as_not_provided() {
        let mut req = request(false);
        req.symptoms.hardness = None;
        req.symptoms.position = None;
        req.symptoms.pain_severity = None;
        req.symptoms.duration = None;
        req.symptoms.symptoms = String::new();

        let prompt = build_prompt(&req);
        assert!(prompt.user.contains("- Lump hardness: Not provided"));
        assert!(prompt.user.contains("- Additional description: None provided"));
        assert!(prompt.user.contains("- No medical image provided"));
    }

    #[test]
    fn image_without_payload_falls_back_to_text_instructions() {
        let mut req = request(true);
        req.medical_image.as_mut().unwrap().inline_data = None;

        let prompt = build_prompt(&req);
        assert!(prompt.image.is_none());
        assert!(!prompt.system.contains("INVALID_IMAGE"));
    }
}
