use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use breast_assessment_core::{
    AnalysisMethod, DetailedAnalysis, DiagnosisRequest, DiagnosisResult, FollowUpProtocol,
    InvalidImageReport, ResultMetadata, RiskLevel,
};

/// Confidence assigned when the model reply did not carry a usable value.
const FALLBACK_CONFIDENCE: u8 = 85;

/// Longest excerpt of raw model text surfaced in a rejection message.
const REJECTION_EXCERPT_LEN: usize = 240;

const EXPLANATION_EXCERPT_LEN: usize = 600;

const FALLBACK_DIAGNOSIS: &str = "Assessment completed - please consult a healthcare provider";

const FALLBACK_RECOMMENDATIONS: [&str; 3] = [
    "Consult with a healthcare provider for proper evaluation",
    "Monitor symptoms and any changes",
    "Follow up as recommended by your doctor",
];

/// One model reply normalizes to exactly one of these.
#[derive(Debug)]
pub enum ReplyOutcome {
    Result(DiagnosisResult),
    InvalidImage(InvalidImageReport),
}

/// Lenient view of the model's JSON. Only `diagnosis` is mandatory; the
/// finishing pass stamps everything the model left out so a well-formed body
/// passes through untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    diagnosis: String,
    confidence: Option<u64>,
    risk_level: Option<RiskLevel>,
    risk_score: Option<u64>,
    #[serde(default)]
    recommendations: Vec<String>,
    explanation: Option<String>,
    detailed_analysis: Option<DetailedAnalysis>,
    follow_up_protocol: Option<FollowUpProtocol>,
    metadata: Option<ResultMetadata>,
    image_analyzed: Option<bool>,
    analysis_method: Option<AnalysisMethod>,
}

/// Normalize a raw model reply into a typed outcome.
///
/// The model is instructed to return pure JSON, but that is a request, not a
/// guarantee. The strict path validates against the schema; everything else
/// runs through the conservative text fallbacks. This function never fails:
/// a successful upstream call always produces either a result or an
/// image-rejection report.
pub fn normalize_reply(raw: &str, request: &DiagnosisRequest) -> ReplyOutcome {
    let cleaned = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        if is_rejection_object(&value) {
            return ReplyOutcome::InvalidImage(parse_rejection(value));
        }
        match serde_json::from_value::<ModelReply>(value) {
            Ok(reply) => return ReplyOutcome::Result(finish(reply, request)),
            Err(err) => warn!(error = %err, "model reply failed schema validation"),
        }
    }

    if contains_rejection_marker(cleaned) {
        return ReplyOutcome::InvalidImage(rejection_from_text(cleaned));
    }

    ReplyOutcome::Result(synthesize_from_text(cleaned, request))
}

/// Models wrap JSON in markdown fences often enough that stripping them is
/// part of the contract.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

fn is_rejection_object(value: &Value) -> bool {
    value
        .get("error")
        .and_then(Value::as_str)
        .is_some_and(|marker| marker == breast_assessment_core::INVALID_IMAGE_MARKER)
}

fn parse_rejection(value: Value) -> InvalidImageReport {
    serde_json::from_value(value).unwrap_or_else(|_| {
        InvalidImageReport::new("The uploaded image was judged not medically relevant")
    })
}

fn contains_rejection_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("invalid") || lower.contains("not appropriate")
}

fn rejection_from_text(text: &str) -> InvalidImageReport {
    let mut report = InvalidImageReport::new(truncate(text, REJECTION_EXCERPT_LEN));
    report.suggestions = vec![
        "Upload a mammogram, breast ultrasound, or breast MRI image".to_string(),
        "Clinical breast examination photos are also accepted".to_string(),
    ];
    report
}

/// Fill in whatever the model left out. A complete, in-range reply passes
/// through value-identical.
fn finish(reply: ModelReply, request: &DiagnosisRequest) -> DiagnosisResult {
    let image_provided = request.has_image();

    let recommendations = if reply.recommendations.is_empty() {
        FALLBACK_RECOMMENDATIONS.map(str::to_string).to_vec()
    } else {
        reply.recommendations
    };

    DiagnosisResult {
        diagnosis: reply.diagnosis,
        confidence: clamp_score(reply.confidence.unwrap_or(FALLBACK_CONFIDENCE as u64)),
        risk_level: reply.risk_level.unwrap_or(RiskLevel::Medium),
        risk_score: reply.risk_score.map(clamp_score),
        recommendations,
        explanation: reply.explanation,
        detailed_analysis: reply.detailed_analysis,
        follow_up_protocol: reply.follow_up_protocol,
        metadata: reply
            .metadata
            .unwrap_or_else(|| stamp_metadata(request)),
        image_analyzed: reply.image_analyzed.unwrap_or(image_provided),
        analysis_method: reply.analysis_method.unwrap_or(if image_provided {
            AnalysisMethod::VisionEnhanced
        } else {
            AnalysisMethod::TextBased
        }),
    }
}

/// Best-effort extraction from free text. Keyword anchors pull out nearby
/// sentences; anything not found gets a generic non-empty default so the
/// caller never sees a bare parse failure for a successful model call.
fn synthesize_from_text(raw: &str, request: &DiagnosisRequest) -> DiagnosisResult {
    let diagnosis =
        sentence_near(raw, "diagnosis").unwrap_or_else(|| FALLBACK_DIAGNOSIS.to_string());

    let mut recommendations: Vec<String> =
        FALLBACK_RECOMMENDATIONS.map(str::to_string).to_vec();
    if let Some(found) = sentence_near(raw, "recommend") {
        recommendations.insert(0, found);
    }

    let detailed_analysis = sentence_near(raw, "symptom").map(|evaluation| DetailedAnalysis {
        symptom_evaluation: Some(evaluation),
        risk_factors: None,
        differential_diagnosis: None,
        clinical_correlations: None,
    });

    let explanation = {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| truncate(trimmed, EXPLANATION_EXCERPT_LEN))
    };

    let image_provided = request.has_image();

    DiagnosisResult {
        diagnosis,
        confidence: FALLBACK_CONFIDENCE,
        risk_level: infer_risk_level(raw),
        risk_score: None,
        recommendations,
        explanation,
        detailed_analysis,
        follow_up_protocol: None,
        metadata: stamp_metadata(request),
        image_analyzed: image_provided,
        analysis_method: if image_provided {
            AnalysisMethod::VisionEnhanced
        } else {
            AnalysisMethod::TextBased
        },
    }
}

fn infer_risk_level(text: &str) -> RiskLevel {
    let lower = text.to_lowercase();
    if lower.contains("high") {
        RiskLevel::High
    } else if lower.contains("low") {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    }
}

fn stamp_metadata(request: &DiagnosisRequest) -> ResultMetadata {
    ResultMetadata {
        analysis_date: chrono::Utc::now().to_rfc3339(),
        patient_age: request.patient.age,
        symptoms: request.symptoms.clone(),
        medical_image_provided: request.has_image(),
    }
}

fn clamp_score(value: u64) -> u8 {
    value.min(100) as u8
}

/// Sentence containing the first case-insensitive occurrence of `anchor`.
/// Conservative: bails out rather than slicing when byte offsets between the
/// text and its lowercased form cannot be trusted.
fn sentence_near(text: &str, anchor: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let pos = lower.find(anchor)?;
    if text.len() != lower.len() || !text.is_char_boundary(pos) {
        return None;
    }

    let boundaries = &['.', '\n', '!', '?'][..];
    let start = text[..pos].rfind(boundaries).map_or(0, |i| i + 1);
    let end = text[pos..]
        .find(boundaries)
        .map_or(text.len(), |i| pos + i + 1);

    let sentence = text[start..end].trim();
    (!sentence.is_empty()).then(|| truncate(sentence, 300))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
