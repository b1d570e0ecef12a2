use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use breast_assessment_core::MAX_IMAGE_BYTES;

use crate::error::DiagnosisError;

/// Read the selected file and produce its base64 payload, without a
/// data-URL prefix. The size cap is checked before the file is read.
pub async fn encode_image(path: &Path) -> Result<String, DiagnosisError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        DiagnosisError::ImageProcessing(format!("could not read {}: {e}", path.display()))
    })?;

    if metadata.len() > MAX_IMAGE_BYTES {
        return Err(DiagnosisError::ImageProcessing(
            "Medical image exceeds the 10MB limit".to_string(),
        ));
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        DiagnosisError::ImageProcessing(format!("could not read {}: {e}", path.display()))
    })?;

    Ok(STANDARD.encode(&bytes))
}

/// Inverse of `encode_image`, accepting payloads with or without a data-URL
/// prefix.
pub fn decode_inline(payload: &str) -> Result<Vec<u8>, DiagnosisError> {
    STANDARD
        .decode(strip_data_url_prefix(payload))
        .map_err(|e| DiagnosisError::ImageProcessing(format!("invalid base64 payload: {e}")))
}

/// Only the encoded tail of a `data:<mime>;base64,<payload>` URL travels on
/// the wire.
pub fn strip_data_url_prefix(payload: &str) -> &str {
    match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    }
}

/// MIME type for an accepted image extension, `None` for anything outside
/// the accept filter.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    match path
        .extension()?
        .to_str()?
        .to_ascii_lowercase()
        .as_str()
    {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
