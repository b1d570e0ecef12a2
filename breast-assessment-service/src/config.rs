use anyhow::anyhow;

pub const DEFAULT_TEXT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_VISION_MODEL: &str = "openai/gpt-4.1-mini";

/// Configuration for the assessment service, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: String,
    pub text_model: String,
    pub vision_model: String,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| anyhow!("OPENROUTER_API_KEY environment variable is required"))?;

        Ok(Self {
            api_key,
            text_model: std::env::var("ASSESSMENT_MODEL")
                .unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string()),
            vision_model: std::env::var("ASSESSMENT_VISION_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string()),
        })
    }
}
