pub mod backend;
pub mod config;
pub mod normalize;
pub mod prompt;
pub mod service;

pub use backend::{BackendError, CompletionBackend, OpenRouterBackend};
pub use config::ServiceConfig;
pub use normalize::{normalize_reply, ReplyOutcome};
pub use prompt::{build_prompt, AssessmentPrompt};
pub use service::{build_router, create_app, AppState};
