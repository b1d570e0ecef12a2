pub mod models;
pub mod validation;

pub use models::*;
pub use validation::{validate_request, ACCEPTED_IMAGE_TYPES, MAX_IMAGE_BYTES};
