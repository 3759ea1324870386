//! Domain error type shared by the slider workflows.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SliderError {
    /// Field-level failures, accumulated in the order they were checked.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Slide {0} not found")]
    NotFound(i64),

    #[error("Invalid slide ID: {0}")]
    InvalidId(String),

    #[error("{0}")]
    ShopContext(String),

    #[error("Unable to get slide shop association information (id_slide: {0})")]
    ShopAssociation(i64),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl SliderError {
    /// Messages suitable for display to an administrator.
    pub fn messages(&self) -> Vec<String> {
        match self {
            SliderError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
