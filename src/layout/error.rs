use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout document is empty")]
    Empty,

    #[error("layout document is not valid JSON: {0}")]
    Parse(String),

    #[error("layout canvas has invalid extent {width}x{height}")]
    InvalidCanvas { width: f32, height: f32 },

    #[error("slot {index} is invalid: {reason}")]
    InvalidSlot { index: usize, reason: String },

    #[error("failed to serialize layout: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LayoutError {
    pub(super) fn slot(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSlot {
            index,
            reason: reason.into(),
        }
    }
}
