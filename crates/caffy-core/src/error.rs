use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaffyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

}

impl CaffyError {
    /// Short error code string, stable across releases. Logged next to the
    /// message so failures can be grepped for.
    pub fn code(&self) -> &'static str {
        match self {
            CaffyError::Config(_) => "CONFIG_ERROR",
            CaffyError::InvalidDate { .. } => "INVALID_DATE",
            CaffyError::UnknownVariant { .. } => "UNKNOWN_VARIANT",
        }
    }
}

pub type Result<T> = std::result::Result<T, CaffyError>;
