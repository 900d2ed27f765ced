use crate::schema::validate::ValidationErrors;

/// Result alias used across the conversion pipeline.
pub type TgsResult<T> = Result<T, TgsError>;

/// Fatal conversion errors.
///
/// Any of these aborts the conversion; no partial result is produced.
#[derive(thiserror::Error, Debug)]
pub enum TgsError {
    /// The input looked compressed but could not be inflated.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// The (inflated) payload is not valid Lottie JSON.
    #[error("malformed json: {0}")]
    MalformedJson(String),

    /// Strict validation found fatal structural problems.
    #[error("validation error: {0}")]
    Validation(ValidationErrors),

    /// The animation data could not be turned into a bundle.
    #[error("generation error: {0}")]
    Generation(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TgsError {
    /// Build a [`TgsError::Decompression`].
    pub fn decompression(msg: impl Into<String>) -> Self {
        Self::Decompression(msg.into())
    }

    /// Build a [`TgsError::MalformedJson`].
    pub fn malformed_json(msg: impl Into<String>) -> Self {
        Self::MalformedJson(msg.into())
    }

    /// Build a [`TgsError::Generation`].
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }
}

impl From<ValidationErrors> for TgsError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
