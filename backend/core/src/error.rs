use thiserror::Error;

/// Top-level error type for the redial runtime.
#[derive(Debug, Error)]
pub enum RedialError {
    /// An operation was called in a state that does not allow it
    /// (starting a run twice, or starting with no contacts).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A policy value was outside its configured bounds.
    #[error("invalid argument `{field}`: {message}")]
    InvalidArgument { field: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RedialError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = RedialError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_names_the_field() {
        let err = RedialError::invalid_argument("maxAttempts", "must be between 1 and 10");
        assert_eq!(
            err.to_string(),
            "invalid argument `maxAttempts`: must be between 1 and 10"
        );
    }
}
