use thiserror::Error;

/// Failure taxonomy of the planning engine.
///
/// `InvalidInput` is caused by the caller and is fixed by re-prompting the user.
/// `Configuration` means the allocation tables themselves are broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PlanError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Human-readable reason without the category prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidInput(reason) | Self::Configuration(reason) => reason,
        }
    }
}

/// Like `anyhow::ensure!`, but fails with `PlanError::InvalidInput`.
macro_rules! ensure_input {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::PlanError::InvalidInput(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_input;
