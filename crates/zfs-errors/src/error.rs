use thiserror::Error;

use crate::code::ZfsErrorCode;

/// The failure value handed back by every error-recording call.
///
/// It is a snapshot of the handle's error slot at the moment of recording:
/// the code, what was being attempted, and the description a user should
/// see. Reading the handle afterwards gives the same answer until the next
/// error is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{action}: {description}")]
pub struct ZfsError {
    code: ZfsErrorCode,
    action: String,
    description: String,
}

impl ZfsError {
    pub fn new(
        code: ZfsErrorCode,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code,
            action: action.into(),
            description: description.into(),
        }
    }

    #[inline]
    pub fn code(&self) -> ZfsErrorCode {
        self.code
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Convenience alias for results that fail with a recorded domain error.
pub type ZfsResult<T> = Result<T, ZfsError>;
