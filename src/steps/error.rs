//! Navigation failure reasons

use thiserror::Error;

use super::types::StepKey;

/// Why a navigation request left the active step unchanged.
///
/// None of these are fatal; the boolean navigation methods fold them into
/// `false` and the caller decides what to show the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no step is active")]
    Uninitialized,

    #[error("step '{0}' has blocking validation errors")]
    Blocked(StepKey),

    #[error("step '{0}' is the last step")]
    NoSuccessor(StepKey),

    #[error("step '{0}' is the first step")]
    NoPredecessor(StepKey),

    #[error("step '{0}' is not attached")]
    NotAttached(StepKey),
}

impl NavigationError {
    /// Whether the failure came from the validation gate
    pub fn is_blocked(&self) -> bool {
        matches!(self, NavigationError::Blocked(_))
    }
}
