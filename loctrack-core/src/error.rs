use thiserror::Error;

/// Errors surfaced by the claim protocol.
///
/// A claim that loses to another owner is not an error; see
/// [`ClaimOutcome`](crate::types::ClaimOutcome).
#[derive(Debug, Error)]
pub enum CoordError {
    /// The lock or the claim store could not be reached within the bounded
    /// wait. Retry policy belongs to the caller; the tracker never retries
    /// internally.
    #[error("coordination unavailable: {reason}")]
    Unavailable { reason: String },

    /// A drained record could not be decoded. Fatal for the current
    /// process: continuing with an incomplete view of existing claims
    /// could hand the same interval to two owners.
    #[error("corrupt claim history: {reason}")]
    CorruptState { reason: String },

    /// `mark_processed` was called for an interval whose latest record is
    /// not held by the caller.
    #[error("interval {interval} is not owned by {owner}")]
    NotOwner { interval: String, owner: String },
}

impl CoordError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        CoordError::Unavailable {
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        CoordError::CorruptState {
            reason: reason.into(),
        }
    }
}

pub type CoordResult<T> = Result<T, CoordError>;
