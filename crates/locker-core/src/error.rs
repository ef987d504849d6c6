//! Error types for the lock engine

use locker_store::StoreError;
use thiserror::Error;

pub type LockResult<T> = Result<T, LockError>;

/// Failures of a lock operation.
///
/// Ownership mismatches and contention are reported as outcomes, not errors.
#[derive(Error, Debug)]
pub enum LockError {
    /// The shared store failed; the operation was abandoned
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The lock was released between the failed set and the follow-up read
    #[error("lock '{0}' was released while it was being read")]
    Vanished(String),
}
