use carematch_core::error::CoreError;
use carematch_core::types::DbId;

/// Error type for stores, saves and the guided session.
///
/// Wraps [`CoreError`] for domain failures (validation) and adds variants
/// for the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// A domain-level error from `carematch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backing store rejected a read or write.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile {0} not found")]
    ProfileNotFound(DbId),
}

/// Convenience alias used throughout the crate.
pub type OnboardingResult<T> = Result<T, OnboardingError>;
