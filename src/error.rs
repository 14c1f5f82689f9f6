//! Error types for the notification core.

use thiserror::Error;

/// Boxed error type observers may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for subject operations.
#[derive(Debug, Error)]
pub enum SubjectError {
    /// An observer failed during `notify`. The pass stops at the failing
    /// observer; later observers are not invoked.
    #[error("observer failed during notify: {0}")]
    Observer(#[source] BoxError),

    /// `notify` was called on a subject whose notify pass is already running.
    #[error("notify is already running on this subject")]
    ReentrantNotify,

    /// A shared observer's callable is already borrowed for invocation
    /// (the same observer reached re-entrantly through two subjects).
    #[error("observer is already being invoked")]
    ObserverBusy,
}

impl SubjectError {
    /// Wrap an arbitrary error as an observer failure.
    pub fn observer(err: impl Into<BoxError>) -> Self {
        SubjectError::Observer(err.into())
    }
}

/// Result type for subject operations.
pub type Result<T> = std::result::Result<T, SubjectError>;
