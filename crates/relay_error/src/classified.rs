//! Retry-eligibility classification.

use crate::ProviderError;

/// Two-valued retry eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ErrorClass {
    /// Retrying may help (rate limits, server errors, network failures)
    #[display("transient")]
    Transient,
    /// Retrying will not help
    #[display("fatal")]
    Fatal,
}

/// Trait for errors that know whether they are worth retrying.
pub trait RetryableError {
    /// Retry eligibility of this error.
    fn class(&self) -> ErrorClass;

    /// Check if this error should be retried.
    fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

/// A provider failure tagged with its retry eligibility.
///
/// The underlying [`ProviderError`] is preserved as the error source.
///
/// # Examples
///
/// ```
/// use relay_error::{
///     ClassifiedError, ErrorClass, ProviderError, ProviderErrorKind, RetryableError,
/// };
///
/// let cause = ProviderError::new("ollama", ProviderErrorKind::http(502, "bad gateway"));
/// let err = ClassifiedError::new(ErrorClass::Transient, cause);
/// assert!(err.is_retryable());
/// assert_eq!(err.cause().kind().status(), Some(502));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("{} error: {}", class, cause)]
pub struct ClassifiedError {
    class: ErrorClass,
    #[error(source)]
    cause: ProviderError,
}

impl ClassifiedError {
    /// Tag a provider error with a class.
    pub fn new(class: ErrorClass, cause: ProviderError) -> Self {
        Self { class, cause }
    }

    /// Shorthand for a transient failure.
    pub fn transient(cause: ProviderError) -> Self {
        Self::new(ErrorClass::Transient, cause)
    }

    /// Shorthand for a fatal failure.
    pub fn fatal(cause: ProviderError) -> Self {
        Self::new(ErrorClass::Fatal, cause)
    }

    /// The underlying provider error.
    pub fn cause(&self) -> &ProviderError {
        &self.cause
    }

    /// Whether this failure is fatal.
    pub fn is_fatal(&self) -> bool {
        self.class == ErrorClass::Fatal
    }
}

impl RetryableError for ClassifiedError {
    fn class(&self) -> ErrorClass {
        self.class
    }
}

/// Every candidate for a capability failed.
///
/// Always fatal; wraps the last underlying failure.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("all endpoints failed for capability {}: {}", capability, last)]
pub struct ExhaustionError {
    capability: String,
    #[error(source)]
    last: ClassifiedError,
    line: u32,
    file: &'static str,
}

impl ExhaustionError {
    /// Create a new exhaustion error with caller location tracking.
    #[track_caller]
    pub fn new(capability: impl Into<String>, last: ClassifiedError) -> Self {
        let location = std::panic::Location::caller();
        Self {
            capability: capability.into(),
            last,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Capability that could not be served.
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// The last failure observed before giving up.
    pub fn last(&self) -> &ClassifiedError {
        &self.last
    }
}
