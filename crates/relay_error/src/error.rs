//! Top-level error wrapper types.

use crate::{
    ClassifiedError, ConfigError, ErrorClass, ExhaustionError, ProviderError, RetryableError,
    StorageError, ValidationError,
};

/// Every failure the relay crates can surface.
///
/// # Examples
///
/// ```
/// use relay_error::{RelayError, ValidationError, ValidationErrorKind};
///
/// let err: RelayError = ValidationError::new(ValidationErrorKind::NoMessages).into();
/// assert!(format!("{}", err).contains("Validation Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum RelayErrorKind {
    /// Malformed request, rejected before any I/O
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Provider failure that has not been classified
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Provider failure tagged Transient or Fatal
    #[from(ClassifiedError)]
    Classified(ClassifiedError),
    /// All candidates for a capability failed
    #[from(ExhaustionError)]
    Exhaustion(ExhaustionError),
    /// Persistence failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Relay error with kind discrimination.
///
/// # Examples
///
/// ```
/// use relay_error::{ConfigError, RelayResult};
///
/// fn might_fail() -> RelayResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Relay Error: {}", _0)]
pub struct RelayError(Box<RelayErrorKind>);

impl RelayError {
    /// Create a new error from a kind.
    pub fn new(kind: RelayErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RelayErrorKind {
        &self.0
    }

    /// The classified failure, when this error carries one.
    pub fn as_classified(&self) -> Option<&ClassifiedError> {
        match self.kind() {
            RelayErrorKind::Classified(err) => Some(err),
            RelayErrorKind::Exhaustion(err) => Some(err.last()),
            _ => None,
        }
    }
}

impl RetryableError for RelayError {
    /// Only a bare classified failure can be transient; anything unclassified is fatal.
    fn class(&self) -> ErrorClass {
        match self.kind() {
            RelayErrorKind::Classified(err) => err.class(),
            _ => ErrorClass::Fatal,
        }
    }
}

// Generic From implementation for any type that converts to RelayErrorKind
impl<T> From<T> for RelayError
where
    T: Into<RelayErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = std::result::Result<T, RelayError>;
