//! Request validation errors.
//!
//! Validation failures are detected before any network I/O and are never retried.

/// Specific validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Request carried no capability
    #[display("capability is required")]
    MissingCapability,
    /// Request carried no messages
    #[display("at least one message is required")]
    NoMessages,
    /// Capability resolved to an empty candidate list
    #[display("no models configured for capability: {}", _0)]
    NoCandidates(String),
    /// A required identifier was empty
    #[display("{} is required", _0)]
    MissingId(&'static str),
    /// A query parameter had an unsupported value
    #[display("invalid {}: {}", field, value)]
    InvalidValue {
        /// Parameter name
        field: &'static str,
        /// Offending value
        value: String,
    },
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use relay_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::MissingId("loop_id"));
/// assert!(format!("{}", err).contains("loop_id is required"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    line: u32,
    file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}
