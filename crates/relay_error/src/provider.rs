//! Provider call failures.
//!
//! A [`ProviderError`] describes what went wrong while talking to one backend.
//! It carries the provider name and, for HTTP failures, the status code and a
//! truncated copy of the response body. Request headers are never captured, so
//! credentials cannot leak through error messages.

/// Maximum number of body characters kept in an HTTP error.
pub const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Specific provider failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Non-success HTTP status from the provider
    #[display("LLM API error (status {}): {}", status, body)]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },
    /// Connection could not be established or was interrupted
    #[display("connection failed: {}", _0)]
    Connection(String),
    /// Response body could not be read
    #[display("read response body: {}", _0)]
    BodyRead(String),
    /// Request could not be constructed before sending
    #[display("build request: {}", _0)]
    RequestBuild(String),
    /// Response payload could not be decoded
    #[display("parse response: {}", _0)]
    ResponseParse(String),
    /// Provider returned no completion choices
    #[display("no choices in response")]
    NoChoices,
    /// No adapter registered under the endpoint's provider name
    #[display("unknown provider: {}", _0)]
    UnknownProvider(String),
    /// Caller cancelled the call
    #[display("call cancelled")]
    Cancelled,
    /// Caller deadline elapsed
    #[display("deadline exceeded")]
    DeadlineExceeded,
}

impl ProviderErrorKind {
    /// Build an HTTP failure, truncating the body for diagnostics.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_error::ProviderErrorKind;
    ///
    /// let kind = ProviderErrorKind::http(503, &"x".repeat(300));
    /// let ProviderErrorKind::Http { body, .. } = kind else { unreachable!() };
    /// assert_eq!(body.chars().count(), 203);
    /// assert!(body.ends_with("..."));
    /// ```
    pub fn http(status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(ERROR_BODY_PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        Self::Http { status, body }
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Provider error with location tracking.
///
/// # Examples
///
/// ```
/// use relay_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new("anthropic", ProviderErrorKind::http(429, "slow down"));
/// assert_eq!(err.provider(), "anthropic");
/// assert_eq!(err.kind().status(), Some(429));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error [{}]: {} at line {} in {}", provider, kind, line, file)]
pub struct ProviderError {
    provider: String,
    kind: ProviderErrorKind,
    line: u32,
    file: &'static str,
}

impl ProviderError {
    /// Create a new provider error with caller location tracking.
    #[track_caller]
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            provider: provider.into(),
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Name of the provider that failed.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ProviderErrorKind {
        &self.kind
    }
}
