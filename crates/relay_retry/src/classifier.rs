//! Transient/Fatal classification of provider failures.
//!
//! Anything not explicitly recognized as transient is fatal, so an unknown
//! condition is never retried indefinitely.

use relay_error::{ClassifiedError, ErrorClass, ProviderError, ProviderErrorKind};

/// Retry eligibility of an HTTP status code.
///
/// # Examples
///
/// ```
/// use relay_error::ErrorClass;
/// use relay_retry::classify_status;
///
/// assert_eq!(classify_status(429), ErrorClass::Transient);
/// assert_eq!(classify_status(503), ErrorClass::Transient);
/// assert_eq!(classify_status(401), ErrorClass::Fatal);
/// assert_eq!(classify_status(418), ErrorClass::Fatal);
/// ```
pub fn classify_status(status: u16) -> ErrorClass {
    match status {
        429 | 500..=599 => ErrorClass::Transient,
        _ => ErrorClass::Fatal,
    }
}

/// Tag a provider failure, keeping it as the cause.
pub fn classify(err: ProviderError) -> ClassifiedError {
    let class = match err.kind() {
        ProviderErrorKind::Http { status, .. } => classify_status(*status),
        ProviderErrorKind::Connection(_) | ProviderErrorKind::BodyRead(_) => ErrorClass::Transient,
        ProviderErrorKind::RequestBuild(_)
        | ProviderErrorKind::ResponseParse(_)
        | ProviderErrorKind::NoChoices
        | ProviderErrorKind::UnknownProvider(_)
        | ProviderErrorKind::Cancelled
        | ProviderErrorKind::DeadlineExceeded => ErrorClass::Fatal,
    };
    ClassifiedError::new(class, err)
}

/// Map a transport failure from the HTTP client onto a provider error kind.
///
/// Failures raised while assembling the request (bad URL, bad header) are
/// construction errors; everything that happened on the wire is a connection
/// or body-read failure.
pub fn transport_error_kind(err: &reqwest::Error) -> ProviderErrorKind {
    if err.is_builder() {
        ProviderErrorKind::RequestBuild(err.to_string())
    } else if err.is_body() || err.is_decode() {
        ProviderErrorKind::BodyRead(err.to_string())
    } else {
        ProviderErrorKind::Connection(err.to_string())
    }
}
