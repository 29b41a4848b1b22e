//! Error types for the relay workspace.
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! Provider failures additionally pass through a classifier that tags them
//! [`ErrorClass::Transient`] or [`ErrorClass::Fatal`]. Anything that never
//! received a class is treated as fatal.
//!
//! # Examples
//!
//! ```
//! use relay_error::{RelayResult, ValidationError, ValidationErrorKind};
//!
//! fn check(capability: &str) -> RelayResult<()> {
//!     if capability.is_empty() {
//!         Err(ValidationError::new(ValidationErrorKind::MissingCapability))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check("").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classified;
mod config;
mod error;
mod provider;
mod storage;
mod validation;

pub use classified::{ClassifiedError, ErrorClass, ExhaustionError, RetryableError};
pub use config::ConfigError;
pub use error::{RelayError, RelayErrorKind, RelayResult};
pub use provider::{ERROR_BODY_PREVIEW_CHARS, ProviderError, ProviderErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
