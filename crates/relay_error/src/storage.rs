//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write an entry
    #[display("Failed to write entry: {}", _0)]
    Write(String),
    /// Failed to read an entry
    #[display("Failed to read entry: {}", _0)]
    Read(String),
    /// Failed to list keys
    #[display("Failed to list keys: {}", _0)]
    ListKeys(String),
    /// Key cannot be stored by this backend
    #[display("Invalid key: {}", _0)]
    InvalidKey(String),
    /// Record could not be encoded
    #[display("Failed to serialize record: {}", _0)]
    Serialization(String),
    /// Stored bytes could not be decoded
    #[display("Failed to deserialize record: {}", _0)]
    Deserialization(String),
    /// Store initialization failed
    #[display("Store initialization failed: {}", _0)]
    Initialization(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use relay_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::InvalidKey("../escape".to_string()));
/// assert!(format!("{}", err).contains("Invalid key"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
