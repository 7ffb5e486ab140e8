use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for typed store operations.
///
/// Every failure surfaced by the access layer carries one of these kinds, so callers can
/// branch on the classification instead of parsing messages. The classification of a
/// failure is identical across the blocking, deferred and streaming execution modes.
///
/// # Examples
///
/// ```rust,ignore
/// use typedstore::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
///
/// fn example() -> TypedStoreResult<()> {
///     Err(TypedStoreError::new("No document found for id doc-1", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Retrieval errors
    /// No document exists at the requested identifier
    NotFound,
    /// The supplied document identifier is empty or otherwise unusable
    InvalidId,

    // Type resolution and mapping errors
    /// The requested entity type has no resolvable identifier field
    InvalidEntityType,
    /// A raw record could not be mapped onto the requested entity type
    ObjectMappingError,

    // Query errors
    /// The query descriptor is malformed (missing view name, inverted bounds, ...)
    InvalidQuery,

    // Store errors
    /// Failure reported by the underlying store client, propagated as is
    StoreCommunicationError,

    // Operation errors
    /// The operation is not valid in the current context
    InvalidOperation,
    /// The template could not be configured
    ConfigurationError,
    /// A deferred or streamed retrieval was cancelled before it completed
    Cancelled,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidEntityType => write!(f, "Invalid entity type"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InvalidQuery => write!(f, "Invalid query"),
            ErrorKind::StoreCommunicationError => write!(f, "Store communication error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::Cancelled => write!(f, "Cancelled"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom typed store error.
///
/// `TypedStoreError` carries the error message, its [ErrorKind], an optional cause and the
/// backtrace captured where the error was raised. Cloning is cheap; the backtrace is shared.
///
/// # Examples
///
/// ```rust,ignore
/// use typedstore::errors::{ErrorKind, TypedStoreError};
///
/// let err = TypedStoreError::new("Connection reset", ErrorKind::StoreCommunicationError);
///
/// let cause = TypedStoreError::new("Value is not a string", ErrorKind::ObjectMappingError);
/// let err = TypedStoreError::new_with_cause("Failed to map record", ErrorKind::ObjectMappingError, cause);
/// ```
#[derive(Clone)]
pub struct TypedStoreError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<TypedStoreError>>,
    backtrace: Arc<Backtrace>,
}

impl TypedStoreError {
    /// Creates a new error with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        TypedStoreError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new error chained onto `cause`.
    ///
    /// The cause is kept for [Error::source] and printed by the `Debug` representation.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: TypedStoreError) -> Self {
        TypedStoreError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&TypedStoreError> {
        self.cause.as_deref()
    }
}

impl Display for TypedStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for TypedStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for TypedStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for typed store operations.
pub type TypedStoreResult<T> = Result<T, TypedStoreError>;

#[cfg(feature = "serde")]
impl serde::de::Error for TypedStoreError {
    fn custom<T: Display>(msg: T) -> Self {
        TypedStoreError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for TypedStoreError {
    fn custom<T: Display>(msg: T) -> Self {
        TypedStoreError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::fmt::Error> for TypedStoreError {
    fn from(err: std::fmt::Error) -> Self {
        TypedStoreError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<std::num::ParseIntError> for TypedStoreError {
    fn from(err: std::num::ParseIntError) -> Self {
        TypedStoreError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::ObjectMappingError,
        )
    }
}

impl From<tokio::task::JoinError> for TypedStoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            TypedStoreError::new("Retrieval task was cancelled", ErrorKind::Cancelled)
        } else {
            TypedStoreError::new(
                &format!("Retrieval task failed: {}", err),
                ErrorKind::InternalError,
            )
        }
    }
}
