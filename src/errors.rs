use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for repository operations.
///
/// Each kind describes one category of failure. The repository performs no
/// local recovery, so every failure from the document store is classified
/// into one of these kinds and propagated unchanged to the caller.
///
/// # Examples
///
/// ```rust,ignore
/// use mongocrud::errors::{RepoError, ErrorKind, RepoResult};
///
/// fn example() -> RepoResult<()> {
///     Err(RepoError::new("no record with id 42", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The store could not be reached (connection, DNS, or server selection failure)
    StoreUnavailable,
    /// A query that promised exactly one result found none
    NotFound,
    /// The store rejected a write (constraint or validation failure)
    WriteRejected,
    /// A uniqueness constraint could not be declared, typically because
    /// existing records already contain duplicates
    ConstraintCreationFailed,
    /// A regular-expression pattern failed local validation
    InvalidPattern,
    /// A record could not be converted to or from its stored representation
    ObjectMappingError,
    /// Any other failure reported by the store
    StoreError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::StoreUnavailable => write!(f, "Store unavailable"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::WriteRejected => write!(f, "Write rejected"),
            ErrorKind::ConstraintCreationFailed => write!(f, "Constraint creation failed"),
            ErrorKind::InvalidPattern => write!(f, "Invalid pattern"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::StoreError => write!(f, "Store error"),
        }
    }
}

/// Repository error type.
///
/// `RepoError` carries the error message, its [`ErrorKind`], an optional
/// cause for error chaining, and a backtrace captured at construction time.
///
/// # Examples
///
/// ```rust,ignore
/// use mongocrud::errors::{RepoError, ErrorKind};
///
/// let err = RepoError::new("no record with id 42", ErrorKind::NotFound);
///
/// let cause = RepoError::new("duplicate key", ErrorKind::WriteRejected);
/// let err = RepoError::new_with_cause(
///     "unique index on 'email' could not be created",
///     ErrorKind::ConstraintCreationFailed,
///     cause,
/// );
/// ```
#[derive(Clone)]
pub struct RepoError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RepoError>>,
    backtrace: Backtrace,
}

impl RepoError {
    /// Creates a new `RepoError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RepoError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Backtrace::new(),
        }
    }

    /// Creates a new `RepoError` with a cause error attached.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RepoError) -> Self {
        RepoError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RepoError> {
        self.cause.as_deref()
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for repository operations.
///
/// `RepoResult<T>` is shorthand for `Result<T, RepoError>`. All fallible
/// repository operations return this type.
pub type RepoResult<T> = Result<T, RepoError>;

// From trait implementations for automatic error conversion
impl From<mongodb::error::Error> for RepoError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind as DriverKind;
        let error_kind = match err.kind.as_ref() {
            DriverKind::ServerSelection { .. }
            | DriverKind::Io(_)
            | DriverKind::DnsResolve { .. }
            | DriverKind::ConnectionPoolCleared { .. }
            | DriverKind::Authentication { .. } => ErrorKind::StoreUnavailable,
            DriverKind::Write(_) | DriverKind::Command(_) => ErrorKind::WriteRejected,
            DriverKind::BsonSerialization(_) | DriverKind::BsonDeserialization(_) => {
                ErrorKind::ObjectMappingError
            }
            _ => ErrorKind::StoreError,
        };
        RepoError::new(&format!("Document store error: {}", err), error_kind)
    }
}

impl From<regex::Error> for RepoError {
    fn from(err: regex::Error) -> Self {
        RepoError::new(
            &format!("Invalid regular expression: {}", err),
            ErrorKind::InvalidPattern,
        )
    }
}

impl From<String> for RepoError {
    fn from(msg: String) -> Self {
        RepoError::new(&msg, ErrorKind::StoreError)
    }
}

impl From<&str> for RepoError {
    fn from(msg: &str) -> Self {
        RepoError::new(msg, ErrorKind::StoreError)
    }
}
