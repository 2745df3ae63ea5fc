//! Error types
//!
//! Two layers of errors live here:
//!
//! - [`DomainError`]: the categorized error returned by repositories, transactions and
//!   gRPC handlers. It carries an [`ErrorCode`] mirroring the gRPC status taxonomy, an
//!   optional user-facing message and the underlying cause. It is converted into a
//!   [`tonic::Status`] only when it crosses the RPC boundary.
//! - [`Error`]: process-level failures (configuration, pool creation, sockets).

use std::fmt;

use thiserror::Error;

use crate::proto::ErrorDetails;

/// Boxed error used as the cause of a [`DomainError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// Domain Errors
// ============================================================================

/// Category of a [`DomainError`]
///
/// Discriminants match the gRPC status codes so the conversion is lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    Canceled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl ErrorCode {
    /// Symbolic name, used as the message when none was given
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Canceled => "Canceled",
            Self::Unknown => "Unknown",
            Self::InvalidArgument => "InvalidArgument",
            Self::DeadlineExceeded => "DeadlineExceeded",
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::PermissionDenied => "PermissionDenied",
            Self::ResourceExhausted => "ResourceExhausted",
            Self::FailedPrecondition => "FailedPrecondition",
            Self::Aborted => "Aborted",
            Self::OutOfRange => "OutOfRange",
            Self::Unimplemented => "Unimplemented",
            Self::Internal => "Internal",
            Self::Unavailable => "Unavailable",
            Self::DataLoss => "DataLoss",
            Self::Unauthenticated => "Unauthenticated",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorCode> for tonic::Code {
    fn from(code: ErrorCode) -> Self {
        tonic::Code::from_i32(code as i32)
    }
}

impl From<tonic::Code> for ErrorCode {
    fn from(code: tonic::Code) -> Self {
        match code {
            tonic::Code::Ok => Self::Ok,
            tonic::Code::Cancelled => Self::Canceled,
            tonic::Code::Unknown => Self::Unknown,
            tonic::Code::InvalidArgument => Self::InvalidArgument,
            tonic::Code::DeadlineExceeded => Self::DeadlineExceeded,
            tonic::Code::NotFound => Self::NotFound,
            tonic::Code::AlreadyExists => Self::AlreadyExists,
            tonic::Code::PermissionDenied => Self::PermissionDenied,
            tonic::Code::ResourceExhausted => Self::ResourceExhausted,
            tonic::Code::FailedPrecondition => Self::FailedPrecondition,
            tonic::Code::Aborted => Self::Aborted,
            tonic::Code::OutOfRange => Self::OutOfRange,
            tonic::Code::Unimplemented => Self::Unimplemented,
            tonic::Code::Internal => Self::Internal,
            tonic::Code::Unavailable => Self::Unavailable,
            tonic::Code::DataLoss => Self::DataLoss,
            tonic::Code::Unauthenticated => Self::Unauthenticated,
        }
    }
}

/// Application error tagged with a category code
///
/// `Display` renders the cause (falling back to [`DomainError::message`] when there is
/// none), while [`DomainError::message`] is the text shown to API clients.
#[derive(Debug)]
pub struct DomainError {
    code: ErrorCode,
    message: Option<String>,
    cause: Option<BoxError>,
}

impl DomainError {
    /// Wrap a cause with a category
    pub fn wrap(code: ErrorCode, cause: impl Into<BoxError>) -> Self {
        Self {
            code,
            message: None,
            cause: Some(cause.into()),
        }
    }

    /// Wrap a cause with a category and a user-facing message
    pub fn wrap_msg(code: ErrorCode, message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            cause: Some(cause.into()),
        }
    }

    /// Error whose cause is its own message
    pub fn code_msg(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            code,
            cause: Some(message.clone().into()),
            message: Some(message),
        }
    }

    /// Replace the user-facing message, keeping code and cause
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Shorthand for an `Internal` error
    pub fn internal(cause: impl Into<BoxError>) -> Self {
        Self::wrap(ErrorCode::Internal, cause)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Explicit message, or the symbolic name of the code
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_else(|| self.code.as_str())
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Project into a gRPC status
    ///
    /// The cause travels as an encoded [`ErrorDetails`] payload. If it cannot be
    /// encoded the bare status (code and message only) is returned.
    pub fn to_status(&self) -> tonic::Status {
        let code = tonic::Code::from(self.code);
        let message = self.message().to_string();

        let details = ErrorDetails {
            details: self.to_string(),
        };
        let mut buf = Vec::new();
        match prost::Message::encode(&details, &mut buf) {
            Ok(()) => tonic::Status::with_details(code, message, buf.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode status details");
                tonic::Status::new(code, message)
            }
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}", cause),
            None => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for DomainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<DomainError> for tonic::Status {
    fn from(err: DomainError) -> Self {
        err.to_status()
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::wrap(ErrorCode::NotFound, err),
            other => Self::wrap(ErrorCode::Internal, other),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::wrap(ErrorCode::InvalidArgument, err)
    }
}

/// Result alias for domain operations
pub type DomainResult<T> = std::result::Result<T, DomainError>;

// ============================================================================
// Process Errors
// ============================================================================

/// Errors raised while assembling or running the service
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Database connection error
    #[error("Database error: {0}")]
    Database(String),

    /// gRPC transport error
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

/// Result type alias for process-level operations
pub type Result<T> = std::result::Result<T, Error>;
