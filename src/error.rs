//! Unified error type.

use std::fmt;

use http::StatusCode;

/// The error type returned by handlers and middleware.
///
/// The chain never creates or rewrites these: whatever a handler returns is
/// what the caller of the composed [`Handle`](crate::Handle) sees.
#[derive(Debug)]
pub enum Error {
    /// An HTTP-level failure with the status it should be rendered as.
    Status { status: StatusCode, message: String },
    /// A response header name or value was rejected.
    Header(String),
    /// Anything else a handler wants to bubble up. Rendered as `500`.
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into() }
    }

    pub fn not_found() -> Self {
        Self::status(StatusCode::NOT_FOUND, "not found")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(StatusCode::BAD_REQUEST, message)
    }

    /// Wraps any application error.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(err))
    }

    /// The status code this error renders as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::Header(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { message, .. } => f.write_str(message),
            Self::Header(msg) => write!(f, "invalid header: {msg}"),
            Self::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Other(Box::new(e))
    }
}

impl From<fmt::Error> for Error {
    fn from(e: fmt::Error) -> Self {
        Self::Other(Box::new(e))
    }
}
