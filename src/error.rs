use std::io;

use reqwest::StatusCode;

use crate::{multi::Multi, Capabilities, CapabilityError};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Response status outside the request's success set, with raw body.
    #[error("http error {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// Repositioning the request body before a retry failed.
    #[error("rewind request body: {0}")]
    Rewind(io::Error),
    /// Reading the request body failed.
    #[error("read request body: {0}")]
    Body(io::Error),
    /// The caller's cancellation token fired.
    #[error("request cancelled")]
    Cancelled,
    /// The caller's deadline passed before the call completed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    /// URL or header construction error.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Request payload serialization error.
    #[error("encode error: {0}")]
    Encode(String),
    /// Response decoding error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Any other error, typically produced by a custom [`crate::Doer`].
    #[error("{0}")]
    Custom(Box<dyn CapabilityError>),
    /// Two errors reported together; see [`crate::append`].
    #[error("{0}")]
    Multi(Box<Multi>),
}

impl Error {
    /// Wraps an arbitrary capability-bearing error.
    pub fn custom<E: CapabilityError>(err: E) -> Self {
        Self::Custom(Box::new(err))
    }

    /// Combines `self` with a later error, keeping the capabilities of both.
    pub fn append(self, next: Error) -> Self {
        Self::Multi(Box::new(Multi::new(self, next)))
    }

    /// Reports whether the call was aborted by the caller rather than failed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Returns the response status for [`Error::Status`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the composite parts when this is an [`Error::Multi`].
    pub fn as_multi(&self) -> Option<&Multi> {
        match self {
            Self::Multi(multi) => Some(multi),
            _ => None,
        }
    }
}

impl Capabilities for Error {
    fn conflict(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == StatusCode::CONFLICT,
            Self::Custom(err) => err.conflict(),
            Self::Multi(multi) => multi.conflict(),
            _ => false,
        }
    }

    fn exists(&self) -> bool {
        match self {
            Self::Custom(err) => err.exists(),
            Self::Multi(multi) => multi.exists(),
            _ => false,
        }
    }

    fn not_found(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == StatusCode::NOT_FOUND,
            Self::Custom(err) => err.not_found(),
            Self::Multi(multi) => multi.not_found(),
            _ => false,
        }
    }

    fn retry(&self) -> bool {
        match self {
            Self::Status { status, .. } => matches!(
                *status,
                StatusCode::TOO_MANY_REQUESTS
                    | StatusCode::INTERNAL_SERVER_ERROR
                    | StatusCode::BAD_GATEWAY
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::GATEWAY_TIMEOUT
            ),
            Self::Custom(err) => err.retry(),
            Self::Multi(multi) => multi.retry(),
            _ => false,
        }
    }

    // Rewind failures are terminal and must never look transient, whatever
    // the underlying io error kind.
    fn temporary(&self) -> bool {
        match self {
            Self::Transport(err) => err.temporary(),
            Self::Body(err) => err.temporary(),
            Self::Custom(err) => err.temporary(),
            Self::Multi(multi) => multi.temporary(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}
