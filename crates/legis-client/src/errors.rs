use crate::endpoint::Endpoint;

/// Terminal failure of a streaming session.
///
/// Cancellation is intentionally absent: a cancelled session ends with
/// `StreamOutcome::Cancelled`, never with a `StreamError`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum StreamError {
    /// The request could not be dispatched or the body read failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// No response headers arrived before the session deadline.
    #[error("timed out waiting for a response")]
    Timeout,
    /// The backend answered with a non-2xx status before streaming began.
    #[error("HTTP error! status: {status}, body: {body}")]
    HttpStatus { status: u16, body: String },
    /// The stream violated the framing protocol (for example it closed
    /// without a `done` or `error` frame).
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// The backend sent an explicit `error` frame; the message is verbatim.
    #[error("{0}")]
    Backend(String),
}

impl StreamError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns the HTTP status for `HttpStatus` failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single `data:` line that could not be turned into a frame.
///
/// These are tolerated: the session logs them and moves on to the next line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The payload is not valid JSON or not a JSON object of the frame shape.
    #[error("malformed frame: {0}")]
    Malformed(String),
    /// The frame declares a schema version this client does not understand.
    #[error("unsupported frame schema version {0}")]
    UnsupportedVersion(u32),
    /// Valid JSON object carrying none of the known frame keys.
    #[error("unrecognized frame shape: {0}")]
    Unrecognized(String),
}

/// Errors raised before a session exists, or when an outcome is converted
/// into a `Result`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid input to the builder API.
    #[error("validation error: {0}")]
    Validation(String),
    /// A started session failed.
    #[error(transparent)]
    Stream(StreamError),
    /// A started session was cancelled by the caller.
    #[error("cancelled")]
    Cancelled,
}

impl From<StreamError> for ClientError {
    fn from(value: StreamError) -> Self {
        ClientError::Stream(value)
    }
}

/// Errors returned by the non-streaming backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or the response body could not be read.
    #[error("transport error ({endpoint}): {message}")]
    Transport { endpoint: Endpoint, message: String },
    /// The backend answered with a non-2xx status.
    #[error("request to {endpoint} failed with status {status}: {body}")]
    HttpStatus {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },
    /// The response body did not match the expected shape.
    #[error("invalid response from {endpoint}: {message}")]
    Decode { endpoint: Endpoint, message: String },
    /// Invalid argument supplied by the caller.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Returns the HTTP status for `HttpStatus` failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
