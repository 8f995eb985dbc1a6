use crate::endpoint::Endpoint;
use crate::errors::{ClientError, StreamError};

/// Lifecycle of a streaming session. Terminal states are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    /// Returns `true` for `Completed`, `Cancelled` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Events yielded by `StreamSession::next_event`.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// First event of every session. Accumulated text is empty at this point.
    Started {
        session_id: uuid::Uuid,
        endpoint: Endpoint,
    },
    /// A content delta was appended.
    Progress {
        seq: u64,
        delta: String,
        text: String,
    },
    /// Terminal success with the full accumulated text.
    Completed { text: String },
    /// Terminal failure.
    Failed { error: StreamError },
    /// Terminal, caller-requested stop.
    Cancelled,
}

impl StreamEvent {
    /// Returns `true` for the three terminal events.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }
}

/// Terminal result of a session.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamOutcome {
    Completed(String),
    Cancelled,
    Failed(StreamError),
}

impl StreamOutcome {
    /// Converts the outcome into a `Result`, mapping cancellation to
    /// `ClientError::Cancelled`.
    pub fn into_result(self) -> Result<String, ClientError> {
        match self {
            Self::Completed(text) => Ok(text),
            Self::Cancelled => Err(ClientError::Cancelled),
            Self::Failed(error) => Err(ClientError::Stream(error)),
        }
    }

    /// Returns the terminal state this outcome corresponds to.
    pub fn state(&self) -> SessionState {
        match self {
            Self::Completed(_) => SessionState::Completed,
            Self::Cancelled => SessionState::Cancelled,
            Self::Failed(_) => SessionState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_into_result() {
        assert_eq!(
            StreamOutcome::Completed("ok".into()).into_result(),
            Ok("ok".to_string())
        );
        assert_eq!(
            StreamOutcome::Cancelled.into_result(),
            Err(ClientError::Cancelled)
        );
        assert!(matches!(
            StreamOutcome::Failed(StreamError::Backend("x".into())).into_result(),
            Err(ClientError::Stream(StreamError::Backend(_)))
        ));
    }

    #[test]
    fn only_end_states_are_terminal() {
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::Streaming.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(StreamEvent::Cancelled.is_terminal());
        assert!(
            !StreamEvent::Progress {
                seq: 0,
                delta: "a".into(),
                text: "a".into()
            }
            .is_terminal()
        );
    }
}
