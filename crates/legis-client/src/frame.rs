use crate::errors::FrameError;

/// Highest frame schema version understood by this client.
///
/// Frames without a `v` key are treated as version 1.
pub const FRAME_SCHEMA_VERSION: u32 = 1;

const KNOWN_KEYS: [&str; 3] = ["content", "done", "error"];

/// Wire shape of one `data:` payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamFrame {
    /// Incremental text delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Terminal success marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    /// Terminal failure marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Schema version.
    #[serde(default, rename = "v", skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// What a frame means to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Text to append.
    Delta(String),
    /// End of stream. A non-empty `content` on the same frame is appended
    /// before completion.
    Done { content: Option<String> },
    /// Backend-reported failure. Wins over `done` when both are set.
    Error(String),
    /// Known shape, nothing to apply (for example an empty heartbeat delta).
    Empty,
}

impl StreamFrame {
    /// Parses the payload of a `data: ` line.
    pub fn parse(payload: &str) -> Result<Self, FrameError> {
        let value: serde_json::Value = serde_json::from_str(payload.trim())
            .map_err(|e| FrameError::Malformed(format!("{e}: {}", preview(payload))))?;
        let Some(object) = value.as_object() else {
            return Err(FrameError::Malformed(format!(
                "expected a JSON object: {}",
                preview(payload)
            )));
        };
        if let Some(version) = object.get("v").and_then(|v| v.as_u64()) {
            let version = u32::try_from(version).unwrap_or(u32::MAX);
            if version > FRAME_SCHEMA_VERSION {
                return Err(FrameError::UnsupportedVersion(version));
            }
        }
        if !KNOWN_KEYS.iter().any(|key| object.contains_key(*key)) {
            return Err(FrameError::Unrecognized(preview(payload)));
        }
        serde_json::from_value(value)
            .map_err(|e| FrameError::Malformed(format!("{e}: {}", preview(payload))))
    }

    /// Classifies the frame.
    pub fn kind(self) -> FrameKind {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return FrameKind::Error(error);
        }
        let content = self.content.filter(|c| !c.is_empty());
        if self.done == Some(true) {
            return FrameKind::Done { content };
        }
        match content {
            Some(text) => FrameKind::Delta(text),
            None => FrameKind::Empty,
        }
    }
}

fn preview(payload: &str) -> String {
    const MAX_CHARS: usize = 80;
    let mut out: String = payload.chars().take(MAX_CHARS).collect();
    if payload.chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(payload: &str) -> FrameKind {
        StreamFrame::parse(payload).expect("valid frame").kind()
    }

    #[test]
    fn content_frame_is_a_delta() {
        assert_eq!(
            kind_of(r#"{"content":"Sec","done":false}"#),
            FrameKind::Delta("Sec".into())
        );
    }

    #[test]
    fn done_frame_carries_trailing_content() {
        assert_eq!(
            kind_of(r#"{"content":"LLM not available","done":true}"#),
            FrameKind::Done {
                content: Some("LLM not available".into())
            }
        );
        assert_eq!(
            kind_of(r#"{"content":"","done":true}"#),
            FrameKind::Done { content: None }
        );
    }

    #[test]
    fn error_wins_over_done() {
        assert_eq!(
            kind_of(r#"{"error":"ollama unreachable","done":true}"#),
            FrameKind::Error("ollama unreachable".into())
        );
    }

    #[test]
    fn empty_content_is_a_no_op() {
        assert_eq!(kind_of(r#"{"content":"","done":false}"#), FrameKind::Empty);
        assert_eq!(kind_of(r#"{"error":""}"#), FrameKind::Empty);
    }

    #[test]
    fn malformed_json_is_a_typed_error() {
        assert!(matches!(
            StreamFrame::parse("{not valid json"),
            Err(FrameError::Malformed(_))
        ));
        assert!(matches!(
            StreamFrame::parse("[1,2]"),
            Err(FrameError::Malformed(_))
        ));
        assert!(matches!(
            StreamFrame::parse(r#"{"content":5}"#),
            Err(FrameError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_shape_and_newer_version_are_rejected() {
        assert!(matches!(
            StreamFrame::parse(r#"{"delta":"x"}"#),
            Err(FrameError::Unrecognized(_))
        ));
        assert_eq!(
            StreamFrame::parse(r#"{"v":2,"content":"x"}"#),
            Err(FrameError::UnsupportedVersion(2))
        );
        assert_eq!(
            kind_of(r#"{"v":1,"content":"x"}"#),
            FrameKind::Delta("x".into())
        );
    }
}
