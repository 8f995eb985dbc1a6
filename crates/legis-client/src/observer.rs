use crate::session::StreamSession;
use crate::stream::{StreamEvent, StreamOutcome};

/// Push-based consumer of a streaming session.
///
/// For every session the calls arrive in this order:
/// `on_streaming_state_change(true)`, `on_progress("")`, one `on_progress`
/// per content delta with the full text so far, then
/// `on_streaming_state_change(false)` exactly once, followed by
/// `on_complete` only when the session completed. Failures and cancellation
/// are reported through the `StreamOutcome` returned by
/// `StreamBuilder::run`.
pub trait StreamObserver {
    /// Receives the accumulated text after each delta.
    fn on_progress(&mut self, text: &str);

    /// Receives the streaming flag: `true` on start, `false` on any end.
    fn on_streaming_state_change(&mut self, _streaming: bool) {}

    /// Receives the final text of a completed session.
    fn on_complete(&mut self, _text: &str) {}
}

/// Drains `session`, forwarding each event to `observer`.
pub(crate) async fn drive<O: StreamObserver + ?Sized>(
    session: &mut StreamSession,
    observer: &mut O,
) -> StreamOutcome {
    while let Some(event) = session.next_event().await {
        match event {
            StreamEvent::Started { .. } => {
                observer.on_streaming_state_change(true);
                observer.on_progress("");
            }
            StreamEvent::Progress { text, .. } => observer.on_progress(&text),
            StreamEvent::Completed { text } => {
                observer.on_streaming_state_change(false);
                observer.on_complete(&text);
            }
            StreamEvent::Failed { .. } | StreamEvent::Cancelled => {
                observer.on_streaming_state_change(false);
            }
        }
    }
    session.take_outcome()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cancel::CancelHandle;
    use crate::endpoint::Endpoint;
    use crate::errors::StreamError;
    use crate::session::StreamBuilder;
    use crate::testing::{FakeTransport, chunks};
    use futures::StreamExt as _;
    use futures::stream;

    #[derive(Default)]
    struct Recorder {
        progress: Vec<String>,
        streaming: Vec<bool>,
        completed: Vec<String>,
        cancel_after_first_delta: Option<CancelHandle>,
    }

    impl StreamObserver for Recorder {
        fn on_progress(&mut self, text: &str) {
            self.progress.push(text.to_string());
            if !text.is_empty()
                && let Some(cancel) = &self.cancel_after_first_delta
            {
                cancel.cancel();
                cancel.cancel();
            }
        }

        fn on_streaming_state_change(&mut self, streaming: bool) {
            self.streaming.push(streaming);
        }

        fn on_complete(&mut self, text: &str) {
            self.completed.push(text.to_string());
        }
    }

    fn builder(transport: FakeTransport) -> StreamBuilder {
        StreamBuilder::new(
            Arc::new(transport),
            Endpoint::new(Endpoint::DRAFT_STREAM),
            None,
        )
        .body(serde_json::json!({"query": "NDA", "document_type": "contract", "context": ""}))
    }

    #[tokio::test]
    async fn completed_session_reports_callbacks_in_order() {
        let mut recorder = Recorder::default();
        let outcome = builder(FakeTransport::chunks(chunks(&[
            "data: {\"content\":\"Sec\"}\n",
            "data: {\"content\":\"tion 1\"}\n",
            "data: {\"done\":true}\n",
        ])))
        .run(&mut recorder)
        .await
        .expect("run");

        assert_eq!(outcome, StreamOutcome::Completed("Section 1".into()));
        assert_eq!(recorder.progress, vec!["", "Sec", "Section 1"]);
        assert_eq!(recorder.streaming, vec![true, false]);
        assert_eq!(recorder.completed, vec!["Section 1"]);
    }

    #[tokio::test]
    async fn cancellation_from_a_callback_stops_once_without_completion() {
        let cancel = CancelHandle::new();
        let mut recorder = Recorder {
            cancel_after_first_delta: Some(cancel.clone()),
            ..Recorder::default()
        };
        let body = stream::iter(vec![Ok(bytes::Bytes::from_static(
            b"data: {\"content\":\"a\"}\ndata: {\"content\":\"b\"}\n",
        ))])
        .chain(stream::pending());
        let outcome = builder(FakeTransport::stream(body))
            .cancel_handle(cancel.clone())
            .run(&mut recorder)
            .await
            .expect("run");

        assert_eq!(outcome, StreamOutcome::Cancelled);
        assert_eq!(recorder.progress, vec!["", "a"]);
        assert_eq!(recorder.streaming, vec![true, false]);
        assert!(recorder.completed.is_empty());
        assert!(!cancel.cancel());
    }

    #[tokio::test]
    async fn failure_stops_once_and_skips_completion() {
        let mut recorder = Recorder::default();
        let outcome = builder(FakeTransport::chunks(chunks(&["data: {\"content\":\"a\"}\n"])))
            .run(&mut recorder)
            .await
            .expect("run");

        assert!(matches!(outcome, StreamOutcome::Failed(StreamError::Protocol(_))));
        assert_eq!(recorder.streaming, vec![true, false]);
        assert!(recorder.completed.is_empty());
    }

    #[tokio::test]
    async fn cancel_during_final_delta_still_completes() {
        let cancel = CancelHandle::new();
        let mut recorder = Recorder {
            cancel_after_first_delta: Some(cancel.clone()),
            ..Recorder::default()
        };
        let outcome = builder(FakeTransport::chunks(chunks(&[
            "data: {\"content\":\"LLM not available\",\"done\":true}\n",
        ])))
        .cancel_handle(cancel)
        .run(&mut recorder)
        .await
        .expect("run");

        assert_eq!(outcome, StreamOutcome::Completed("LLM not available".into()));
        assert_eq!(recorder.progress, vec!["", "LLM not available"]);
        assert_eq!(recorder.streaming, vec![true, false]);
        assert_eq!(recorder.completed, vec!["LLM not available"]);
    }

    #[tokio::test]
    async fn every_done_terminated_stream_completes_once_with_full_text() {
        let cases: Vec<Vec<&str>> = vec![
            vec!["data: {\"done\": true}\n"],
            vec!["data: {\"content\":\"x\"}\n", "data: {\"done\": true}\n"],
            vec![
                "data: {\"content\":\"α\"}\ndata: {\"content\":\"β\"}\n",
                "data: {\"content\":\"γ\"}\ndata: {\"done\": true}\n",
            ],
            vec![
                "data: {\"content\":\"one\"}\n\n",
                "event: message\n",
                "data: {\"content\":\" two\"}\n\ndata: {\"done\": true}\n\n",
            ],
        ];
        let expected = ["", "x", "αβγ", "one two"];
        for (parts, expected) in cases.iter().zip(expected) {
            let mut recorder = Recorder::default();
            builder(FakeTransport::chunks(chunks(parts)))
                .run(&mut recorder)
                .await
                .expect("run");
            assert_eq!(recorder.completed, vec![expected.to_string()]);
            assert_eq!(recorder.streaming.iter().filter(|s| !**s).count(), 1);
        }
    }

    #[tokio::test]
    async fn validation_errors_are_returned_before_any_callback() {
        let mut recorder = Recorder::default();
        let result = StreamBuilder::new(
            Arc::new(FakeTransport::chunks(Vec::new())),
            Endpoint::new(""),
            None,
        )
        .body(serde_json::json!({}))
        .run(&mut recorder)
        .await;
        assert!(result.is_err());
        assert!(recorder.streaming.is_empty());
        assert!(recorder.progress.is_empty());
    }
}
