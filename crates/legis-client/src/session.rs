use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cancel::CancelHandle;
use crate::decoder::{LineDecoder, SseLine};
use crate::endpoint::Endpoint;
use crate::errors::{ClientError, StreamError};
use crate::frame::{FrameKind, StreamFrame};
use crate::observer::{StreamObserver, drive};
use crate::stream::{SessionState, StreamEvent, StreamOutcome};
use crate::transport::{ByteStream, StreamRequest, Transport};

/// Builder for one streaming exchange.
///
/// Obtained from `LegisClient::stream`; set the request body (and optionally
/// a cancel handle or timeout), then either pull events with
/// `start_stream()` or push them into a `StreamObserver` with `run()`.
pub struct StreamBuilder {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    body: Option<Result<serde_json::Value, String>>,
    cancel: Option<CancelHandle>,
    timeout: Option<Duration>,
}

impl StreamBuilder {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        endpoint: Endpoint,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            endpoint,
            body: None,
            cancel: None,
            timeout,
        }
    }

    /// Serializes `body` as the JSON request payload.
    ///
    /// Serialization errors surface from `start_stream()` as validation errors.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_value(body).map_err(|e| e.to_string()));
        self
    }

    /// Sets an already-built JSON request payload.
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(Ok(body));
        self
    }

    /// Binds a caller-owned cancel handle to the session.
    ///
    /// Without one the session creates its own, reachable through
    /// `StreamSession::cancel_handle()`.
    pub fn cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    /// Sets a deadline for the whole session, overriding the client default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the builder and returns an idle session.
    ///
    /// Nothing is sent until the first `next_event()` call.
    pub fn start_stream(self) -> Result<StreamSession, ClientError> {
        if self.endpoint.is_blank() {
            return Err(ClientError::Validation("endpoint must not be empty".into()));
        }
        let body = match self.body {
            None => {
                return Err(ClientError::Validation("request body is required".into()));
            }
            Some(Err(e)) => {
                return Err(ClientError::Validation(format!(
                    "request body is not serializable: {e}"
                )));
            }
            Some(Ok(body)) => body,
        };
        if !body.is_object() {
            return Err(ClientError::Validation(
                "request body must be a JSON object".into(),
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ClientError::Validation(
                "timeout must be greater than 0".into(),
            ));
        }
        let cancel = self.cancel.unwrap_or_default();
        if cancel.is_cancelled() {
            return Err(ClientError::Validation(
                "cancel handle was already triggered".into(),
            ));
        }

        Ok(StreamSession {
            session_id: uuid::Uuid::new_v4(),
            endpoint: self.endpoint,
            transport: self.transport,
            request_body: Some(body),
            cancel,
            timeout: self.timeout,
            deadline: None,
            state: SessionState::Idle,
            body: None,
            decoder: LineDecoder::default(),
            pending: VecDeque::new(),
            completion_pending: false,
            text: String::new(),
            seq: 0,
            outcome: None,
        })
    }

    /// Runs the session to its end, reporting through `observer`.
    ///
    /// Returns `Err` only for builder validation failures; every failure after
    /// the session starts is reported as `StreamOutcome::Failed`.
    pub async fn run<O: StreamObserver + ?Sized>(
        self,
        observer: &mut O,
    ) -> Result<StreamOutcome, ClientError> {
        let mut session = self.start_stream()?;
        Ok(drive(&mut session, observer).await)
    }

    /// Runs the session to its end and returns the final text.
    pub async fn collect_text(self) -> Result<String, ClientError> {
        self.start_stream()?.finish().await.into_result()
    }
}

/// One in-flight streaming exchange.
///
/// A finite, single-pass sequence of `StreamEvent`s: `Started`, any number of
/// `Progress`, then exactly one of `Completed`, `Failed` or `Cancelled`.
/// Sessions are not restartable; build a new one per submission.
pub struct StreamSession {
    session_id: uuid::Uuid,
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    request_body: Option<serde_json::Value>,
    cancel: CancelHandle,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    state: SessionState,
    body: Option<ByteStream>,
    decoder: LineDecoder,
    pending: VecDeque<SseLine>,
    // Set when a done frame also carried content: the delta goes out first.
    completion_pending: bool,
    text: String,
    seq: u64,
    outcome: Option<StreamOutcome>,
}

enum Wake {
    Cancelled,
    Deadline,
    Opened(Result<ByteStream, StreamError>),
    Chunk(Option<Result<bytes::Bytes, StreamError>>),
}

impl StreamSession {
    /// Returns the session id used in log events.
    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    /// Returns the backend operation this session targets.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns a handle that cancels this session.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the terminal outcome once one has been reached.
    pub fn outcome(&self) -> Option<&StreamOutcome> {
        self.outcome.as_ref()
    }

    /// Advances the session and returns the next event.
    ///
    /// Returns `None` once the terminal event has been yielded.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.state.is_terminal() {
            return None;
        }
        if self.state == SessionState::Idle {
            return Some(self.begin());
        }
        loop {
            // A done frame already received outranks a later cancel.
            if self.completion_pending {
                let text = self.text.clone();
                return Some(self.terminate(StreamOutcome::Completed(text)));
            }
            if self.cancel.is_cancelled() {
                return Some(self.terminate(StreamOutcome::Cancelled));
            }
            if let Some(line) = self.pending.pop_front() {
                if let Some(event) = self.apply_line(line) {
                    return Some(event);
                }
                continue;
            }
            if let Some(event) = self.pull().await {
                return Some(event);
            }
        }
    }

    /// Drains the session and returns its terminal outcome.
    ///
    /// Safe to call after consuming some events with `next_event()`.
    pub async fn finish(mut self) -> StreamOutcome {
        while self.next_event().await.is_some() {}
        self.take_outcome()
    }

    pub(crate) fn take_outcome(&mut self) -> StreamOutcome {
        self.outcome.take().unwrap_or_else(|| {
            StreamOutcome::Failed(StreamError::protocol("session ended without an outcome"))
        })
    }

    fn begin(&mut self) -> StreamEvent {
        self.state = SessionState::Streaming;
        self.text.clear();
        self.deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        info!(event = "stream.started", session_id = %self.session_id, endpoint = %self.endpoint, "starting streaming request");
        StreamEvent::Started {
            session_id: self.session_id,
            endpoint: self.endpoint.clone(),
        }
    }

    // Waits for the response or the next chunk. Returns a terminal event, or
    // `None` when more lines may be available.
    async fn pull(&mut self) -> Option<StreamEvent> {
        let cancel = self.cancel.clone();
        let deadline = self.deadline;
        let wake = match self.body.as_mut() {
            None => {
                let request = StreamRequest {
                    session_id: self.session_id,
                    endpoint: self.endpoint.clone(),
                    body: self.request_body.take().unwrap_or_default(),
                };
                let transport = self.transport.clone();
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Wake::Cancelled,
                    _ = sleep_until(deadline) => Wake::Deadline,
                    opened = transport.open_stream(request) => Wake::Opened(opened),
                }
            }
            Some(body) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Wake::Cancelled,
                    _ = sleep_until(deadline) => Wake::Deadline,
                    chunk = body.next() => Wake::Chunk(chunk),
                }
            }
        };

        match wake {
            Wake::Cancelled => Some(self.terminate(StreamOutcome::Cancelled)),
            Wake::Deadline if self.body.is_none() => {
                Some(self.terminate(StreamOutcome::Failed(StreamError::Timeout)))
            }
            Wake::Deadline => {
                info!(event = "stream.deadline_reached", session_id = %self.session_id, "session deadline reached mid-stream");
                Some(self.terminate(StreamOutcome::Cancelled))
            }
            Wake::Opened(Ok(body)) => {
                debug!(session_id = %self.session_id, "response headers received");
                self.body = Some(body);
                None
            }
            Wake::Opened(Err(error)) => Some(self.terminate(StreamOutcome::Failed(error))),
            Wake::Chunk(Some(Ok(chunk))) => {
                let lines = self.decoder.push_chunk(&chunk);
                debug!(session_id = %self.session_id, chunk_len = chunk.len(), lines = lines.len(), buffered = self.decoder.pending_len(), "chunk received");
                self.pending.extend(lines);
                None
            }
            Wake::Chunk(Some(Err(error))) => Some(self.terminate(StreamOutcome::Failed(error))),
            Wake::Chunk(None) => {
                let discarded = self.decoder.finish();
                if discarded > 0 {
                    debug!(session_id = %self.session_id, discarded_bytes = discarded, "dropping unterminated trailing line");
                }
                Some(self.terminate(StreamOutcome::Failed(StreamError::protocol(
                    "stream closed without a done or error frame",
                ))))
            }
        }
    }

    fn apply_line(&mut self, line: SseLine) -> Option<StreamEvent> {
        let payload = match line {
            SseLine::Other(text) => {
                debug!(session_id = %self.session_id, line = %text, "ignoring non-data line");
                return None;
            }
            SseLine::Data(payload) => payload,
        };
        let frame = match StreamFrame::parse(&payload) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(event = "stream.frame_skipped", session_id = %self.session_id, error = %error, "skipping undecodable frame");
                return None;
            }
        };
        match frame.kind() {
            FrameKind::Empty => None,
            FrameKind::Delta(delta) => Some(self.push_delta(delta)),
            FrameKind::Done {
                content: Some(delta),
            } => {
                self.completion_pending = true;
                Some(self.push_delta(delta))
            }
            FrameKind::Done { content: None } => {
                let text = self.text.clone();
                Some(self.terminate(StreamOutcome::Completed(text)))
            }
            FrameKind::Error(message) => Some(
                self.terminate(StreamOutcome::Failed(StreamError::Backend(message))),
            ),
        }
    }

    fn push_delta(&mut self, delta: String) -> StreamEvent {
        self.text.push_str(&delta);
        let seq = self.seq;
        self.seq = self.seq.saturating_add(1);
        debug!(session_id = %self.session_id, seq, delta_len = delta.len(), text_len = self.text.len(), "content delta");
        StreamEvent::Progress {
            seq,
            delta,
            text: self.text.clone(),
        }
    }

    fn terminate(&mut self, outcome: StreamOutcome) -> StreamEvent {
        self.state = outcome.state();
        // Dropping the body aborts the response at the transport.
        self.body = None;
        self.pending.clear();
        self.completion_pending = false;
        self.decoder.finish();

        let event = match &outcome {
            StreamOutcome::Completed(text) => {
                info!(event = "stream.completed", session_id = %self.session_id, endpoint = %self.endpoint, text_len = text.len(), deltas = self.seq, "streaming completed");
                StreamEvent::Completed { text: text.clone() }
            }
            StreamOutcome::Cancelled => {
                info!(event = "stream.cancelled", session_id = %self.session_id, endpoint = %self.endpoint, "streaming cancelled");
                StreamEvent::Cancelled
            }
            StreamOutcome::Failed(error) => {
                warn!(event = "stream.failed", session_id = %self.session_id, endpoint = %self.endpoint, error = %error, "streaming failed");
                StreamEvent::Failed {
                    error: error.clone(),
                }
            }
        };
        self.outcome = Some(outcome);
        event
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
