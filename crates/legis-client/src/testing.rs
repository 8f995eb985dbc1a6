use std::sync::{Arc, Mutex};

use futures::stream;

use crate::errors::StreamError;
use crate::transport::{ByteStream, StreamRequest, Transport};

enum Behavior {
    Body(Option<ByteStream>),
    Fail(StreamError),
    NeverResponds,
}

enum Reply {
    Body(ByteStream),
    Fail(StreamError),
    Hang,
}

/// In-memory transport that replays a canned response body.
pub(crate) struct FakeTransport {
    behavior: Mutex<Behavior>,
    requests: Arc<Mutex<Vec<StreamRequest>>>,
}

impl FakeTransport {
    pub fn chunks(chunks: Vec<bytes::Bytes>) -> Self {
        Self::stream(stream::iter(chunks.into_iter().map(Ok)))
    }

    pub fn stream(
        body: impl futures::Stream<Item = Result<bytes::Bytes, StreamError>> + Send + 'static,
    ) -> Self {
        Self::with(Behavior::Body(Some(Box::pin(body))))
    }

    pub fn fail(error: StreamError) -> Self {
        Self::with(Behavior::Fail(error))
    }

    pub fn never_responds() -> Self {
        Self::with(Behavior::NeverResponds)
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<StreamRequest>>> {
        self.requests.clone()
    }

    fn with(behavior: Behavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn open_stream(&self, request: StreamRequest) -> Result<ByteStream, StreamError> {
        self.requests.lock().expect("requests lock").push(request);
        let reply = {
            let mut behavior = self.behavior.lock().expect("behavior lock");
            match &mut *behavior {
                Behavior::Body(body) => match body.take() {
                    Some(body) => Reply::Body(body),
                    None => Reply::Fail(StreamError::transport("fake body already consumed")),
                },
                Behavior::Fail(error) => Reply::Fail(error.clone()),
                Behavior::NeverResponds => Reply::Hang,
            }
        };
        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Fail(error) => Err(error),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Turns string literals into response chunks.
pub(crate) fn chunks(parts: &[&str]) -> Vec<bytes::Bytes> {
    parts
        .iter()
        .map(|part| bytes::Bytes::copy_from_slice(part.as_bytes()))
        .collect()
}
