//! Transport seam between a streaming session and the network.
//!
//! A `Transport` dispatches one POST and hands back the response body as a
//! byte stream. Status handling happens here, so a returned stream always
//! belongs to a 2xx response.
mod http;

use std::pin::Pin;

pub use http::HttpTransport;

use crate::endpoint::Endpoint;
use crate::errors::StreamError;

/// Response body of a streaming request, chunk by chunk.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, StreamError>> + Send + 'static>>;

/// One streaming request as handed to a transport.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamRequest {
    /// Session the request belongs to (for logging).
    pub session_id: uuid::Uuid,
    /// Logical backend operation.
    pub endpoint: Endpoint,
    /// JSON body, already validated as serializable.
    pub body: serde_json::Value,
}

/// Dispatches streaming requests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the streamed body of a 2xx response.
    ///
    /// Non-2xx responses must be reported as `StreamError::HttpStatus` with
    /// the full body text.
    async fn open_stream(&self, request: StreamRequest) -> Result<ByteStream, StreamError>;
}
