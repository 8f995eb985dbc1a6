use futures::StreamExt as _;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::StreamError;

use super::{ByteStream, StreamRequest, Transport};

/// `Transport` backed by a `reqwest::Client`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_prefix: String,
}

impl HttpTransport {
    /// Creates a transport that sends requests through `client`.
    ///
    /// The client should not carry an overall request timeout: it would cut
    /// long generations short. Session deadlines are enforced by the session.
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_prefix: config.api_prefix.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn open_stream(&self, request: StreamRequest) -> Result<ByteStream, StreamError> {
        let url = request.endpoint.url(&self.base_url, &self.api_prefix);
        debug!(session_id = %request.session_id, endpoint = %request.endpoint, url = %url, "dispatching streaming request");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(&request.body)
            .send()
            .await
            .map_err(|e| StreamError::transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        debug!(session_id = %request.session_id, status = status.as_u16(), "streaming response status");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StreamError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| StreamError::transport(format!("stream read failed: {e}")))
        });
        Ok(Box::pin(stream))
    }
}
