use std::sync::Arc;

use crate::api::BackendApi;
use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::errors::ClientError;
use crate::requests::{ComplianceRequest, DraftRequest, ResearchRequest, StreamOperation};
use crate::session::StreamBuilder;
use crate::transport::{HttpTransport, Transport};

pub(crate) struct ClientInner {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    api: BackendApi,
}

/// Entry point for streaming sessions and plain backend calls.
///
/// Cheap to clone; clones share connection pools.
#[derive(Clone)]
pub struct LegisClient {
    inner: Arc<ClientInner>,
}

impl LegisClient {
    /// Starts a builder with the default config.
    pub fn builder() -> LegisClientBuilder {
        LegisClientBuilder::default()
    }

    /// Creates a client for `config`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::builder().config(config).build()
    }

    /// Creates a client from `LEGIS_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Starts a streaming exchange with `endpoint`.
    pub fn stream(&self, endpoint: impl Into<Endpoint>) -> StreamBuilder {
        StreamBuilder::new(
            self.inner.transport.clone(),
            endpoint.into(),
            self.inner.config.stream_timeout,
        )
    }

    /// Validates a typed payload and prepares a stream to its endpoint.
    pub fn stream_operation<R: StreamOperation>(
        &self,
        request: &R,
    ) -> Result<StreamBuilder, ClientError> {
        request.validate()?;
        Ok(self.stream(R::endpoint()).json(request))
    }

    /// Streams a legal research answer.
    pub fn research(&self, request: &ResearchRequest) -> Result<StreamBuilder, ClientError> {
        self.stream_operation(request)
    }

    /// Streams a drafted document.
    pub fn draft(&self, request: &DraftRequest) -> Result<StreamBuilder, ClientError> {
        self.stream_operation(request)
    }

    /// Streams a compliance report.
    pub fn compliance(&self, request: &ComplianceRequest) -> Result<StreamBuilder, ClientError> {
        self.stream_operation(request)
    }

    /// Non-streaming backend calls.
    pub fn api(&self) -> &BackendApi {
        &self.inner.api
    }
}

/// Builder for `LegisClient`.
#[derive(Default)]
pub struct LegisClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
}

impl LegisClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the HTTP transport used for streaming sessions.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validates the config and builds the HTTP clients.
    pub fn build(self) -> Result<LegisClient, ClientError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                // Streams may outlive any fixed request timeout.
                let stream_client = reqwest::Client::builder()
                    .connect_timeout(config.connect_timeout)
                    .build()
                    .map_err(|e| ClientError::Config(format!("http client: {e}")))?;
                Arc::new(HttpTransport::new(stream_client, &config)) as Arc<dyn Transport>
            }
        };
        let api_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("http client: {e}")))?;

        let config = Arc::new(config);
        let api = BackendApi::new(api_client, config.clone());
        Ok(LegisClient {
            inner: Arc::new(ClientInner {
                config,
                transport,
                api,
            }),
        })
    }
}
