use std::time::Duration;

use crate::errors::ClientError;

/// Backend used when `LEGIS_API_BASE` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Path prefix shared by every backend route.
pub const DEFAULT_API_PREFIX: &str = "/api";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Loads `.env` from the crate directory and then the working directory.
///
/// Missing files are ignored; variables already set in the process win.
pub fn load_dotenv() {
    let _ = dotenvy::from_path(std::path::Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/.env"
    )));
    dotenvy::dotenv().ok();
}

/// Connection settings for `LegisClient`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend (for example `http://localhost:8000`).
    pub base_url: String,
    /// Prefix prepended to every endpoint (for example `/api`).
    pub api_prefix: String,
    /// Overall timeout for non-streaming calls.
    ///
    /// Generation-backed calls can take minutes, hence the generous default.
    pub request_timeout: Duration,
    /// TCP/TLS connect timeout for all calls.
    pub connect_timeout: Duration,
    /// Optional deadline for a whole streaming session. `None` means the
    /// session runs until a terminal frame or cancellation.
    pub stream_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            stream_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Creates a config pointing at `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().base_url(base_url)
    }

    /// Builds a config from the process environment.
    ///
    /// - `LEGIS_API_BASE`: backend base URL.
    /// - `LEGIS_API_PREFIX`: route prefix.
    /// - `LEGIS_REQUEST_TIMEOUT_SECS`: timeout for non-streaming calls.
    /// - `LEGIS_STREAM_TIMEOUT_SECS`: optional streaming session deadline.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Some(base_url) = non_empty(lookup("LEGIS_API_BASE")) {
            config.base_url = base_url;
        }
        if let Some(prefix) = lookup("LEGIS_API_PREFIX") {
            config.api_prefix = prefix.trim().to_string();
        }
        if let Some(timeout) = parse_secs(
            "LEGIS_REQUEST_TIMEOUT_SECS",
            lookup("LEGIS_REQUEST_TIMEOUT_SECS"),
        )? {
            config.request_timeout = timeout;
        }
        config.stream_timeout =
            parse_secs("LEGIS_STREAM_TIMEOUT_SECS", lookup("LEGIS_STREAM_TIMEOUT_SECS"))?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides the backend base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the route prefix.
    pub fn api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        self.api_prefix = api_prefix.into();
        self
    }

    /// Overrides the non-streaming request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets a default deadline for every streaming session.
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = Some(timeout);
        self
    }

    /// Checks that the config can be used to build a client.
    pub fn validate(&self) -> Result<(), ClientError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::Config("base_url must not be empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got {base}"
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::Config(
                "request_timeout must be greater than 0".into(),
            ));
        }
        if self.stream_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ClientError::Config(
                "stream_timeout must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs(key: &str, value: Option<String>) -> Result<Option<Duration>, ClientError> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| {
            ClientError::Config(format!(
                "{key} must be a whole number of seconds, got {raw}"
            ))
        })
}
