use std::fmt;

/// Logical backend operation name, relative to the API prefix
/// (for example `research/stream`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Endpoint(pub String);

impl Endpoint {
    /// Streaming legal research.
    pub const RESEARCH_STREAM: &'static str = "research/stream";
    /// Streaming document drafting.
    pub const DRAFT_STREAM: &'static str = "draft/stream";
    /// Streaming compliance check.
    pub const COMPLIANCE_STREAM: &'static str = "compliance/stream";

    /// Creates an endpoint from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the endpoint as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.0.trim().trim_matches('/').is_empty()
    }

    /// Joins the endpoint onto a base URL and API prefix.
    ///
    /// Redundant slashes at the seams are collapsed, so `http://host/`,
    /// `/api/` and `/research/stream` still yield `http://host/api/research/stream`.
    pub fn url(&self, base_url: &str, api_prefix: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let prefix = api_prefix.trim_matches('/');
        let path = self.0.trim().trim_start_matches('/');
        if prefix.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{prefix}/{path}")
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Endpoint {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
