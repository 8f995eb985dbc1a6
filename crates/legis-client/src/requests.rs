//! Request payloads for the streaming operations.
//!
//! Field names match the backend's JSON contract.

use crate::endpoint::Endpoint;
use crate::errors::ClientError;

/// A payload with a fixed streaming endpoint.
pub trait StreamOperation: serde::Serialize {
    /// Endpoint the payload is posted to.
    const ENDPOINT: &'static str;

    /// Rejects payloads the backend cannot act on.
    fn validate(&self) -> Result<(), ClientError>;

    /// Returns the endpoint as a value.
    fn endpoint() -> Endpoint {
        Endpoint::new(Self::ENDPOINT)
    }
}

/// Legal research query.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    pub max_results: u32,
    pub similarity_threshold: f64,
}

impl ResearchRequest {
    /// Creates a query with the default result count (10) and similarity
    /// threshold (0.7).
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 10,
            similarity_threshold: 0.7,
        }
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

impl StreamOperation for ResearchRequest {
    const ENDPOINT: &'static str = Endpoint::RESEARCH_STREAM;

    fn validate(&self) -> Result<(), ClientError> {
        require_text("query", &self.query)?;
        if self.max_results == 0 {
            return Err(ClientError::Validation(
                "max_results must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ClientError::Validation(
                "similarity_threshold must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }
}

/// Document drafting request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DraftRequest {
    pub query: String,
    pub document_type: String,
    pub context: String,
}

impl DraftRequest {
    /// Creates a drafting request with empty context.
    pub fn new(query: impl Into<String>, document_type: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            document_type: document_type.into(),
            context: String::new(),
        }
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

impl StreamOperation for DraftRequest {
    const ENDPOINT: &'static str = Endpoint::DRAFT_STREAM;

    fn validate(&self) -> Result<(), ClientError> {
        require_text("query", &self.query)?;
        require_text("document_type", &self.document_type)
    }
}

/// Compliance check of a piece of contract text.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComplianceRequest {
    pub content: String,
    pub jurisdiction: String,
    pub check_gdpr: bool,
    pub check_us_code: bool,
    pub check_eu_lex: bool,
}

impl ComplianceRequest {
    /// Creates a US-jurisdiction check with GDPR and US Code enabled and
    /// EUR-Lex disabled.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            jurisdiction: "US".to_string(),
            check_gdpr: true,
            check_us_code: true,
            check_eu_lex: false,
        }
    }

    pub fn jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = jurisdiction.into();
        self
    }

    pub fn check_gdpr(mut self, enabled: bool) -> Self {
        self.check_gdpr = enabled;
        self
    }

    pub fn check_us_code(mut self, enabled: bool) -> Self {
        self.check_us_code = enabled;
        self
    }

    pub fn check_eu_lex(mut self, enabled: bool) -> Self {
        self.check_eu_lex = enabled;
        self
    }
}

impl StreamOperation for ComplianceRequest {
    const ENDPOINT: &'static str = Endpoint::COMPLIANCE_STREAM;

    fn validate(&self) -> Result<(), ClientError> {
        require_text("content", &self.content)?;
        require_text("jurisdiction", &self.jurisdiction)
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
