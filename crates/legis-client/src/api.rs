//! Non-streaming backend calls: file management, analysis, downloads and the
//! chat gateway. One request, one response, no retries.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::errors::ApiError;

/// Descriptor returned after an upload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UploadedFile {
    pub file_id: String,
    pub filename: String,
    pub file_type: String,
    pub size: u64,
    pub status: String,
    #[serde(default)]
    pub processing_results: Option<ProcessingResults>,
}

/// Extraction summary attached to an upload.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProcessingResults {
    pub pages_extracted: u32,
    pub text_length: u64,
    pub language_detected: String,
    pub document_type: String,
}

/// One entry of the stored file listing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredFile {
    pub file_id: String,
    pub filename: String,
    pub size: u64,
    #[serde(default)]
    pub upload_date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub files: Vec<StoredFile>,
    #[serde(default)]
    pub total_files: usize,
}

/// Structured analysis of an uploaded document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DocumentAnalysis {
    pub file_id: String,
    pub filename: String,
    pub document_type: String,
    pub analysis: String,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence_score: f64,
    pub risk_level: String,
    pub compliance_status: String,
    pub processing_time: String,
    pub text_extraction_status: String,
    pub enhanced_analysis: bool,
    pub ai_generated: bool,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeletedFile {
    pub file_id: String,
    pub status: String,
}

/// Body of a DOCX export of drafted text.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DraftDownloadRequest {
    pub content: String,
    pub title: String,
    pub document_type: String,
}

/// Direct answer from the chat gateway.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    /// Between 0 and 1.
    #[serde(default)]
    pub confidence: f64,
    /// Set when the backend handed the question to a human reviewer.
    #[serde(default)]
    pub routed_to_human: bool,
}

/// Reply of the chat/process gateway.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Answer(ChatAnswer),
    Result { result: serde_json::Value },
}

/// What the contract processing pipeline should produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Draft,
    Summarize,
    Regularize,
}

impl OutputType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Summarize => "summarize",
            Self::Regularize => "regularize",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Completed,
    NeedsReview,
}

/// Result of running an uploaded contract through the processing pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContractProcessResponse {
    pub file_name: String,
    pub output_type: String,
    pub summary: String,
    /// Normalized risk, 0 to 1.
    pub risk_score: f64,
    /// Simulated incident rate.
    pub incident_rate: f64,
    pub confidence: f64,
    pub status: ProcessStatus,
}

#[derive(serde::Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

/// File contents handed to `upload` and `process`.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn into_part(self) -> Result<reqwest::multipart::Part, ApiError> {
        if self.file_name.trim().is_empty() {
            return Err(ApiError::Validation("file name must not be empty".into()));
        }
        let part = reqwest::multipart::Part::bytes(self.bytes).file_name(self.file_name);
        match self.content_type {
            Some(content_type) => part.mime_str(&content_type).map_err(|e| {
                ApiError::Validation(format!("invalid content type {content_type}: {e}"))
            }),
            None => Ok(part),
        }
    }
}

/// Client for the non-streaming backend routes.
#[derive(Clone)]
pub struct BackendApi {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl BackendApi {
    pub(crate) fn new(client: reqwest::Client, config: Arc<ClientConfig>) -> Self {
        Self { client, config }
    }

    /// Uploads a document (`POST upload`, multipart field `file`).
    pub async fn upload(&self, file: FileUpload) -> Result<UploadedFile, ApiError> {
        let endpoint = Endpoint::new("upload");
        let form = reqwest::multipart::Form::new().part("file", file.into_part()?);
        let request = self.client.post(self.url(&endpoint)).multipart(form);
        self.send_json(&endpoint, request).await
    }

    /// Lists stored files (`GET files`).
    pub async fn list_files(&self) -> Result<FileListing, ApiError> {
        let endpoint = Endpoint::new("files");
        let request = self.client.get(self.url(&endpoint));
        self.send_json(&endpoint, request).await
    }

    /// Runs document analysis for an uploaded file (`GET analyze/{id}`).
    pub async fn analyze(&self, file_id: &str) -> Result<DocumentAnalysis, ApiError> {
        let endpoint = Endpoint::new(format!("analyze/{}", path_segment(file_id)?));
        let request = self.client.get(self.url(&endpoint));
        self.send_json(&endpoint, request).await
    }

    /// Deletes an uploaded file (`DELETE files/{id}`).
    pub async fn delete_file(&self, file_id: &str) -> Result<DeletedFile, ApiError> {
        let endpoint = Endpoint::new(format!("files/{}", path_segment(file_id)?));
        let request = self.client.delete(self.url(&endpoint));
        self.send_json(&endpoint, request).await
    }

    /// Exports drafted text as a document (`POST draft/download`), returning
    /// the raw file bytes.
    pub async fn download_draft(
        &self,
        body: &DraftDownloadRequest,
    ) -> Result<bytes::Bytes, ApiError> {
        let endpoint = Endpoint::new("draft/download");
        let request = self.client.post(self.url(&endpoint)).json(body);
        let response = self.send(&endpoint, request).await?;
        let bytes = response.bytes().await.map_err(|e| transport(&endpoint, e))?;
        debug!(event = "api.download_received", endpoint = %endpoint, bytes = bytes.len() as u64);
        Ok(bytes)
    }

    /// Asks the chat gateway a question (`POST chat`).
    pub async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        if message.trim().is_empty() {
            return Err(ApiError::Validation("message must not be empty".into()));
        }
        let endpoint = Endpoint::new("chat");
        let request = self
            .client
            .post(self.url(&endpoint))
            .json(&serde_json::json!({ "message": message }));
        self.send_json(&endpoint, request).await
    }

    /// Runs a contract through the processing pipeline
    /// (`POST contracts/analyze`, multipart `file` + `output_type`).
    pub async fn process(
        &self,
        file: FileUpload,
        output_type: OutputType,
    ) -> Result<ContractProcessResponse, ApiError> {
        let endpoint = Endpoint::new("contracts/analyze");
        let form = reqwest::multipart::Form::new()
            .part("file", file.into_part()?)
            .text("output_type", output_type.as_str());
        let request = self.client.post(self.url(&endpoint)).multipart(form);
        self.send_json(&endpoint, request).await
    }

    /// Returns whether the backend reports itself healthy (`GET health`).
    pub async fn health(&self) -> Result<bool, ApiError> {
        let endpoint = Endpoint::new("health");
        let request = self.client.get(self.url(&endpoint));
        let health: HealthResponse = self.send_json(&endpoint, request).await?;
        Ok(health.ok)
    }

    fn url(&self, endpoint: &Endpoint) -> String {
        endpoint.url(&self.config.base_url, &self.config.api_prefix)
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        debug!(event = "api.request", endpoint = %endpoint);
        let response = request.send().await.map_err(|e| transport(endpoint, e))?;
        let status = response.status();
        debug!(event = "api.response", endpoint = %endpoint, status = status.as_u16());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = if body.trim().is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body
            };
            return Err(ApiError::HttpStatus {
                endpoint: endpoint.clone(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(endpoint, request).await?;
        let text = response.text().await.map_err(|e| transport(endpoint, e))?;
        decode_json(endpoint, &text)
    }
}

fn transport(endpoint: &Endpoint, err: reqwest::Error) -> ApiError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    ApiError::Transport {
        endpoint: endpoint.clone(),
        message,
    }
}

fn decode_json<T: DeserializeOwned>(endpoint: &Endpoint, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode {
        endpoint: endpoint.clone(),
        message: e.to_string(),
    })
}

fn path_segment(value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation("file id must not be empty".into()));
    }
    Ok(urlencoding::encode(value).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_decodes_with_processing_results() {
        let endpoint = Endpoint::new("upload");
        let file: UploadedFile = decode_json(
            &endpoint,
            r#"{
                "file_id": "doc_1700000000",
                "filename": "lease.pdf",
                "file_type": "application/pdf",
                "size": 2048,
                "status": "uploaded",
                "processing_results": {
                    "pages_extracted": 1,
                    "text_length": 2048,
                    "language_detected": "en",
                    "document_type": "legal_document"
                }
            }"#,
        )
        .expect("decode");
        assert_eq!(file.file_id, "doc_1700000000");
        assert_eq!(
            file.processing_results.map(|r| r.document_type),
            Some("legal_document".to_string())
        );
    }

    #[test]
    fn analysis_tolerates_missing_fields() {
        let endpoint = Endpoint::new("analyze/doc_1");
        let analysis: DocumentAnalysis = decode_json(
            &endpoint,
            r#"{
                "file_id": "doc_1",
                "risk_level": "high",
                "confidence_score": 0.82,
                "key_findings": ["uncapped indemnity"]
            }"#,
        )
        .expect("decode");
        assert_eq!(analysis.risk_level, "high");
        assert_eq!(analysis.key_findings, vec!["uncapped indemnity"]);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn chat_reply_accepts_both_gateway_shapes() {
        let endpoint = Endpoint::new("chat");
        let answer: ChatReply = decode_json(
            &endpoint,
            r#"{"answer":"Yes.","confidence":0.4,"routed_to_human":true}"#,
        )
        .expect("answer");
        assert_eq!(
            answer,
            ChatReply::Answer(ChatAnswer {
                answer: "Yes.".into(),
                confidence: 0.4,
                routed_to_human: true
            })
        );
        let result: ChatReply =
            decode_json(&endpoint, r#"{"result":{"risk":"low"}}"#).expect("result");
        assert_eq!(
            result,
            ChatReply::Result {
                result: serde_json::json!({"risk":"low"})
            }
        );
    }

    #[test]
    fn process_response_decodes_status() {
        let endpoint = Endpoint::new("contracts/analyze");
        let response: ContractProcessResponse = decode_json(
            &endpoint,
            r#"{
                "file_name": "msa.docx",
                "output_type": "summarize",
                "summary": "...",
                "risk_score": 0.3,
                "incident_rate": 0.12,
                "confidence": 0.88,
                "status": "needs_review"
            }"#,
        )
        .expect("decode");
        assert_eq!(response.status, ProcessStatus::NeedsReview);
        assert_eq!(OutputType::Summarize.as_str(), "summarize");
    }

    #[test]
    fn decode_failure_names_the_endpoint() {
        let endpoint = Endpoint::new("files");
        let err = decode_json::<FileListing>(&endpoint, "<html>").expect_err("not json");
        assert!(matches!(&err, ApiError::Decode { endpoint, .. } if endpoint.as_str() == "files"));
    }

    #[test]
    fn file_parts_reject_bad_caller_input() {
        assert!(matches!(
            FileUpload::new("  ", b"x".to_vec()).into_part(),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            FileUpload::new("lease.pdf", b"x".to_vec())
                .content_type("not a mime")
                .into_part(),
            Err(ApiError::Validation(message)) if message.contains("not a mime")
        ));
        assert!(
            FileUpload::new("lease.pdf", b"x".to_vec())
                .content_type("application/pdf")
                .into_part()
                .is_ok()
        );
    }

    #[test]
    fn path_segments_are_escaped_and_required() {
        assert_eq!(path_segment("doc 1/2").expect("segment"), "doc%201%2F2");
        assert!(matches!(path_segment("  "), Err(ApiError::Validation(_))));
    }
}
