//! Streaming client for the legal research, drafting and compliance backend.
//!
//! The backend answers long-running generations as server-sent events: one
//! `data: {json}` line per frame, ending with `{"done": true}` or
//! `{"error": "..."}`. A `StreamSession` turns that byte stream into ordered
//! `StreamEvent`s carrying the accumulated text, and ends in exactly one
//! `StreamOutcome`.
//!
//! # Pull events
//!
//! ```no_run
//! use legis_client::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let client = LegisClient::from_env()?;
//! let mut session = client
//!     .research(&ResearchRequest::new("force majeure in supply contracts"))?
//!     .start_stream()?;
//!
//! while let Some(event) = session.next_event().await {
//!     if let StreamEvent::Progress { text, .. } = event {
//!         println!("{text}");
//!     }
//! }
//! let answer = session.finish().await.into_result()?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```
//!
//! # Push into an observer
//!
//! ```no_run
//! use legis_client::prelude::*;
//!
//! struct Print;
//!
//! impl StreamObserver for Print {
//!     fn on_progress(&mut self, text: &str) {
//!         println!("{} chars", text.len());
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let client = LegisClient::from_env()?;
//! let outcome = client
//!     .draft(&DraftRequest::new("mutual NDA", "nda"))?
//!     .run(&mut Print)
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

/// Non-streaming backend calls.
pub mod api;
/// Cancellation handle shared between a session and its caller.
pub mod cancel;
/// Client entry point and builder.
pub mod client;
/// Connection settings and environment loading.
pub mod config;
pub(crate) mod decoder;
/// Backend operation names and URL joining.
pub mod endpoint;
/// Public error types.
pub mod errors;
/// Stream frame schema and classification.
pub mod frame;
/// Logging setup.
pub mod observability;
/// Push-based session consumption.
pub mod observer;
/// Common imports for typical usage.
pub mod prelude;
/// Typed payloads for the streaming operations.
pub mod requests;
/// Stream builder and session state machine.
pub mod session;
/// Session states, events and outcomes.
pub mod stream;
/// Transport contract and the HTTP implementation.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{
    BackendApi, ChatAnswer, ChatReply, ContractProcessResponse, DeletedFile, DocumentAnalysis,
    DraftDownloadRequest, FileListing, FileUpload, OutputType, ProcessStatus, ProcessingResults,
    StoredFile, UploadedFile,
};
pub use cancel::CancelHandle;
pub use client::{LegisClient, LegisClientBuilder};
pub use config::{ClientConfig, load_dotenv};
pub use endpoint::Endpoint;
pub use errors::{ApiError, ClientError, FrameError, StreamError};
pub use frame::{FRAME_SCHEMA_VERSION, FrameKind, StreamFrame};
pub use observability::init_observability;
pub use observer::StreamObserver;
pub use requests::{ComplianceRequest, DraftRequest, ResearchRequest, StreamOperation};
pub use session::{StreamBuilder, StreamSession};
pub use stream::{SessionState, StreamEvent, StreamOutcome};
pub use transport::{ByteStream, HttpTransport, StreamRequest, Transport};
