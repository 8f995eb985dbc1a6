//! Common imports for typical client usage.
pub use crate::{
    BackendApi, CancelHandle, ClientConfig, ClientError, ComplianceRequest, DraftRequest,
    Endpoint, LegisClient, ResearchRequest, SessionState, StreamError, StreamEvent,
    StreamObserver, StreamOperation, StreamOutcome, StreamSession,
};
