//! Error types for the curriculum intelligence pipeline
//!
//! One taxonomy for the whole crate: validation errors are caught before any
//! external call, collaborator errors are wrapped with the identity of the
//! stage that hit them, and nothing is retried automatically.

use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input validation errors (bad characters, empty required field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// CSV header does not match the stage's required column set
    #[error("Schema mismatch for {stage}: missing columns [{missing}]")]
    SchemaMismatch { stage: String, missing: String },

    /// Remote agent reported a failure via its `error` key
    #[error("{stage} agent error: {message}")]
    AgentFailure { stage: String, message: String },

    /// Response carried neither a success key nor an `error` key
    #[error("Malformed response from {stage}: expected `{expected}` or `error` key")]
    MalformedResponse { stage: String, expected: String },

    /// Remote call exceeded its deadline
    #[error("Operation `{operation}` timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Embedding computation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Similarity query against the vector index failed
    #[error("Retriever error: {0}")]
    Retrieval(String),

    /// Generation model invocation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Ingestion produced zero documents across all paths
    #[error("No content loaded from curriculum files")]
    EmptyIngestion,

    /// Pipeline state machine misuse
    #[error("Invalid state transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors (index store, artifact writes, CSV reads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("Pipeline error: {0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Generic(err.to_string())
    }
}

impl PipelineError {
    /// True for errors caught before any external call was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PipelineError::Validation(_) | PipelineError::SchemaMismatch { .. }
        )
    }
}
