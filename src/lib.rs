//! ACIS - Agentic Curriculum Intelligence System
//!
//! Coordinates five analysis agents (feedback, performance, trend,
//! recommendation, report) into a single pipeline run per course, with a
//! retrieval-augmented recommendation stage backed by a persisted per-course
//! vector index.
//!
//! # Architecture
//!
//! - `protocol`: the call/response contract every agent honors
//! - `retrieval`: document ingestion, embedding, index cache, context assembly
//! - `recommend`: the RAG recommendation stage
//! - `pipeline`: state machine, validation, and the orchestrator

pub mod errors;
pub mod config;
pub mod protocol;
pub mod retrieval;
pub mod llm;
pub mod recommend;
pub mod pipeline;
pub mod cli;

// Re-export commonly used types
pub use errors::{PipelineError, Result};
pub use pipeline::{PipelineOrchestrator, PipelineRun, Stage, StageClients};
