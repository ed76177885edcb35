//! Retrieval subsystem for the recommendation stage
//!
//! Loads curriculum source documents, embeds them, caches one vector index
//! per course on disk, and answers similarity queries whose hits are
//! assembled into a character-budgeted context string.

pub mod context;
pub mod embedding;
pub mod index;
pub mod loader;

pub use context::assemble_context;
pub use embedding::{Embedder, OllamaEmbedder};
pub use index::{IndexStore, VectorIndex};
pub use loader::{ingest, Document, DocumentFormat};
