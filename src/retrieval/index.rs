//! Persisted vector index, one per course
//!
//! The store is an explicit cache with a documented staleness contract:
//! an index is built on the first recommendation request for a course and
//! loaded verbatim on every later request — there is no rebuild trigger, so
//! changed source documents are not reflected until the cached file is
//! removed externally.

use crate::errors::{PipelineError, Result};
use crate::retrieval::embedding::Embedder;
use crate::retrieval::loader::Document;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One embedded document inside an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub document: Document,
}

/// Flat vector index over a course's curriculum documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    pub course: String,
    pub entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Nearest `k` documents by cosine similarity, descending score, ties
    /// broken by original ingestion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(f32, &Document)> {
        let mut scored: Vec<(f32, &Document)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query, &entry.vector), &entry.document))
            .collect();

        // Stable sort keeps ingestion order among equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine similarity; zero when either vector has zero magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Disk-backed store of per-course indexes
pub struct IndexStore {
    cache_dir: PathBuf,
}

impl IndexStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    fn index_path(&self, course: &str) -> PathBuf {
        // Course names are validated upstream to word chars, spaces, hyphens;
        // spaces are flattened for the filename.
        let slug = course.replace(' ', "_");
        self.cache_dir.join(format!("{slug}_index.json"))
    }

    /// Load the cached index for `course`, or embed `documents` and persist
    /// a new one. On a cache hit the supplied documents are ignored entirely.
    pub async fn get_or_build(
        &self,
        course: &str,
        documents: &[Document],
        embedder: &dyn Embedder,
    ) -> Result<VectorIndex> {
        let path = self.index_path(course);

        if path.is_file() {
            eprintln!("[INDEX] cache hit for `{course}`: {}", path.display());
            return self.load(&path);
        }

        eprintln!("[INDEX] building new index for `{course}` ({} documents)", documents.len());

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        let entries = vectors
            .into_iter()
            .zip(documents.iter().cloned())
            .map(|(vector, document)| IndexEntry { vector, document })
            .collect();

        let index = VectorIndex {
            course: course.to_string(),
            entries,
        };

        self.persist(&path, &index)?;
        Ok(index)
    }

    /// Embed `text` and return the nearest `k` documents
    pub async fn query<'a>(
        &self,
        index: &'a VectorIndex,
        text: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<&'a Document>> {
        let query_vector = embedder
            .embed(text)
            .await
            .map_err(|e| PipelineError::Retrieval(e.to_string()))?;

        Ok(index
            .search(&query_vector, k)
            .into_iter()
            .map(|(_, doc)| doc)
            .collect())
    }

    fn load(&self, path: &Path) -> Result<VectorIndex> {
        let contents = fs::read_to_string(path)?;
        let index: VectorIndex = serde_json::from_str(&contents)?;
        Ok(index)
    }

    fn persist(&self, path: &Path, index: &VectorIndex) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(index)?;
        fs::write(path, json)?;
        eprintln!("[INDEX] persisted index to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Deterministic embedder: counts calls, maps text length and first byte
    /// into a small vector.
    struct StubEmbedder {
        calls: AtomicUsize,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> crate::errors::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let first = text.bytes().next().unwrap_or(0) as f32;
            Ok(vec![text.len() as f32, first, 1.0])
        }
    }

    fn doc(position: usize, text: &str) -> Document {
        Document {
            source: PathBuf::from("deck.md"),
            position,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_score_then_ingestion() {
        let index = VectorIndex {
            course: "ml".to_string(),
            entries: vec![
                IndexEntry {
                    vector: vec![0.0, 1.0],
                    document: doc(1, "orthogonal"),
                },
                IndexEntry {
                    vector: vec![1.0, 0.0],
                    document: doc(2, "aligned-first"),
                },
                IndexEntry {
                    vector: vec![2.0, 0.0],
                    document: doc(3, "aligned-second"),
                },
            ],
        };

        let hits = index.search(&[1.0, 0.0], 3);
        // Both aligned vectors score 1.0; ingestion order breaks the tie.
        assert_eq!(hits[0].1.text, "aligned-first");
        assert_eq!(hits[1].1.text, "aligned-second");
        assert_eq!(hits[2].1.text, "orthogonal");
    }

    #[test]
    fn test_search_truncates_to_k() {
        let index = VectorIndex {
            course: "ml".to_string(),
            entries: (0..10)
                .map(|i| IndexEntry {
                    vector: vec![1.0, i as f32],
                    document: doc(i, "d"),
                })
                .collect(),
        };

        assert_eq!(index.search(&[1.0, 0.0], 4).len(), 4);
        assert_eq!(index.search(&[1.0, 0.0], 100).len(), 10);
    }

    #[tokio::test]
    async fn test_get_or_build_embeds_once() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::new(dir.path());
        let embedder = StubEmbedder::new();
        let docs = vec![doc(1, "intro slide"), doc(2, "models slide")];

        let built = store
            .get_or_build("machine learning", &docs, &embedder)
            .await
            .unwrap();
        assert_eq!(built.len(), 2);
        assert_eq!(embedder.call_count(), 2);

        // Second call is a cache hit: documents are ignored, nothing embedded.
        let other_docs = vec![doc(1, "completely different content")];
        let loaded = store
            .get_or_build("machine learning", &other_docs, &embedder)
            .await
            .unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(embedder.call_count(), 2);
        assert_eq!(loaded.entries[0].document.text, "intro slide");
    }

    #[tokio::test]
    async fn test_query_returns_ranked_documents() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::new(dir.path());
        let embedder = StubEmbedder::new();
        let docs = vec![doc(1, "aaaa"), doc(2, "zz")];

        let index = store.get_or_build("ml", &docs, &embedder).await.unwrap();
        let hits = store.query(&index, "aaaa", 1, &embedder).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "aaaa");
    }

    #[tokio::test]
    async fn test_query_empty_index_is_not_an_error() {
        let store = IndexStore::new(TempDir::new().unwrap().path());
        let embedder = StubEmbedder::new();
        let index = VectorIndex {
            course: "ml".to_string(),
            entries: Vec::new(),
        };

        let hits = store.query(&index, "anything", 5, &embedder).await.unwrap();
        assert!(hits.is_empty());
    }
}
