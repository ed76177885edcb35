//! Integration tests for the persisted index cache
//!
//! The cache key is the course identity alone: the second request for a
//! course loads the persisted index and performs no document embedding, even
//! across engine instances and even when the source documents changed.

use acis::config::RetrievalConfig;
use acis::errors::Result;
use acis::llm::GenerationClient;
use acis::recommend::{RecommendationRequest, Recommender};
use acis::retrieval::{Embedder, IndexStore};
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

struct CountingEmbedder {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![text.len() as f32, 1.0, 2.0])
    }
}

struct StaticModel;

#[async_trait]
impl GenerationClient for StaticModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok("recommendation".to_string())
    }
}

fn recommender(cache_dir: PathBuf, calls: Arc<AtomicUsize>) -> Recommender {
    Recommender::new(
        IndexStore::new(cache_dir),
        Arc::new(CountingEmbedder { calls }),
        Arc::new(StaticModel),
        RetrievalConfig::default(),
    )
}

fn request(dir: &TempDir, deck: PathBuf, out: &str) -> RecommendationRequest {
    RecommendationRequest {
        course_name: "data engineering".to_string(),
        curriculum_paths: vec![deck],
        feedback_summary: "feedback".to_string(),
        performance_summary: "performance".to_string(),
        trend_summary: "trends".to_string(),
        output_path: dir.path().join(out),
    }
}

#[tokio::test]
async fn test_second_run_embeds_only_the_query() {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().join("cache");
    let deck = dir.path().join("deck.md");
    fs::write(&deck, "Batch pipelines\n---\nStream processing\n---\nOrchestration\n").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));

    let first = recommender(cache_dir.clone(), calls.clone());
    first
        .recommend(&request(&dir, deck.clone(), "first.txt"))
        .await
        .unwrap();
    // Three documents plus one query embedding
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    // Fresh engine instance, same cache directory: the index is loaded, the
    // only embedding is the query itself.
    let second = recommender(cache_dir.clone(), calls.clone());
    second
        .recommend(&request(&dir, deck, "second.txt"))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_changed_documents_do_not_trigger_rebuild() {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().join("cache");
    let deck = dir.path().join("deck.md");
    fs::write(&deck, "Original content\n").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let engine = recommender(cache_dir.clone(), calls.clone());

    engine
        .recommend(&request(&dir, deck.clone(), "a.txt"))
        .await
        .unwrap();
    let after_build = calls.load(Ordering::SeqCst);

    // Documented staleness: rewriting the source does not invalidate the
    // cached index for this course.
    fs::write(&deck, "Completely rewritten content\n---\nWith extra slides\n").unwrap();
    engine
        .recommend(&request(&dir, deck, "b.txt"))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), after_build + 1);
}

#[tokio::test]
async fn test_distinct_courses_get_distinct_indexes() {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().join("cache");
    let deck = dir.path().join("deck.md");
    fs::write(&deck, "Shared deck\n").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let engine = recommender(cache_dir.clone(), calls.clone());

    let mut req_a = request(&dir, deck.clone(), "a.txt");
    req_a.course_name = "course one".to_string();
    let mut req_b = request(&dir, deck, "b.txt");
    req_b.course_name = "course two".to_string();

    engine.recommend(&req_a).await.unwrap();
    engine.recommend(&req_b).await.unwrap();

    assert!(cache_dir.join("course_one_index.json").exists());
    assert!(cache_dir.join("course_two_index.json").exists());
}
