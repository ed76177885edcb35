//! Recommendation stage: RAG over curriculum documents
//!
//! Validates its inputs before touching any collaborator, then ingests the
//! curriculum, obtains or builds the course index, retrieves context for a
//! query synthesized from the three upstream summaries, and makes a single
//! generation call. Retrieval failures and generation failures surface as
//! distinct error kinds so the caller can tell which collaborator failed.

pub mod agent;

pub use agent::RecommenderAgent;

use crate::config::RetrievalConfig;
use crate::errors::{PipelineError, Result};
use crate::llm::GenerationClient;
use crate::pipeline::validation::validate_course_name;
use crate::retrieval::{assemble_context, ingest, Embedder, IndexStore};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Inputs for one recommendation request
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub course_name: String,
    pub curriculum_paths: Vec<PathBuf>,
    pub feedback_summary: String,
    pub performance_summary: String,
    pub trend_summary: String,
    pub output_path: PathBuf,
}

/// The recommendation stage engine
pub struct Recommender {
    store: IndexStore,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn GenerationClient>,
    retrieval: RetrievalConfig,
}

impl Recommender {
    pub fn new(
        store: IndexStore,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn GenerationClient>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            model,
            retrieval,
        }
    }

    /// Reject bad input before any collaborator is invoked
    fn validate(&self, request: &RecommendationRequest) -> Result<()> {
        validate_course_name(&request.course_name)?;

        for (name, value) in [
            ("feedback_summary", &request.feedback_summary),
            ("performance_summary", &request.performance_summary),
            ("trend_summary", &request.trend_summary),
        ] {
            if value.trim().is_empty() {
                return Err(PipelineError::Validation(format!(
                    "`{name}` must be a non-empty string"
                )));
            }
        }

        if request.output_path.extension().and_then(|e| e.to_str()) != Some("txt") {
            return Err(PipelineError::Validation(
                "output path must be a .txt file".to_string(),
            ));
        }

        Ok(())
    }

    /// Run the full stage: validate, retrieve, generate, persist
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<String> {
        self.validate(request)?;

        let documents = ingest(&request.curriculum_paths).await?;

        let index = self
            .store
            .get_or_build(&request.course_name, &documents, self.embedder.as_ref())
            .await?;

        let query = self.build_query(request);

        let hits = self
            .store
            .query(&index, &query, self.retrieval.top_k, self.embedder.as_ref())
            .await?;

        // Zero hits is acceptable: generation proceeds with degraded input
        let context = assemble_context(&hits, self.retrieval.context_limit);
        eprintln!(
            "[RECOMMEND] retrieved {} documents ({} chars of context)",
            hits.len(),
            context.chars().count()
        );

        let prompt = self.build_prompt(request, &context);
        let recommendation = self.model.generate(&prompt).await?;

        if let Some(parent) = request.output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&request.output_path, &recommendation)?;
        eprintln!(
            "[RECOMMEND] saved recommendations to {}",
            request.output_path.display()
        );

        Ok(recommendation)
    }

    fn build_query(&self, request: &RecommendationRequest) -> String {
        format!(
            "Course: {}\n\
             Feedback Insights: {}\n\
             Performance Insights: {}\n\
             Job Market Insights: {}\n\n\
             Based on these insights, identify what content in the current \
             curriculum should be improved, expanded, or newly added to align \
             with student needs and industry demand.",
            request.course_name,
            request.feedback_summary,
            request.performance_summary,
            request.trend_summary,
        )
    }

    fn build_prompt(&self, request: &RecommendationRequest, context: &str) -> String {
        format!(
            "You are an AI curriculum development specialist.\n\n\
             Course: \"{}\"\n\n\
             ---- Context from Curriculum ----\n{}\n\n\
             ---- Integrated Insights ----\n\
             Student Feedback Summary:\n{}\n\n\
             Student Performance Summary:\n{}\n\n\
             Industry Trend Summary:\n{}\n\n\
             ---- Tasks ----\n\
             1. Suggest 3-5 detailed curriculum improvements (new topics, projects, or tools).\n\
             2. Highlight missing modern skills or industry-relevant modules.\n\
             3. Recommend case studies, hands-on labs, or emerging technologies to include.\n\
             4. Provide a concise 4-line executive summary for educators.\n\n\
             Structure the output with clear headings and actionable details.",
            request.course_name,
            context,
            request.feedback_summary,
            request.performance_summary,
            request.trend_summary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingEmbedder {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    struct ScriptedModel {
        calls: Arc<AtomicUsize>,
        reply: Result<String>,
    }

    #[async_trait]
    impl GenerationClient for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(PipelineError::Generation("model unavailable".to_string())),
            }
        }
    }

    struct Fixture {
        dir: TempDir,
        embed_calls: Arc<AtomicUsize>,
        generate_calls: Arc<AtomicUsize>,
    }

    fn build(reply: Result<String>) -> (Recommender, Fixture) {
        let dir = TempDir::new().unwrap();
        let embed_calls = Arc::new(AtomicUsize::new(0));
        let generate_calls = Arc::new(AtomicUsize::new(0));

        let recommender = Recommender::new(
            IndexStore::new(dir.path().join("cache")),
            Arc::new(CountingEmbedder {
                calls: embed_calls.clone(),
            }),
            Arc::new(ScriptedModel {
                calls: generate_calls.clone(),
                reply,
            }),
            RetrievalConfig::default(),
        );

        (
            recommender,
            Fixture {
                dir,
                embed_calls,
                generate_calls,
            },
        )
    }

    fn write_deck(fixture: &Fixture, name: &str) -> PathBuf {
        let path = fixture.dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"# Slide one\nRegression basics\n---\n# Slide two\nNeural nets\n")
            .unwrap();
        path
    }

    fn request(fixture: &Fixture, paths: Vec<PathBuf>) -> RecommendationRequest {
        RecommendationRequest {
            course_name: "machine learning".to_string(),
            curriculum_paths: paths,
            feedback_summary: "students want more labs".to_string(),
            performance_summary: "grades dip on projects".to_string(),
            trend_summary: "industry wants MLOps".to_string(),
            output_path: fixture.dir.path().join("out/recommendations.txt"),
        }
    }

    #[tokio::test]
    async fn test_recommend_end_to_end() {
        let (recommender, fixture) = build(Ok("Add an MLOps module".to_string()));
        let deck = write_deck(&fixture, "ml.md");

        let text = recommender
            .recommend(&request(&fixture, vec![deck]))
            .await
            .unwrap();

        assert_eq!(text, "Add an MLOps module");
        assert_eq!(fixture.generate_calls.load(Ordering::SeqCst), 1);

        let persisted =
            fs::read_to_string(fixture.dir.path().join("out/recommendations.txt")).unwrap();
        assert_eq!(persisted, "Add an MLOps module");
    }

    #[tokio::test]
    async fn test_empty_summary_rejected_before_any_call() {
        let (recommender, fixture) = build(Ok("unused".to_string()));
        let deck = write_deck(&fixture, "ml.md");

        let mut req = request(&fixture, vec![deck]);
        req.feedback_summary = "   ".to_string();

        let err = recommender.recommend(&req).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(fixture.embed_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_course_name_rejected() {
        let (recommender, fixture) = build(Ok("unused".to_string()));
        let deck = write_deck(&fixture, "ml.md");

        let mut req = request(&fixture, vec![deck]);
        req.course_name = "ml; rm -rf /".to_string();

        assert!(recommender.recommend(&req).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_non_txt_output_rejected() {
        let (recommender, fixture) = build(Ok("unused".to_string()));
        let deck = write_deck(&fixture, "ml.md");

        let mut req = request(&fixture, vec![deck]);
        req.output_path = fixture.dir.path().join("out.pdf");

        assert!(recommender.recommend(&req).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_one_bad_curriculum_path_is_tolerated() {
        let (recommender, fixture) = build(Ok("ok".to_string()));
        let deck = write_deck(&fixture, "ml.md");
        let missing = fixture.dir.path().join("nope.pdf");

        let text = recommender
            .recommend(&request(&fixture, vec![deck, missing]))
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_all_paths_bad_fails_stage() {
        let (recommender, fixture) = build(Ok("unused".to_string()));
        let missing = fixture.dir.path().join("nope.pdf");

        let err = recommender
            .recommend(&request(&fixture, vec![missing]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyIngestion));
        assert_eq!(fixture.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_is_distinct() {
        let (recommender, fixture) = build(Err(PipelineError::Generation("x".to_string())));
        let deck = write_deck(&fixture, "ml.md");

        let err = recommender
            .recommend(&request(&fixture, vec![deck]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
        // Retrieval ran: one embedding per document plus one for the query
        assert_eq!(fixture.embed_calls.load(Ordering::SeqCst), 3);
    }
}
