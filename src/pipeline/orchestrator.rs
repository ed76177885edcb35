//! Pipeline orchestrator
//!
//! Drives the five stages sequentially against their agent clients, carrying
//! the accumulated summaries forward. The first stage to fail ends the run:
//! no later stage is invoked and no partial report is written. Prior partial
//! outputs of a failed run are never reused; every invocation is a fresh
//! attempt.

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Result};
use crate::pipeline::state::{PipelineRun, Stage};
use crate::pipeline::validation::{validate_course_name, validate_csv_schema};
use crate::protocol::{AgentClient, AgentRequest};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One client per stage
pub struct StageClients {
    pub feedback: Arc<dyn AgentClient>,
    pub performance: Arc<dyn AgentClient>,
    pub trend: Arc<dyn AgentClient>,
    pub recommendation: Arc<dyn AgentClient>,
    pub report: Arc<dyn AgentClient>,
}

impl StageClients {
    fn for_stage(&self, stage: Stage) -> &Arc<dyn AgentClient> {
        match stage {
            Stage::Feedback => &self.feedback,
            Stage::Performance => &self.performance,
            Stage::Trend => &self.trend,
            Stage::Recommendation => &self.recommendation,
            Stage::Report => &self.report,
        }
    }
}

pub struct PipelineOrchestrator {
    config: PipelineConfig,
    clients: StageClients,
}

impl PipelineOrchestrator {
    pub fn new(config: PipelineConfig, clients: StageClients) -> Self {
        Self { config, clients }
    }

    /// Execute a full pipeline run for one course.
    ///
    /// Returns the run log; a failed stage is recorded there rather than
    /// bubbling out, so callers always see the furthest stage reached and
    /// the first error. Only pre-run course validation returns `Err`.
    pub async fn run(&self, course: &str) -> Result<PipelineRun> {
        validate_course_name(course)?;

        let feedback_csv = self.config.feedback_csv(course);
        let performance_csv = self.config.performance_csv(course);
        let trends_csv = self.config.trends_csv();
        let curriculum = self.config.curriculum_paths(course);

        let mut inputs = vec![feedback_csv.clone(), performance_csv.clone(), trends_csv.clone()];
        inputs.extend(curriculum.iter().cloned());

        let mut run = PipelineRun::new(course, inputs);

        // Three summarization stages, strictly in order
        let Some(feedback_summary) = self
            .run_summary_stage(&mut run, Stage::Feedback, course, &feedback_csv)
            .await?
        else {
            return Ok(run);
        };

        let Some(performance_summary) = self
            .run_summary_stage(&mut run, Stage::Performance, course, &performance_csv)
            .await?
        else {
            return Ok(run);
        };

        let Some(trend_summary) = self
            .run_summary_stage(&mut run, Stage::Trend, course, &trends_csv)
            .await?
        else {
            return Ok(run);
        };

        // Recommendation stage
        let recommendations = match self
            .recommendation_stage(
                course,
                &curriculum,
                &feedback_summary,
                &performance_summary,
                &trend_summary,
            )
            .await
        {
            Ok(text) => {
                eprintln!("[STAGE] recommendation succeeded");
                run.record_success(Stage::Recommendation, text.clone())?;
                text
            }
            Err(e) => {
                eprintln!("[STAGE] recommendation failed: {e}");
                run.record_failure(Stage::Recommendation, &e)?;
                return Ok(run);
            }
        };

        // Report stage
        let report_path = self.config.report_output(course);
        match self
            .report_stage(
                course,
                &feedback_summary,
                &performance_summary,
                &trend_summary,
                &recommendations,
                &report_path,
            )
            .await
        {
            Ok(()) => {
                eprintln!("[STAGE] report written to {}", report_path.display());
                run.record_success(Stage::Report, report_path.display().to_string())?;
                run.artifact = Some(report_path);
            }
            Err(e) => {
                eprintln!("[STAGE] report failed: {e}");
                run.record_failure(Stage::Report, &e)?;
            }
        }

        Ok(run)
    }

    /// Run one summarization stage and record its result; `None` means the
    /// stage failed and the run has absorbed into `Failed`.
    async fn run_summary_stage(
        &self,
        run: &mut PipelineRun,
        stage: Stage,
        course: &str,
        csv_path: &Path,
    ) -> Result<Option<String>> {
        match self.summary_stage(stage, course, csv_path).await {
            Ok(summary) => {
                eprintln!("[STAGE] {} succeeded", stage.name());
                run.record_success(stage, summary.clone())?;
                Ok(Some(summary))
            }
            Err(e) => {
                eprintln!("[STAGE] {} failed: {e}", stage.name());
                run.record_failure(stage, &e)?;
                Ok(None)
            }
        }
    }

    /// One summarization stage: schema pre-flight, then the agent call
    async fn summary_stage(&self, stage: Stage, course: &str, csv_path: &Path) -> Result<String> {
        validate_csv_schema(stage, csv_path)?;

        let output_path = self.config.stage_output(course, stage.name());
        let request = AgentRequest::new(stage.operation())
            .arg("course_name", course)
            .arg("file_path", csv_path.display().to_string())
            .arg("output_path", output_path.display().to_string());

        let response = self.clients.for_stage(stage).invoke(request).await?;
        response.into_payload(stage.name(), stage.success_key())
    }

    async fn recommendation_stage(
        &self,
        course: &str,
        curriculum: &[PathBuf],
        feedback_summary: &str,
        performance_summary: &str,
        trend_summary: &str,
    ) -> Result<String> {
        let stage = Stage::Recommendation;
        let paths: Vec<String> = curriculum.iter().map(|p| p.display().to_string()).collect();
        let output_path = self.config.stage_output(course, stage.name());

        let request = AgentRequest::new(stage.operation())
            .arg("course_name", course)
            .arg("curriculum_paths", paths)
            .arg("feedback_summary", feedback_summary)
            .arg("performance_summary", performance_summary)
            .arg("trend_summary", trend_summary)
            .arg("output_path", output_path.display().to_string());

        let response = self.clients.for_stage(stage).invoke(request).await?;
        response.into_payload(stage.name(), stage.success_key())
    }

    /// Invoke the report agent and decode its base64 artifact to disk
    async fn report_stage(
        &self,
        course: &str,
        feedback_summary: &str,
        performance_summary: &str,
        trend_summary: &str,
        recommendations: &str,
        report_path: &Path,
    ) -> Result<()> {
        let stage = Stage::Report;
        let request = AgentRequest::new(stage.operation())
            .arg("course_name", course)
            .arg("feedback_summary", feedback_summary)
            .arg("performance_summary", performance_summary)
            .arg("trend_summary", trend_summary)
            .arg("recommendations", recommendations)
            .arg("output_path", report_path.display().to_string());

        let response = self.clients.for_stage(stage).invoke(request).await?;
        let encoded = response.into_payload(stage.name(), stage.success_key())?;

        let bytes = BASE64.decode(encoded.trim()).map_err(|e| {
            PipelineError::AgentFailure {
                stage: stage.name().to_string(),
                message: format!("invalid base64 report payload: {e}"),
            }
        })?;

        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(report_path, bytes)?;

        Ok(())
    }
}
