//! Pipeline state machine and run log
//!
//! Deterministic finite state machine over the five stages:
//!
//! ```text
//! Feedback -> Performance -> Trend -> Recommendation -> Report -> Done
//!     \            \           \              \            \
//!      +------------+-----------+--------------+------------+--> Failed
//! ```
//!
//! `Done` and `Failed` are terminal. There is no retry, rollback, or
//! resumption: a rerun starts a fresh `PipelineRun`.

use crate::errors::{PipelineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// The five pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Feedback,
    Performance,
    Trend,
    Recommendation,
    Report,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Feedback,
        Stage::Performance,
        Stage::Trend,
        Stage::Recommendation,
        Stage::Report,
    ];

    /// Short identifier used in error messages and artifact names
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Feedback => "feedback",
            Stage::Performance => "performance",
            Stage::Trend => "trends",
            Stage::Recommendation => "recommendation",
            Stage::Report => "report",
        }
    }

    /// Operation name the stage's agent exposes
    pub fn operation(&self) -> &'static str {
        match self {
            Stage::Feedback => "analyze_feedback",
            Stage::Performance => "evaluate_performance",
            Stage::Trend => "analyze_job_trends",
            Stage::Recommendation => "recommend_curriculum_updates",
            Stage::Report => "generate_report",
        }
    }

    /// Response key the stage's agent must populate on success
    pub fn success_key(&self) -> &'static str {
        match self {
            Stage::Feedback | Stage::Performance | Stage::Trend => "summary",
            Stage::Recommendation => "recommendation",
            Stage::Report => "report",
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Feedback => Some(Stage::Performance),
            Stage::Performance => Some(Stage::Trend),
            Stage::Trend => Some(Stage::Recommendation),
            Stage::Recommendation => Some(Stage::Report),
            Stage::Report => None,
        }
    }
}

/// Events that drive state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    StageSucceeded,
    StageFailed,
}

/// Pipeline execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    Running(Stage),
    /// All five stages succeeded (terminal)
    Done,
    /// A stage failed; no later stage executes (terminal)
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// The stage currently executing, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Running(stage) => Some(*stage),
            _ => None,
        }
    }

    /// Attempt a state transition.
    ///
    /// Success advances to the next stage (or `Done` after Report); failure
    /// absorbs into `Failed` from any running stage. Terminal states reject
    /// further events.
    pub fn transition(&self, event: StageEvent) -> Result<PipelineState> {
        match (self, event) {
            (PipelineState::Running(stage), StageEvent::StageSucceeded) => {
                Ok(match stage.next() {
                    Some(next) => PipelineState::Running(next),
                    None => PipelineState::Done,
                })
            }
            (PipelineState::Running(_), StageEvent::StageFailed) => Ok(PipelineState::Failed),
            (from, event) => Err(PipelineError::InvalidTransition {
                from: format!("{from:?}"),
                event: format!("{event:?}"),
            }),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineState::Running(Stage::Feedback) => "Analyzing Feedback",
            PipelineState::Running(Stage::Performance) => "Evaluating Performance",
            PipelineState::Running(Stage::Trend) => "Analyzing Job Trends",
            PipelineState::Running(Stage::Recommendation) => "Generating Recommendations",
            PipelineState::Running(Stage::Report) => "Rendering Report",
            PipelineState::Done => "Completed",
            PipelineState::Failed => "Failed",
        }
    }
}

/// Outcome of one stage: exactly one of success or failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageOutcome {
    Success {
        /// Stage summary text (or artifact path for the report stage)
        text: String,
        /// Stage-specific structured fields beyond the primary payload
        #[serde(default)]
        extras: BTreeMap<String, String>,
    },
    Failure {
        error: String,
    },
}

/// The recorded outcome of one pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

impl StageResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, StageOutcome::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            StageOutcome::Failure { error } => Some(error),
            StageOutcome::Success { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            StageOutcome::Success { text, .. } => Some(text),
            StageOutcome::Failure { .. } => None,
        }
    }
}

/// Ordered log of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub course: String,
    /// Input identities supplied to the run
    pub inputs: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub results: Vec<StageResult>,
    pub state: PipelineState,
    /// Final rendered artifact, present only when the run completed
    pub artifact: Option<PathBuf>,
}

impl PipelineRun {
    pub fn new(course: impl Into<String>, inputs: Vec<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            course: course.into(),
            inputs,
            started_at: Utc::now(),
            results: Vec::new(),
            state: PipelineState::Running(Stage::Feedback),
            artifact: None,
        }
    }

    /// Append a successful stage result and advance the state machine
    pub fn record_success(&mut self, stage: Stage, text: String) -> Result<()> {
        self.results.push(StageResult {
            stage,
            outcome: StageOutcome::Success {
                text,
                extras: BTreeMap::new(),
            },
        });
        self.state = self.state.transition(StageEvent::StageSucceeded)?;
        Ok(())
    }

    /// Append a failed stage result and absorb into `Failed`
    pub fn record_failure(&mut self, stage: Stage, error: &PipelineError) -> Result<()> {
        self.results.push(StageResult {
            stage,
            outcome: StageOutcome::Failure {
                error: error.to_string(),
            },
        });
        self.state = self.state.transition(StageEvent::StageFailed)?;
        Ok(())
    }

    pub fn completed(&self) -> bool {
        self.state == PipelineState::Done
    }

    /// Furthest stage that was reached (ran, successfully or not)
    pub fn furthest_stage(&self) -> Option<Stage> {
        self.results.last().map(|r| r.stage)
    }

    /// Error from the first failing stage, if the run failed
    pub fn first_error(&self) -> Option<&str> {
        self.results.iter().find_map(|r| r.error())
    }

    /// Success text recorded for a stage
    pub fn stage_text(&self, stage: Stage) -> Option<&str> {
        self.results
            .iter()
            .find(|r| r.stage == stage)
            .and_then(StageResult::text)
    }
}
