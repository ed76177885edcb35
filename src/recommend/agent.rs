//! In-process agent adapter for the recommendation stage
//!
//! Wraps `Recommender` behind the same `AgentClient` contract the remote
//! agents use, so the orchestrator sequences all five stages uniformly.
//! Errors are folded into the response map's `error` key; the map never
//! carries both a success key and an error key.

use crate::errors::Result;
use crate::protocol::{AgentClient, AgentRequest, AgentResponse};
use crate::recommend::{RecommendationRequest, Recommender};
use async_trait::async_trait;
use std::path::PathBuf;

/// Operation name exposed by this agent
pub const OPERATION: &str = "recommend_curriculum_updates";

pub struct RecommenderAgent {
    recommender: Recommender,
}

impl RecommenderAgent {
    pub fn new(recommender: Recommender) -> Self {
        Self { recommender }
    }

    fn parse(request: &AgentRequest) -> Result<RecommendationRequest> {
        Ok(RecommendationRequest {
            course_name: request.require_text("course_name")?.to_string(),
            curriculum_paths: request
                .require_list("curriculum_paths")?
                .iter()
                .map(PathBuf::from)
                .collect(),
            feedback_summary: request.require_text("feedback_summary")?.to_string(),
            performance_summary: request.require_text("performance_summary")?.to_string(),
            trend_summary: request.require_text("trend_summary")?.to_string(),
            output_path: PathBuf::from(request.require_text("output_path")?),
        })
    }
}

#[async_trait]
impl AgentClient for RecommenderAgent {
    async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse> {
        let parsed = match Self::parse(&request) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(AgentResponse::failure(e.to_string())),
        };

        match self.recommender.recommend(&parsed).await {
            Ok(text) => Ok(AgentResponse::success("recommendation", text)),
            Err(e) => Ok(AgentResponse::failure(e.to_string())),
        }
    }
}
