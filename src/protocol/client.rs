//! Agent transport
//!
//! `AgentClient` is the seam the orchestrator calls through; the HTTP
//! implementation talks to remote agents, and the recommendation stage plugs
//! in as an in-process implementation of the same trait.

use crate::errors::{PipelineError, Result};
use crate::protocol::types::{AgentRequest, AgentResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// One invocable agent endpoint
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse>;
}

/// HTTP transport to a remote agent
pub struct HttpAgentClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpAgentClient {
    /// Create a client for one agent endpoint with a per-call deadline.
    ///
    /// The deadline is enforced by the wrapper in `invoke`, not by reqwest,
    /// so an expired call always surfaces as `PipelineError::Timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().build().map_err(PipelineError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse> {
        let url = format!("{}/invoke", self.base_url);
        let operation = request.operation.clone();

        let call = self.client.post(&url).json(&request).send();

        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(PipelineError::Http)?,
            Err(_) => {
                return Err(PipelineError::Timeout {
                    operation,
                    duration_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        // HTTP-level failure without a JSON body still becomes an agent
        // failure; the caller only ever sees the response map contract.
        if !response.status().is_success() {
            return Ok(AgentResponse::failure(format!(
                "agent returned HTTP {}",
                response.status()
            )));
        }

        let parsed: AgentResponse = response.json().await.map_err(PipelineError::Http)?;
        Ok(parsed)
    }
}
