//! Agent invocation contract
//!
//! The shared call/response shape every agent and the orchestrator honor:
//! one named operation per agent, string/string-list arguments, and a flat
//! string map back carrying exactly one of a success key or an `error` key.

pub mod client;
pub mod types;

pub use client::{AgentClient, HttpAgentClient};
pub use types::{AgentRequest, AgentResponse, ArgValue};
