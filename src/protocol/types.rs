//! Request and response types for agent invocation

use crate::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Argument value: a string or a list of strings (file paths travel as strings)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(v: Vec<String>) -> Self {
        ArgValue::List(v)
    }
}

impl ArgValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            ArgValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ArgValue::Text(_) => None,
            ArgValue::List(v) => Some(v),
        }
    }
}

/// One agent invocation: operation name plus named arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub operation: String,
    pub arguments: BTreeMap<String, ArgValue>,
}

impl AgentRequest {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            arguments: BTreeMap::new(),
        }
    }

    /// Add a named argument (builder style)
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Fetch a required string argument
    pub fn require_text(&self, name: &str) -> Result<&str> {
        self.arguments
            .get(name)
            .and_then(ArgValue::as_text)
            .ok_or_else(|| {
                PipelineError::Validation(format!("missing string argument `{name}`"))
            })
    }

    /// Fetch a required string-list argument
    pub fn require_list(&self, name: &str) -> Result<&[String]> {
        self.arguments
            .get(name)
            .and_then(ArgValue::as_list)
            .ok_or_else(|| {
                PipelineError::Validation(format!("missing list argument `{name}`"))
            })
    }
}

/// Flat string map returned by an agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentResponse {
    pub fields: BTreeMap<String, String>,
}

impl AgentResponse {
    /// Successful response carrying one key
    pub fn success(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(key.into(), value.into());
        Self { fields }
    }

    /// Failure response carrying only the `error` key
    pub fn failure(message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("error".to_string(), message.into());
        Self { fields }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// The `error` key, if present. Its presence is authoritative regardless
    /// of transport-level success.
    pub fn error(&self) -> Option<&str> {
        self.fields.get("error").map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Extract the success payload under `expected`, treating a present
    /// `error` key as the stage's failure and a missing key as malformed.
    pub fn into_payload(self, stage: &str, expected: &str) -> Result<String> {
        if let Some(message) = self.error() {
            return Err(PipelineError::AgentFailure {
                stage: stage.to_string(),
                message: message.to_string(),
            });
        }

        match self.fields.get(expected) {
            Some(value) => Ok(value.clone()),
            None => Err(PipelineError::MalformedResponse {
                stage: stage.to_string(),
                expected: expected.to_string(),
            }),
        }
    }
}
