//! Pipeline configuration
//!
//! Everything a component needs arrives through this struct at construction
//! time. No component reads the process environment; hosts, ports, model
//! names and directories all live here and round-trip through a TOML file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory holding feedback/, performance/, job_trends/, curriculum/
    pub data_dir: PathBuf,

    /// Directory for per-stage text artifacts and the final report
    pub results_dir: PathBuf,

    /// Directory for persisted vector indexes
    pub index_cache_dir: PathBuf,

    /// Per-call deadline for remote agent invocations, in seconds
    pub agent_timeout_secs: u64,

    #[serde(default)]
    pub agents: AgentEndpoints,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Base URLs for the remote agents, one per stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEndpoints {
    pub feedback: String,
    pub performance: String,
    pub trend: String,
    pub report: String,
}

impl Default for AgentEndpoints {
    fn default() -> Self {
        Self {
            feedback: "http://localhost:9001".to_string(),
            performance: "http://localhost:9002".to_string(),
            trend: "http://localhost:9003".to_string(),
            report: "http://localhost:9005".to_string(),
        }
    }
}

/// Hosted model endpoints used by the recommendation stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the model server (generation + embeddings)
    pub base_url: String,
    /// Generation model name
    pub generation_model: String,
    /// Embedding model name
    pub embedding_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            generation_model: "qwen2.5:7b-instruct".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
        }
    }
}

/// Retrieval parameters for the recommendation stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest documents to retrieve
    pub top_k: usize,
    /// Hard character budget for assembled context
    pub context_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            context_limit: 15_000,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("results"),
            index_cache_dir: PathBuf::from("vectorstore_cache"),
            agent_timeout_secs: 120,
            agents: AgentEndpoints::default(),
            model: ModelConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a file, creating the default if it doesn't exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            let config = PipelineConfig::default();
            config.save(&config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: PipelineConfig = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(config_path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Default configuration file location
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".acis").join("config.toml"))
    }

    // Input locations mirror the upstream data layout: one CSV per course for
    // feedback and performance, one shared job-market CSV for trends.

    pub fn feedback_csv(&self, course: &str) -> PathBuf {
        self.data_dir
            .join("feedback")
            .join(format!("{course}_feedback.csv"))
    }

    pub fn performance_csv(&self, course: &str) -> PathBuf {
        self.data_dir
            .join("performance")
            .join(format!("{course}_scores.csv"))
    }

    pub fn trends_csv(&self) -> PathBuf {
        self.data_dir.join("job_trends").join("job_market_trends.csv")
    }

    /// Curriculum inputs for a course: every file in `curriculum/{course}/`
    /// if that directory exists, otherwise the single `curriculum/{course}.pdf`
    pub fn curriculum_paths(&self, course: &str) -> Vec<PathBuf> {
        let course_dir = self.data_dir.join("curriculum").join(course);
        if course_dir.is_dir() {
            let mut paths: Vec<PathBuf> = fs::read_dir(&course_dir)
                .into_iter()
                .flatten()
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.is_file())
                .collect();
            paths.sort();
            return paths;
        }

        vec![self.data_dir.join("curriculum").join(format!("{course}.pdf"))]
    }

    pub fn stage_output(&self, course: &str, suffix: &str) -> PathBuf {
        self.results_dir.join(format!("{course}_{suffix}.txt"))
    }

    pub fn report_output(&self, course: &str) -> PathBuf {
        self.results_dir.join(format!("{course}_final_report.pdf"))
    }
}
