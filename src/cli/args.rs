//! Command-line argument parsing
//!
//! Clap-based CLI: run the pipeline for a course, or inspect configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ACIS - curriculum intelligence pipeline over analysis agents
#[derive(Parser, Debug)]
#[command(name = "acis")]
#[command(version = "0.3.0")]
#[command(about = "Run the curriculum analysis pipeline for a course", long_about = None)]
pub struct Args {
    /// Course identity to analyze (e.g. "machine_learning")
    #[arg(value_name = "COURSE")]
    pub course: Option<String>,

    /// Root directory of input datasets
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory for stage artifacts and the final report
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    /// Directory for cached vector indexes
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Per-call agent timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline for a course
    Run {
        /// Course identity
        course: String,
    },

    /// Display current configuration
    Config,
}
