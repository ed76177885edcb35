//! ACIS - Main CLI entry point

use acis::cli::{Args, Commands};
use acis::config::PipelineConfig;
use acis::llm::OllamaGenerateClient;
use acis::pipeline::{PipelineOrchestrator, PipelineRun, StageClients};
use acis::protocol::HttpAgentClient;
use acis::recommend::{Recommender, RecommenderAgent};
use acis::retrieval::{IndexStore, OllamaEmbedder};
use anyhow::{anyhow, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PipelineConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(dir) = args.results_dir.clone() {
        config.results_dir = dir;
    }
    if let Some(dir) = args.cache_dir.clone() {
        config.index_cache_dir = dir;
    }
    if let Some(secs) = args.timeout {
        config.agent_timeout_secs = secs;
    }

    match args.command {
        Some(Commands::Config) => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Run { course }) => run_pipeline(&config, &course).await,
        None => match args.course {
            Some(course) => run_pipeline(&config, &course).await,
            None => Err(anyhow!("no course given; try `acis run <course>`")),
        },
    }
}

async fn run_pipeline(config: &PipelineConfig, course: &str) -> Result<()> {
    println!(
        "{} analyzing course {}",
        "ACIS".bold().cyan(),
        course.bold()
    );

    let orchestrator = PipelineOrchestrator::new(config.clone(), build_clients(config)?);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Running pipeline...");

    let run = orchestrator.run(course).await?;
    pb.finish_and_clear();

    print_run(&run);

    if run.completed() {
        Ok(())
    } else {
        Err(anyhow!("pipeline failed at the {} stage",
            run.furthest_stage()
                .map(|s| s.name())
                .unwrap_or("first")))
    }
}

fn build_clients(config: &PipelineConfig) -> Result<StageClients> {
    let timeout = Duration::from_secs(config.agent_timeout_secs);

    // The recommendation stage runs in-process behind the same contract the
    // remote agents use.
    let recommender = Recommender::new(
        IndexStore::new(config.index_cache_dir.clone()),
        Arc::new(OllamaEmbedder::new(
            config.model.base_url.clone(),
            config.model.embedding_model.clone(),
        )?),
        Arc::new(OllamaGenerateClient::new(
            config.model.base_url.clone(),
            config.model.generation_model.clone(),
        )?),
        config.retrieval.clone(),
    );

    Ok(StageClients {
        feedback: Arc::new(HttpAgentClient::new(config.agents.feedback.clone(), timeout)?),
        performance: Arc::new(HttpAgentClient::new(
            config.agents.performance.clone(),
            timeout,
        )?),
        trend: Arc::new(HttpAgentClient::new(config.agents.trend.clone(), timeout)?),
        recommendation: Arc::new(RecommenderAgent::new(recommender)),
        report: Arc::new(HttpAgentClient::new(config.agents.report.clone(), timeout)?),
    })
}

fn print_run(run: &PipelineRun) {
    println!();
    for result in &run.results {
        match result.error() {
            None => println!(
                "  {} {}",
                "✓".green().bold(),
                result.stage.name()
            ),
            Some(error) => println!(
                "  {} {}: {}",
                "✗".red().bold(),
                result.stage.name(),
                error.red()
            ),
        }
    }

    println!();
    if run.completed() {
        if let Some(artifact) = &run.artifact {
            println!(
                "{} final report: {}",
                run.state.display_name().green().bold(),
                artifact.display().to_string().bold()
            );
        }
    } else {
        println!(
            "{} stopped after {} of 5 stages",
            run.state.display_name().red().bold(),
            run.results.len()
        );
    }
}
