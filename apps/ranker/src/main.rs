mod config;
mod documents;
mod errors;
mod llm_client;
mod models;
mod ranking;
mod scoring;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::documents::{load_job_description, scan_documents};
use crate::errors::RankerError;
use crate::llm_client::LlmClient;
use crate::ranking::coordinator::{run_batch, NoCheckpoint, ProgressSink, ReportCheckpoint};
use crate::ranking::report::render;
use crate::scoring::LlmScorer;

/// Score and rank resumes against a job description using a local LLM.
#[derive(Debug, Parser)]
#[command(name = "resume-ranker", version)]
struct Cli {
    /// Folder containing resume files (.pdf, .docx), scanned recursively
    #[arg(long, default_value = "./data/")]
    data: PathBuf,

    /// Job description text file
    #[arg(long, default_value = "./jd.txt")]
    jd: PathBuf,

    /// Where to write the ranking report
    #[arg(long, default_value = "./results.txt")]
    output: PathBuf,

    /// Only write the report once at the end instead of after every resume
    #[arg(long)]
    no_checkpoint: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-ranker v{}", env!("CARGO_PKG_VERSION"));

    if !cli.data.is_dir() {
        return Err(RankerError::DataFolderNotFound(cli.data).into());
    }

    info!("Loading job description from {}", cli.jd.display());
    let job_description = load_job_description(&cli.jd)?;

    let llm = LlmClient::new(&config)?;
    info!("LLM client initialized (model: {})", llm.model());
    match llm.check_model_available().await {
        Ok(true) => {}
        Ok(false) => warn!(
            "Model {} is not pulled on {}; scoring calls will fail",
            llm.model(),
            config.ollama_base_url
        ),
        Err(e) => warn!("Could not reach Ollama at {}: {e}", config.ollama_base_url),
    }

    info!("Scanning {} for resumes...", cli.data.display());
    let scan = scan_documents(&cli.data);
    if scan.total_found == 0 {
        return Err(RankerError::NoDocuments(cli.data).into());
    }
    info!(
        "Found {} documents ({} PDF, {} DOCX), {} unreadable",
        scan.total_found,
        scan.pdf_count,
        scan.docx_count,
        scan.skipped.len()
    );

    let scorer = LlmScorer::new(Arc::new(llm));
    let mut checkpoint: Box<dyn ProgressSink> = if cli.no_checkpoint {
        Box::new(NoCheckpoint)
    } else {
        Box::new(ReportCheckpoint::new(
            cli.output.clone(),
            job_description.clone(),
        ))
    };

    let results = run_batch(
        scan.documents,
        &job_description,
        &scorer,
        checkpoint.as_mut(),
    )
    .await;

    if results.is_empty() {
        return Err(RankerError::NothingScored.into());
    }

    info!("Ranking results...");
    render(&results, &job_description, Local::now().naive_local()).write_atomic(&cli.output)?;

    println!(
        "Complete! {} of {} resumes processed and ranked.",
        results.len(),
        scan.total_found
    );
    println!("Results saved to: {}", cli.output.display());

    Ok(())
}
