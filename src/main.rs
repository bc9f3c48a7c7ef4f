//! F1 Insights - Formula 1 historical record analysis
//!
//! Reads the four CSV tables from the configured data directory, prints the
//! report on stdout and saves the charts next to it.

use anyhow::{Context, Result};
use f1_insights::config::CONFIG_FILE_NAME;
use f1_insights::{AnalysisConfig, Pipeline, PipelineError};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = AnalysisConfig::load_or_default(Path::new(CONFIG_FILE_NAME))
        .context("loading configuration")?;
    info!(
        data_dir = %config.data_dir.display(),
        nationality = %config.nationality,
        subject = %config.subject.full_name(),
        "startup"
    );

    let pipeline = Pipeline::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match pipeline.run(&mut out) {
        Ok(_) => Ok(()),
        Err(e @ PipelineError::Load(_)) => Err(e).with_context(|| {
            format!(
                "make sure the CSV files are in {}",
                pipeline.config().data_dir.display()
            )
        }),
        Err(e) => Err(e.into()),
    }
}
