//! Analysis Pipeline Module
//! Load → normalize → analyze → report → chart, run once per invocation.

use crate::analysis::{analyze_all, AnalysisError, AnalysisReport};
use crate::charts::{ChartPlotter, StaticChartRenderer};
use crate::config::AnalysisConfig;
use crate::data::{DataLoader, LoaderError, NormalizeError, Normalizer, Tables};
use crate::report::Reporter;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: AnalysisReport,
    pub charts_written: Vec<PathBuf>,
    pub charts_failed: usize,
}

pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load and normalize the four source tables.
    pub fn load(&self) -> Result<Tables, PipelineError> {
        let raw = DataLoader::new(&self.config.data_dir).load_all()?;
        Ok(Normalizer::new(&self.config.missing_token).normalize(raw)?)
    }

    /// Run every step, writing the text report to `out`.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<RunOutcome, PipelineError> {
        let tables = self.load()?;
        let report = analyze_all(&tables, &self.config.settings())?;

        Reporter::new(&self.config).write_report(&report, out)?;

        let (charts_written, charts_failed) = if self.config.render_charts {
            self.render_charts(&report, out)?
        } else {
            (Vec::new(), 0)
        };

        info!(
            charts = charts_written.len(),
            failed = charts_failed,
            "pipeline finished"
        );
        Ok(RunOutcome {
            report,
            charts_written,
            charts_failed,
        })
    }

    /// Draw every planned chart. Drawing failures are logged, not fatal.
    fn render_charts<W: Write>(
        &self,
        report: &AnalysisReport,
        out: &mut W,
    ) -> Result<(Vec<PathBuf>, usize), PipelineError> {
        let charts = ChartPlotter::plan(report, &self.config);
        let renderer = StaticChartRenderer::new(&self.config.output_dir, self.config.chart_size);

        if let Err(e) = renderer.prepare() {
            warn!(error = %e, "charts skipped");
            return Ok((Vec::new(), charts.len()));
        }

        let mut written = Vec::with_capacity(charts.len());
        let mut failed = 0;
        for chart in &charts {
            match renderer.render(chart) {
                Ok(path) => {
                    writeln!(out, "Chart '{}' saved.", chart.file_name)?;
                    written.push(path);
                }
                Err(e) => {
                    warn!(error = %e, chart = %chart.file_name, "chart not drawn");
                    failed += 1;
                }
            }
        }
        Ok((written, failed))
    }
}
