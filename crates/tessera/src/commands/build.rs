//! `tessera build` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tessera_config::{CliSettings, Config};
use tessera_render::{BuildReport, SiteBuilder};
use tessera_store::{FsSink, FsStore, ResourceStore, ScanOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover tessera.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(short = 's', long)]
    content_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Stop at the first page that fails to render.
    #[arg(long)]
    fail_fast: bool,

    /// Enable verbose output (log every file written).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the content tree can't be
    /// loaded, or if any page failed to render.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            output_dir: self.output_dir,
            fail_fast: self.fail_fast.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config = ?config.config_path, "Configuration loaded");
        let site = &config.site_resolved;

        output.info(&format!("Content: {}", site.content_dir.display()));
        output.info(&format!("Layouts: {}", site.layouts_dir.display()));
        output.info(&format!("Output: {}", site.output_dir.display()));

        let options = ScanOptions::new(site.content_dir.clone(), site.layouts_dir.clone())
            .with_exclude(&site.exclude)?
            .with_default_layout(site.default_layout.clone())
            .with_default_filters(config.build.default_filters.clone());
        let store = FsStore::scan(&options)?;
        let total = store.pages().len();

        let sink = FsSink::new(site.output_dir.clone());
        let report = SiteBuilder::new(Arc::new(store))
            .with_fail_fast(config.build.fail_fast)
            .build(&sink);

        summarize(&output, &report, total)
    }
}

fn summarize(output: &Output, report: &BuildReport, total: usize) -> Result<(), CliError> {
    for failure in &report.failures {
        output.error(&format!("Failed: {}", failure.path.display()));
        for line in failure.error.to_string().lines() {
            output.detail(line);
        }
    }
    if report.aborted {
        output.warning("Build stopped at the first failure (--fail-fast)");
    }

    if report.is_success() {
        output.success(&format!(
            "Built {} pages ({} files)",
            report.pages.len(),
            report.files_written()
        ));
        Ok(())
    } else {
        Err(CliError::BuildFailed {
            failed: report.failures.len(),
            total,
        })
    }
}
