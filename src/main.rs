use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use s3m_prep::assemble;
use s3m_prep::cli::get_args;
use s3m_prep::config::Settings;
use s3m_prep::regrid::{NoopHook, RegridHook, SummaryHook};

fn main() -> Result<()> {
    let args = get_args();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    info!(
        "S3M static-data preparation {} starting",
        env!("CARGO_PKG_VERSION")
    );

    // Configuration
    let settings = Settings::load(&args.settings_file)
        .with_context(|| format!("Invalid settings file: {:?}", args.settings_file))?;

    let hook: &dyn RegridHook = if args.debug_regrid {
        &SummaryHook
    } else {
        &NoopHook
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} layers {msg}")?
            .progress_chars("#>-"),
    );

    let output = assemble::run(&settings, hook, &pb).with_context(|| {
        format!(
            "Failed to build static data for domain {}",
            settings.domain
        )
    })?;

    info!("Static data saved to {}", output.display());
    Ok(())
}
