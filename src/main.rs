use anyhow::{Context, Result};
use clap::Parser;
use marker_callers::{cli::Cli, config::AnalysisConfig, source::CaptureFile, Analyzer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` raises the level to trace
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let base = match &args.config {
        Some(path) => AnalysisConfig::from_toml(path)?,
        None => AnalysisConfig::default(),
    };
    let config = args.apply_to(base);
    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", e);
    }

    let capture = CaptureFile::from_path(&args.capture)?;

    let analysis = match Analyzer::new(&capture, &config)
        .with_progress(|fraction| debug!("Assembling frames: {:.0}%", fraction * 100.0))
        .run()
    {
        Ok(analysis) => analysis,
        Err(e) if e.is_silent_abort() => {
            info!("Nothing to report: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e).context("Caller analysis failed"),
    };

    if args.summary {
        analysis.print_summary();
    }

    analysis
        .report()
        .write_to(&config.output, config.format)
        .context("Failed to write caller report")?;

    Ok(())
}
