use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hueprint::cli::{Args, OutputFormat};
use hueprint::color::Color;
use hueprint::output::PaletteReport;
use hueprint::pipeline::config::ExtractionConfig;
use hueprint::pipeline::extract::extract_from_source;

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hueprint=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    // Validate before doing any image work.
    let against = args
        .against
        .as_deref()
        .map(Color::from_hex)
        .transpose()
        .context("invalid --against color")?;

    let config = ExtractionConfig {
        fetch_timeout: Duration::from_secs(args.timeout),
        ..ExtractionConfig::for_mode(args.mode)
    };

    let colors = extract_from_source(&args.image, &config)
        .with_context(|| format!("failed to extract palette from {}", args.image))?;
    tracing::info!(colors = colors.len(), mode = ?args.mode, "Extraction finished");

    let report = PaletteReport::new(&colors, against);
    if args.preview {
        print!("{}", report.preview());
    }
    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
