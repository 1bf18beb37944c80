use clap::Parser;

use crate::pipeline::config::SampleMode;
use crate::pipeline::sample::ImageSource;

/// Extract a palette of visually distinct colors from an image.
#[derive(Parser, Debug)]
#[command(name = "hueprint", version, about)]
pub struct Args {
    /// Image path, http(s) URL or data: URL
    pub image: ImageSource,

    /// Extraction fidelity
    #[arg(short, long, value_enum, default_value_t = SampleMode::Full)]
    pub mode: SampleMode,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print true-color swatches of the palette
    #[arg(long)]
    pub preview: bool,

    /// Check contrast against this hex color instead of the background role
    #[arg(long, value_name = "HEX")]
    pub against: Option<String>,

    /// Network timeout in seconds for URL sources
    #[arg(long, default_value_t = 15)]
    pub timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
