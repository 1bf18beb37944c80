use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain decodable pixel data from an image source.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{url} exceeds the {limit} byte download limit")]
    TooLarge { url: String, limit: u64 },

    #[error("invalid data URL: {0}")]
    DataUrl(String),

    #[error(
        "unsupported or corrupt image: {0}. Supported formats: PNG, JPEG, WebP, BMP, TIFF, GIF"
    )]
    Decode(#[from] image::ImageError),
}

/// Outcome of an extraction that did not produce a palette.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Load(#[from] ImageLoadError),

    #[error("extraction superseded by a newer request")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("invalid hex color: expected 6 hex digits, got {0}")]
    Length(usize),

    #[error("invalid hex color: {0:?} contains non-hex characters")]
    Digits(String),
}
