use std::borrow::Cow;
use std::convert::Infallible;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::error::ImageLoadError;
use crate::pipeline::config::ExtractionConfig;

/// Where the image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// `http://` or `https://` resource.
    Url(String),
    /// RFC 2397 `data:` URL, base64 or percent-encoded.
    DataUrl(String),
    Bytes(Vec<u8>),
}

impl FromStr for ImageSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.starts_with("data:") {
            Self::DataUrl(s.to_string())
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::Path(PathBuf::from(s))
        })
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
            Self::DataUrl(url) => {
                let head = url.split(',').next().unwrap_or(url);
                write!(f, "{head},…")
            }
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Load and decode an image from any supported source.
pub fn load_image(
    source: &ImageSource,
    config: &ExtractionConfig,
) -> Result<DynamicImage, ImageLoadError> {
    let bytes = read_source(source, config)?;
    let img = image::load_from_memory(&bytes)?;
    tracing::debug!(
        source = %source,
        width = img.width(),
        height = img.height(),
        "Decoded image"
    );
    Ok(img)
}

fn read_source<'a>(
    source: &'a ImageSource,
    config: &ExtractionConfig,
) -> Result<Cow<'a, [u8]>, ImageLoadError> {
    match source {
        ImageSource::Path(path) => read_file(path).map(Cow::Owned),
        ImageSource::Url(url) => fetch(url, config.fetch_timeout, config.max_fetch_bytes)
            .map(Cow::Owned)
            .inspect_err(|error| tracing::warn!(%url, %error, "Image fetch failed")),
        ImageSource::DataUrl(url) => decode_data_url(url).map(Cow::Owned),
        ImageSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ImageLoadError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ImageLoadError::NotFound(path.to_path_buf())
        } else {
            ImageLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn fetch(url: &str, timeout: Duration, limit: u64) -> Result<Vec<u8>, ImageLoadError> {
    let fetch_error = |source| ImageLoadError::Fetch {
        url: url.to_string(),
        source,
    };
    let too_large = || ImageLoadError::TooLarge {
        url: url.to_string(),
        limit,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fetch_error)?;
    let response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(fetch_error)?;

    if response.content_length().is_some_and(|len| len > limit) {
        return Err(too_large());
    }
    read_capped(response, limit)
        .map_err(|source| ImageLoadError::Body {
            url: url.to_string(),
            source,
        })?
        .ok_or_else(too_large)
}

/// Read at most `limit` bytes; `None` when the stream holds more.
fn read_capped(reader: impl Read, limit: u64) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut buf)?;
    Ok((buf.len() as u64 <= limit).then_some(buf))
}

/// Decode the payload of a `data:[<mediatype>][;base64],<data>` URL.
fn decode_data_url(url: &str) -> Result<Vec<u8>, ImageLoadError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ImageLoadError::DataUrl("missing data: scheme".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageLoadError::DataUrl("missing ',' separator".into()))?;

    if meta
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"))
    {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageLoadError::DataUrl(e.to_string()))
    } else {
        Ok(percent_encoding::percent_decode_str(payload).collect())
    }
}

/// A drawing target the sampler acquires for one call.
///
/// Implementations rasterize `image` at exactly `width` x `height` and hand
/// back RGBA pixels. The surface is consumed by the sampling call, so no
/// raster state outlives a single extraction.
pub trait RasterSurface {
    fn draw(&mut self, image: &DynamicImage, width: u32, height: u32) -> RgbaImage;
}

/// Default surface backed by `image::imageops::resize`.
#[derive(Debug, Clone, Copy)]
pub struct ResizeSurface {
    filter: FilterType,
}

impl ResizeSurface {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for ResizeSurface {
    fn default() -> Self {
        Self::new(FilterType::Triangle)
    }
}

impl RasterSurface for ResizeSurface {
    fn draw(&mut self, image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
        if image.dimensions() == (width, height) {
            image.to_rgba8()
        } else {
            image::imageops::resize(image, width, height, self.filter)
        }
    }
}

/// Row-major RGBA pixels of a sampled image.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Factor applied to the source dimensions, at most 1.
    pub scale: f64,
    pub data: Vec<u8>,
}

/// Dimensions that fit `width` x `height` within `max_dimension` on the longest
/// side, preserving aspect ratio. Never upscales.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32, f64) {
    let longest = width.max(height);
    if longest == 0 {
        return (0, 0, 1.0);
    }
    if longest <= max_dimension {
        return (width, height, 1.0);
    }

    let fit = |side: u32| ((side as u64 * max_dimension as u64 / longest as u64) as u32).max(1);
    (
        fit(width),
        fit(height),
        max_dimension as f64 / longest as f64,
    )
}

/// Sample `image` on a fresh [`ResizeSurface`].
pub fn sample_pixels(image: &DynamicImage, max_dimension: u32) -> PixelBuffer {
    sample_pixels_on(ResizeSurface::default(), image, max_dimension)
}

/// Sample `image` on the given surface, which is released on return.
pub fn sample_pixels_on<S: RasterSurface>(
    mut surface: S,
    image: &DynamicImage,
    max_dimension: u32,
) -> PixelBuffer {
    let (width, height, scale) = target_dimensions(image.width(), image.height(), max_dimension);
    if width == 0 || height == 0 {
        return PixelBuffer {
            width: 0,
            height: 0,
            scale,
            data: Vec::new(),
        };
    }

    let raster = surface.draw(image, width, height);
    tracing::debug!(width, height, scale, "Sampled pixel buffer");

    PixelBuffer {
        width: raster.width(),
        height: raster.height(),
        scale,
        data: raster.into_raw(),
    }
}
