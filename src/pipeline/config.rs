use std::time::Duration;

/// Longest side of the sampled raster for a full extraction.
pub const FULL_MAX_DIMENSION: u32 = 400;
/// Longest side of the sampled raster for a quick preview extraction.
pub const QUICK_MAX_DIMENSION: u32 = 50;

/// Pixels with alpha below this are treated as transparent.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Clusters darker than this lightness (percent) are dropped.
pub const MIN_LIGHTNESS: f64 = 10.0;
/// Clusters lighter than this lightness (percent) are dropped.
pub const MAX_LIGHTNESS: f64 = 95.0;

/// Similarity thresholds for the distinctness pass (percent / degrees).
pub const GRAYSCALE_SATURATION: f64 = 20.0;
pub const GRAYSCALE_LIGHTNESS_DELTA: f64 = 15.0;
pub const HUE_DELTA: f64 = 30.0;
pub const SATURATION_DELTA: f64 = 20.0;
pub const LIGHTNESS_DELTA: f64 = 20.0;

/// Saturation (percent) at or above which a color counts as vibrant.
pub const VIBRANT_SATURATION: f64 = 15.0;

pub const MAX_DISTINCT: usize = 10;
pub const MAX_NEUTRAL: usize = 2;
pub const MAX_COLORS: usize = 8;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Largest response body accepted from a URL source.
pub const MAX_FETCH_BYTES: u64 = 32 * 1024 * 1024;

/// Fidelity of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SampleMode {
    /// 400 px raster, every third pixel, 15-wide averaged buckets.
    #[default]
    Full,
    /// 50 px raster, every pixel, 32-wide buckets reported by their center.
    Quick,
}

/// How a bucket is reduced to a single color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representative {
    /// Rounded mean of every pixel in the bucket.
    Average,
    /// Midpoint of the bucket's channel ranges. The lightness filter still
    /// reads the bucket average.
    BucketCenter,
}

/// Tunable knobs of the extraction pipeline.
///
/// The presets carry empirically chosen values; they are grouped here so
/// every stage reads them from one place instead of inline literals.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub max_dimension: u32,
    /// Take every n-th pixel of the buffer.
    pub sample_stride: usize,
    /// Channel width of one quantization bucket.
    pub bucket_size: u8,
    pub alpha_threshold: u8,
    pub min_lightness: f64,
    pub max_lightness: f64,
    pub representative: Representative,
    pub max_distinct: usize,
    pub max_neutral: usize,
    pub max_colors: usize,
    pub fetch_timeout: Duration,
    pub max_fetch_bytes: u64,
}

impl ExtractionConfig {
    pub fn full() -> Self {
        Self {
            max_dimension: FULL_MAX_DIMENSION,
            sample_stride: 3,
            bucket_size: 15,
            alpha_threshold: ALPHA_THRESHOLD,
            min_lightness: MIN_LIGHTNESS,
            max_lightness: MAX_LIGHTNESS,
            representative: Representative::Average,
            max_distinct: MAX_DISTINCT,
            max_neutral: MAX_NEUTRAL,
            max_colors: MAX_COLORS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_fetch_bytes: MAX_FETCH_BYTES,
        }
    }

    pub fn quick() -> Self {
        Self {
            max_dimension: QUICK_MAX_DIMENSION,
            sample_stride: 1,
            bucket_size: 32,
            representative: Representative::BucketCenter,
            ..Self::full()
        }
    }

    pub fn for_mode(mode: SampleMode) -> Self {
        match mode {
            SampleMode::Full => Self::full(),
            SampleMode::Quick => Self::quick(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::full()
    }
}
