use std::collections::HashMap;

use serde::Serialize;

use crate::color::{Color, Hsl, Oklch};
use crate::error::ImageLoadError;
use crate::pipeline::config::{
    ExtractionConfig, Representative, GRAYSCALE_LIGHTNESS_DELTA, GRAYSCALE_SATURATION,
    HUE_DELTA, LIGHTNESS_DELTA, SATURATION_DELTA, VIBRANT_SATURATION,
};
use crate::pipeline::sample::{load_image, sample_pixels, ImageSource};

/// A color extracted from the image with every representation precomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedColor {
    pub rgb: Color,
    pub hsl: Hsl,
    pub oklch: Oklch,
    pub hex: String,
    /// Share of the selected clusters' pixels, 0–100 with one decimal.
    pub percentage: f64,
}

impl ExtractedColor {
    pub fn new(rgb: Color, percentage: f64) -> Self {
        Self {
            rgb,
            hsl: rgb.to_hsl(),
            oklch: rgb.to_oklch(),
            hex: rgb.to_hex(),
            percentage,
        }
    }
}

/// Running sums for one quantization bucket.
#[derive(Debug)]
struct Bucket {
    key: [u8; 3],
    sum: [u64; 3],
    count: u32,
}

impl Bucket {
    fn new(key: [u8; 3]) -> Self {
        Self {
            key,
            sum: [0; 3],
            count: 0,
        }
    }

    fn add(&mut self, px: &[u8]) {
        for (acc, &channel) in self.sum.iter_mut().zip(px) {
            *acc += channel as u64;
        }
        self.count += 1;
    }

    fn average(&self) -> Color {
        let avg = |sum: u64| (sum as f64 / self.count as f64).round() as u8;
        Color::new(avg(self.sum[0]), avg(self.sum[1]), avg(self.sum[2]))
    }

    fn center(&self, bucket_size: u8) -> Color {
        let size = bucket_size as u16;
        let center = |key: u8| (key as u16 * size + size / 2).min(255) as u8;
        Color::new(center(self.key[0]), center(self.key[1]), center(self.key[2]))
    }
}

#[derive(Debug, Clone)]
struct ColorCluster {
    rgb: Color,
    hsl: Hsl,
    pixel_count: u32,
    visual_weight: f64,
}

impl ColorCluster {
    fn is_vibrant(&self) -> bool {
        self.hsl.s >= VIBRANT_SATURATION
    }
}

/// Heuristic prominence score: frequency, boosted for saturated and
/// mid-lightness colors.
pub fn visual_weight(pixel_count: u32, hsl: &Hsl) -> f64 {
    let saturation = hsl.s / 100.0;
    let lightness = hsl.l / 100.0;
    let saturation_boost = saturation.powf(1.5) * 2.0;
    let lightness_balance = 1.0 - (lightness - 0.5).abs() * 1.5;
    (pixel_count as f64).sqrt() * (1.0 + saturation_boost) * (0.5 + lightness_balance)
}

/// Circular distance between two hues in degrees.
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    diff.min(360.0 - diff)
}

/// Whether two colors are too close to both appear in one palette.
pub fn colors_are_similar(a: &Hsl, b: &Hsl) -> bool {
    let dl = (a.l - b.l).abs();
    if a.s < GRAYSCALE_SATURATION && b.s < GRAYSCALE_SATURATION {
        return dl < GRAYSCALE_LIGHTNESS_DELTA;
    }
    hue_distance(a.h, b.h) < HUE_DELTA && (a.s - b.s).abs() < SATURATION_DELTA && dl < LIGHTNESS_DELTA
}

/// Quantize sampled, opaque pixels into buckets, in first-seen order.
fn bucket_pixels(rgba: &[u8], config: &ExtractionConfig) -> (Vec<Bucket>, usize) {
    let size = config.bucket_size.max(1);
    let mut index: HashMap<[u8; 3], usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut retained = 0;

    for px in rgba.chunks_exact(4).step_by(config.sample_stride.max(1)) {
        if px[3] < config.alpha_threshold {
            continue;
        }
        retained += 1;
        let key = [px[0] / size, px[1] / size, px[2] / size];
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Bucket::new(key));
            buckets.len() - 1
        });
        buckets[slot].add(px);
    }

    (buckets, retained)
}

/// Drop near-black and near-white buckets by their average color, then
/// reduce the survivors to their representative.
fn finalize(bucket: &Bucket, config: &ExtractionConfig) -> Option<ColorCluster> {
    let average = bucket.average();
    let lightness = average.to_hsl().l;
    if lightness < config.min_lightness || lightness > config.max_lightness {
        return None;
    }
    let rgb = match config.representative {
        Representative::Average => average,
        Representative::BucketCenter => bucket.center(config.bucket_size.max(1)),
    };
    let hsl = rgb.to_hsl();
    Some(ColorCluster {
        rgb,
        hsl,
        pixel_count: bucket.count,
        visual_weight: visual_weight(bucket.count, &hsl),
    })
}

/// Greedily keep clusters that are not similar to any already kept one.
fn select_distinct(ranked: Vec<ColorCluster>, max: usize) -> Vec<ColorCluster> {
    let mut kept: Vec<ColorCluster> = Vec::with_capacity(max);
    for cluster in ranked {
        if kept.len() >= max {
            break;
        }
        if kept
            .iter()
            .all(|k| !colors_are_similar(&k.hsl, &cluster.hsl))
        {
            kept.push(cluster);
        }
    }
    kept
}

/// All vibrant clusters plus a few neutrals, vibrant first when capping.
/// The result keeps the ranking order of `clusters`.
fn select_final(clusters: Vec<ColorCluster>, config: &ExtractionConfig) -> Vec<ColorCluster> {
    let vibrant = clusters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_vibrant())
        .map(|(i, _)| i);
    let neutral = clusters
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_vibrant())
        .map(|(i, _)| i)
        .take(config.max_neutral);

    let mut chosen: Vec<usize> = vibrant.chain(neutral).take(config.max_colors).collect();
    chosen.sort_unstable();
    chosen.into_iter().map(|i| clusters[i].clone()).collect()
}

/// Extract a palette from a row-major RGBA buffer.
///
/// Returns at most `config.max_colors` colors ordered by descending visual
/// weight, or an empty vector when no pixel survives filtering.
pub fn extract_colors(rgba: &[u8], config: &ExtractionConfig) -> Vec<ExtractedColor> {
    let (buckets, retained) = bucket_pixels(rgba, config);

    let mut clusters: Vec<ColorCluster> = buckets
        .iter()
        .filter_map(|bucket| finalize(bucket, config))
        .collect();
    let finalized = clusters.len();

    clusters.sort_by(|a, b| b.visual_weight.total_cmp(&a.visual_weight));
    let distinct = select_distinct(clusters, config.max_distinct);
    let selected = select_final(distinct, config);

    tracing::debug!(
        retained,
        buckets = buckets.len(),
        finalized,
        selected = selected.len(),
        "Clustered pixels"
    );

    let total: u64 = selected.iter().map(|c| c.pixel_count as u64).sum();
    selected
        .into_iter()
        .map(|c| {
            let share = c.pixel_count as f64 / total as f64;
            ExtractedColor::new(c.rgb, (share * 1000.0).round() / 10.0)
        })
        .collect()
}

/// Load, sample and cluster an image in one call.
pub fn extract_from_source(
    source: &ImageSource,
    config: &ExtractionConfig,
) -> Result<Vec<ExtractedColor>, ImageLoadError> {
    let img = load_image(source, config)?;
    let buffer = sample_pixels(&img, config.max_dimension);
    Ok(extract_colors(&buffer.data, config))
}
