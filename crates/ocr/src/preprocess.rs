use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::distance_transform::Norm;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::morphology;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::PipelineConfig;

/// Luma below this counts as ink when scoring skew.
const DARK_LEVEL: u8 = 128;
/// Rows sampled for skew scoring lie between these fractions of the height.
const SKEW_BAND: (f32, f32) = (0.3, 0.7);
const SKEW_ROW_STEP: f32 = 5.0;
const SKEW_COL_STEP: usize = 2;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Source image not found or unreadable: {}: {reason}", path.display())]
    SourceNotFound { path: PathBuf, reason: String },
    #[error("Failed to decode image bytes: {0}")]
    Decode(#[from] image::ImageError),
}

/// A page ready for region cropping: fixed width, deskewed, pure black/white.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub image: GrayImage,
    /// Skew that was detected (degrees); zero when within the deadband.
    pub skew_degrees: f32,
    /// Otsu threshold used for binarization.
    pub threshold: u8,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Load an image file and run the full normalization chain.
pub fn preprocess(path: &Path, config: &PipelineConfig) -> Result<NormalizedImage, PreprocessError> {
    let img = image::open(path).map_err(|e| PreprocessError::SourceNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(preprocess_image(img, config))
}

/// Decode raw image bytes (JPEG / PNG / WEBP / …) and normalize them.
pub fn preprocess_bytes(data: &[u8], config: &PipelineConfig) -> Result<NormalizedImage, PreprocessError> {
    let img = image::load_from_memory(data)?;
    Ok(preprocess_image(img, config))
}

pub fn preprocess_image(img: DynamicImage, config: &PipelineConfig) -> NormalizedImage {
    // Region boxes are fractions of this width, so this step is mandatory.
    let img = normalize_width(img, config.target_width);

    let mut gray = sharpen(&img.to_luma8());
    boost_contrast(&mut gray, config.contrast_factor);
    stretch_histogram(&mut gray);

    let (mut gray, skew_degrees) = deskew(gray, config);

    let threshold = otsu_threshold(&histogram(&gray));
    binarize(&mut gray, threshold);

    let image = if config.opening_radius > 0 {
        morphology::open(&gray, Norm::LInf, config.opening_radius)
    } else {
        gray
    };

    debug!(
        width = image.width(),
        height = image.height(),
        skew_degrees,
        threshold,
        "page normalized"
    );

    NormalizedImage { image, skew_degrees, threshold }
}

/// Resize to `target_width`, keeping the aspect ratio.
fn normalize_width(img: DynamicImage, target_width: u32) -> DynamicImage {
    if img.width() == target_width || img.width() == 0 {
        return img;
    }
    let height = (img.height() as u64 * target_width as u64 + img.width() as u64 / 2) / img.width() as u64;
    img.resize_exact(target_width, height.max(1) as u32, FilterType::Lanczos3)
}

/// 3×3 sharpen: centre 5, edge neighbours −1, corners 0. Borders replicate.
pub(crate) fn sharpen(img: &GrayImage) -> GrayImage {
    let (w, h) = img.dimensions();
    let at = |x: i64, y: i64| -> i32 {
        let x = x.clamp(0, w as i64 - 1) as u32;
        let y = y.clamp(0, h as i64 - 1) as u32;
        img.get_pixel(x, y)[0] as i32
    };
    ImageBuffer::from_fn(w, h, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let v = 5 * at(x, y) - at(x - 1, y) - at(x + 1, y) - at(x, y - 1) - at(x, y + 1);
        Luma([v.clamp(0, 255) as u8])
    })
}

/// Contrast around mid-grey. Factor > 1.0 increases contrast.
pub(crate) fn boost_contrast(img: &mut GrayImage, factor: f32) {
    for p in img.pixels_mut() {
        let v = (p[0] as f32 - 127.5) * factor + 127.5;
        p[0] = v.round().clamp(0.0, 255.0) as u8;
    }
}

/// Stretch the intensity range to the full 0..=255.
fn stretch_histogram(img: &mut GrayImage) {
    let (min_px, max_px) = img
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px <= min_px {
        // Uniform image, nothing to stretch.
        return;
    }

    let range = (max_px - min_px) as u32;
    for p in img.pixels_mut() {
        p[0] = ((p[0] - min_px) as u32 * 255 / range) as u8;
    }
}

/// Detect skew and, outside the deadband, rotate it away.
fn deskew(img: GrayImage, config: &PipelineConfig) -> (GrayImage, f32) {
    let angle = detect_skew(&img, config.skew_range_degrees, config.skew_step_degrees);
    if angle.abs() <= config.skew_deadband_degrees {
        return (img, 0.0);
    }
    debug!(angle, "correcting skew");
    let rotated = rotate_about_center(&img, (-angle).to_radians(), Interpolation::Bilinear, Luma([255u8]));
    (rotated, angle)
}

/// Estimate text-baseline skew in degrees.
///
/// Each candidate angle shears a set of rows across the middle band of the
/// page and scores the sum of squared dark-pixel counts, so an angle that
/// runs a sampled row along a baseline dominates. Positive angles mean lines
/// descend to the right. Ties keep the smallest angle.
pub fn detect_skew(img: &GrayImage, range_degrees: f32, step_degrees: f32) -> f32 {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || step_degrees <= 0.0 {
        return 0.0;
    }
    let steps = (2.0 * range_degrees / step_degrees).round() as i32;
    let (band_start, band_end) = (h as f32 * SKEW_BAND.0, h as f32 * SKEW_BAND.1);

    let mut best_angle = 0.0f32;
    let mut best_score = 0u64;
    for i in 0..=steps {
        let angle = -range_degrees + i as f32 * step_degrees;
        let slope = angle.to_radians().tan();

        let mut score = 0u64;
        let mut y = band_start;
        while y < band_end {
            let mut dark = 0u64;
            for x in (0..w).step_by(SKEW_COL_STEP) {
                let sy = (y + x as f32 * slope).round();
                if sy >= 0.0 && sy < h as f32 && img.get_pixel(x, sy as u32)[0] < DARK_LEVEL {
                    dark += 1;
                }
            }
            score += dark * dark;
            y += SKEW_ROW_STEP;
        }

        if score > best_score {
            best_score = score;
            best_angle = angle;
        }
    }
    best_angle
}

pub fn histogram(img: &GrayImage) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for p in img.pixels() {
        hist[p[0] as usize] += 1;
    }
    hist
}

/// Otsu's method: the threshold maximizing between-class variance.
/// Pixels `<= t` form the background class.
pub fn otsu_threshold(hist: &[u64; 256]) -> u8 {
    let total: u64 = hist.iter().sum();
    let sum: f64 = hist.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum();

    let mut sum_b = 0.0f64;
    let mut w_b = 0u64;
    let mut max_variance = 0.0f64;
    let mut threshold = 0u8;

    for (t, &count) in hist.iter().enumerate() {
        w_b += count;
        if w_b == 0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0 {
            break;
        }
        sum_b += t as f64 * count as f64;

        let m_b = sum_b / w_b as f64;
        let m_f = (sum - sum_b) / w_f as f64;
        let variance = w_b as f64 * w_f as f64 * (m_b - m_f) * (m_b - m_f);

        if variance > max_variance {
            max_variance = variance;
            threshold = t as u8;
        }
    }
    threshold
}

fn binarize(img: &mut GrayImage, threshold: u8) {
    for p in img.pixels_mut() {
        p[0] = if p[0] > threshold { 255 } else { 0 };
    }
}
