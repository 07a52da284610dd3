use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::collections::VecDeque;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::preprocess::{boost_contrast, sharpen};
use crate::profile::{FieldProfile, FieldType, RecognitionProfile};
use crate::regions::{regions_for, FormField, RegionBox};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("Failed to encode region image: {0}")]
    Encode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available; build with the `tesseract` feature")]
    NotAvailable,
}

/// Recognized text of one region and the engine's confidence in it (0–100).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionResult {
    pub text: String,
    pub confidence: f32,
}

impl RegionResult {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence: confidence.clamp(0.0, 100.0) }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Abstraction over an OCR backend.
///
/// Backends are stateful: `configure` applies a field's profile and stays in
/// effect until `reset`. Implementations accept PNG image bytes.
pub trait OcrBackend: Send {
    fn configure(&mut self, profile: &RecognitionProfile) -> Result<(), OcrError>;

    fn recognize(&mut self, image_png: &[u8]) -> Result<RegionResult, OcrError>;

    /// Restore the engine's default parameters.
    fn reset(&mut self) -> Result<(), OcrError> {
        self.configure(&RecognitionProfile::DEFAULT)
    }
}

// ── Region recognition ────────────────────────────────────────────────────────

/// Crop, condition and recognize one region of a normalized page.
///
/// The backend is always reset before returning, including on error.
pub fn recognize_region<B: OcrBackend + ?Sized>(
    backend: &mut B,
    page: &GrayImage,
    region: RegionBox,
    field_type: FieldType,
    config: &PipelineConfig,
) -> Result<RegionResult, OcrError> {
    let profile = field_type.profile();
    let crop = condition_crop(page, region, profile, config);

    let outcome = backend
        .configure(&profile.recognition)
        .and_then(|()| read_with_retry(backend, &crop, profile, config.confidence_bar));
    let reset = backend.reset();

    let result = outcome?;
    reset?;
    Ok(RegionResult::new(result.text.trim(), result.confidence))
}

/// Recognize every catalog region in canonical order.
///
/// A failing region yields an empty result rather than aborting the page.
pub fn recognize_all<B: OcrBackend + ?Sized>(
    backend: &mut B,
    page: &GrayImage,
    config: &PipelineConfig,
) -> Vec<(FormField, RegionResult)> {
    regions_for(page.width(), page.height())
        .into_iter()
        .map(|(field, region)| {
            let result = match recognize_region(backend, page, region, field.field_type(), config) {
                Ok(r) => r,
                Err(e) => {
                    warn!(field = %field, error = %e, "region recognition failed");
                    RegionResult::empty()
                }
            };
            debug!(field = %field, confidence = result.confidence, "region recognized");
            (field, result)
        })
        .collect()
}

fn condition_crop(
    page: &GrayImage,
    region: RegionBox,
    profile: &FieldProfile,
    config: &PipelineConfig,
) -> GrayImage {
    let (w, h) = page.dimensions();
    let b = region.clamp_to(w, h).padded(config.region_padding, w, h);
    let mut crop = imageops::crop_imm(page, b.x, b.y, b.width, b.height).to_image();

    boost_contrast(&mut crop, profile.contrast_factor);

    // Recognition collapses on tiny glyphs.
    if b.width < config.min_region_width || b.height < config.min_region_height {
        let scale = (config.min_region_width as f32 / b.width as f32)
            .max(config.min_region_height as f32 / b.height as f32)
            .max(2.0);
        let new_w = (b.width as f32 * scale).round() as u32;
        let new_h = (b.height as f32 * scale).round() as u32;
        crop = imageops::resize(&crop, new_w, new_h, FilterType::CatmullRom);
    }

    sharpen(&crop)
}

// Low-confidence digits are sometimes binarized backwards; one inverted retry.
fn read_with_retry<B: OcrBackend + ?Sized>(
    backend: &mut B,
    crop: &GrayImage,
    profile: &FieldProfile,
    confidence_bar: f32,
) -> Result<RegionResult, OcrError> {
    let first = backend.recognize(&encode_as_png(crop)?)?;
    if first.confidence >= confidence_bar || !profile.retry_inverted {
        return Ok(first);
    }

    let mut inverted = crop.clone();
    imageops::invert(&mut inverted);
    let second = encode_as_png(&inverted).and_then(|png| backend.recognize(&png));
    match second {
        Ok(second) if second.confidence > first.confidence => {
            debug!(first = first.confidence, inverted = second.confidence, "inverted retry kept");
            Ok(second)
        }
        Ok(_) => Ok(first),
        Err(e) => {
            warn!(error = %e, "inverted retry failed, keeping first read");
            Ok(first)
        }
    }
}

fn encode_as_png(img: &GrayImage) -> Result<Vec<u8>, OcrError> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| OcrError::Encode(e.to_string()))?;
    Ok(buf)
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Replays scripted results in order, then a fixed fallback, and records how
/// it was configured. Useful for exercising the pipeline without Tesseract.
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    script: VecDeque<RegionResult>,
    fallback: RegionResult,
    fail: bool,
    active: RecognitionProfile,
    configured: Vec<RecognitionProfile>,
    resets: usize,
    calls: usize,
}

impl MockRecognizer {
    /// Every call returns `text` with confidence 90.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_confidence(text, 90.0)
    }

    pub fn with_confidence(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: RegionResult::new(text, confidence),
            fail: false,
            active: RecognitionProfile::DEFAULT,
            configured: Vec::new(),
            resets: 0,
            calls: 0,
        }
    }

    /// Returns `results` one per call, then empty text at confidence 0.
    pub fn scripted(results: impl IntoIterator<Item = RegionResult>) -> Self {
        Self {
            script: results.into_iter().collect(),
            ..Self::with_confidence("", 0.0)
        }
    }

    /// Every recognition call fails.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::new("") }
    }

    /// The profile currently in effect.
    pub fn active_profile(&self) -> &RecognitionProfile {
        &self.active
    }

    /// Profiles applied via `configure`, in order (resets excluded).
    pub fn configured(&self) -> &[RecognitionProfile] {
        &self.configured
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl OcrBackend for MockRecognizer {
    fn configure(&mut self, profile: &RecognitionProfile) -> Result<(), OcrError> {
        self.active = *profile;
        self.configured.push(*profile);
        Ok(())
    }

    fn recognize(&mut self, _image_png: &[u8]) -> Result<RegionResult, OcrError> {
        self.calls += 1;
        if self.fail {
            return Err(OcrError::Engine("mock failure".into()));
        }
        Ok(self.script.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }

    fn reset(&mut self) -> Result<(), OcrError> {
        self.active = RecognitionProfile::DEFAULT;
        self.resets += 1;
        Ok(())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, RegionResult};
    use crate::config::PipelineConfig;
    use crate::profile::RecognitionProfile;
    use leptess::{LepTess, Variable};

    pub struct TesseractRecognizer {
        lt: LepTess,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<&str>, lang: &str) -> Result<Self, OcrError> {
            let lt = LepTess::new(data_path, lang).map_err(|e| OcrError::Engine(e.to_string()))?;
            let mut recognizer = Self { lt };
            recognizer.reset()?;
            Ok(recognizer)
        }

        pub fn from_config(config: &PipelineConfig) -> Result<Self, OcrError> {
            let data_path = config
                .tessdata_dir
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned());
            Self::new(data_path.as_deref(), &config.language)
        }

        fn set(&mut self, var: Variable, value: &str) -> Result<(), OcrError> {
            self.lt
                .set_variable(var, value)
                .map_err(|e| OcrError::Engine(e.to_string()))
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn configure(&mut self, profile: &RecognitionProfile) -> Result<(), OcrError> {
            // An empty whitelist lifts the restriction.
            self.set(Variable::TesseditCharWhitelist, profile.whitelist.unwrap_or(""))?;
            self.set(Variable::TesseditPagesegMode, profile.layout.page_seg_mode())?;
            self.set(
                Variable::PreserveInterwordSpaces,
                if profile.preserve_interword_spaces { "1" } else { "0" },
            )
        }

        fn recognize(&mut self, image_png: &[u8]) -> Result<RegionResult, OcrError> {
            self.lt
                .set_image_from_mem(image_png)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            self.lt.set_source_resolution(300);
            let text = self.lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(RegionResult::new(text, self.lt.mean_text_conf() as f32))
        }
    }
}
