use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use orderscan_core::OrderRecord;

use crate::config::PipelineConfig;
use crate::engine::RecognitionEngine;
use crate::extract::Extractor;
use crate::labeled::LabeledBlock;
use crate::preprocess::{self, NormalizedImage};
use crate::recognizer::{recognize_all, OcrBackend, OcrError, RegionResult};
use crate::regions::FormField;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The result of scanning one order form.
#[derive(Debug, Clone, Serialize)]
pub struct OrderScan {
    /// File the scan came from, `None` for in-memory captures.
    pub source: Option<PathBuf>,
    /// Labeled text block, kept as the raw OCR text of the order.
    pub labeled_text: String,
    pub regions: Vec<(FormField, RegionResult)>,
    /// Dimensions of the normalized page the regions were cut from.
    pub width: u32,
    pub height: u32,
    pub skew_degrees: f32,
    pub record: OrderRecord,
    pub missing_critical: Vec<&'static str>,
}

/// Orchestrates: preprocess → recognize every region → labeled block → extract.
pub struct OrderPipeline<B: OcrBackend + 'static> {
    engine: Arc<RecognitionEngine<B>>,
    config: Arc<PipelineConfig>,
}

impl<B: OcrBackend + 'static> OrderPipeline<B> {
    pub fn new(engine: Arc<RecognitionEngine<B>>, config: Arc<PipelineConfig>) -> Self {
        Self { engine, config }
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<OrderScan, PipelineError> {
        let config = Arc::clone(&self.config);
        let owned = path.to_path_buf();
        let page = tokio::task::spawn_blocking(move || preprocess::preprocess(&owned, &config)).await??;
        self.scan(page, Some(path.to_path_buf())).await
    }

    /// Process raw bytes (from camera capture or file read).
    pub async fn process_bytes(&self, data: &[u8]) -> Result<OrderScan, PipelineError> {
        let config = Arc::clone(&self.config);
        let data = data.to_vec();
        let page = tokio::task::spawn_blocking(move || preprocess::preprocess_bytes(&data, &config)).await??;
        self.scan(page, None).await
    }

    async fn scan(&self, page: NormalizedImage, source: Option<PathBuf>) -> Result<OrderScan, PipelineError> {
        let (width, height, skew_degrees) = (page.width(), page.height(), page.skew_degrees);
        // Held for the whole page: no other job's regions interleave with ours.
        let mut engine = self.engine.acquire().await?;
        let config = Arc::clone(&self.config);
        let regions = tokio::task::spawn_blocking(move || recognize_all(&mut *engine, &page.image, &config)).await?;

        let block = LabeledBlock::new(regions, self.config.confidence_bar);
        info!(
            source = ?source,
            average_confidence = block.average_confidence().round(),
            skew = skew_degrees,
            "order form recognized"
        );
        block.warn_low_confidence();

        let labeled_text = block.render();
        let extraction = Extractor::extract(&labeled_text);

        Ok(OrderScan {
            source,
            labeled_text,
            regions: block.entries().to_vec(),
            width,
            height,
            skew_degrees,
            record: extraction.record,
            missing_critical: extraction.missing_critical,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
