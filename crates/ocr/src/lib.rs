// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod config;
pub mod correct;
pub mod engine;
pub mod extract;
pub mod labeled;
pub mod pipeline;
pub mod preprocess;
pub mod profile;
pub mod recognizer;
pub mod regions;

pub use config::{ConfigError, PipelineConfig};
pub use correct::correct_ocr_errors;
pub use engine::RecognitionEngine;
pub use extract::{Extraction, Extractor};
pub use labeled::{clean_line, LabeledBlock};
pub use pipeline::{OrderPipeline, OrderScan, PipelineError};
pub use preprocess::{preprocess, preprocess_bytes, preprocess_image, NormalizedImage, PreprocessError};
pub use profile::{Correction, FieldProfile, FieldType, LayoutMode, RecognitionProfile};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, RegionResult};
pub use regions::{regions_for, FormField, RegionBox};
