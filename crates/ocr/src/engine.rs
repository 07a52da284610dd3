use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, OwnedMutexGuard};
use tracing::info;

use crate::recognizer::{OcrBackend, OcrError};

type Factory<B> = Arc<dyn Fn() -> Result<B, OcrError> + Send + Sync>;

/// Process-wide OCR engine, built on first use and shared by every job.
///
/// Backend parameters are mutable global state, so all use goes through one
/// lock: a job holds it for the whole page and no two jobs interleave.
pub struct RecognitionEngine<B> {
    factory: Factory<B>,
    shared: OnceCell<Arc<Mutex<B>>>,
}

impl<B: OcrBackend + 'static> RecognitionEngine<B> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<B, OcrError> + Send + Sync + 'static,
    {
        Self { factory: Arc::new(factory), shared: OnceCell::new() }
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(backend: B) -> Self {
        let shared = OnceCell::new_with(Some(Arc::new(Mutex::new(backend))));
        Self {
            factory: Arc::new(|| Err::<B, _>(OcrError::NotAvailable)),
            shared,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.initialized()
    }

    /// Lock the engine, building it first if no job has yet.
    ///
    /// Concurrent first callers wait on a single initialization. A failed
    /// build leaves the engine uninitialized so the next caller retries.
    pub async fn acquire(&self) -> Result<OwnedMutexGuard<B>, OcrError> {
        let shared = self
            .shared
            .get_or_try_init(|| async {
                let factory = Arc::clone(&self.factory);
                let backend = tokio::task::spawn_blocking(move || factory())
                    .await
                    .map_err(|e| OcrError::Engine(format!("engine init panicked: {e}")))??;
                info!("recognition engine initialized");
                Ok::<_, OcrError>(Arc::new(Mutex::new(backend)))
            })
            .await?;
        Ok(Arc::clone(shared).lock_owned().await)
    }
}

#[cfg(feature = "tesseract")]
impl RecognitionEngine<crate::recognizer::tesseract_backend::TesseractRecognizer> {
    pub fn tesseract(config: &crate::config::PipelineConfig) -> Self {
        let config = config.clone();
        Self::new(move || crate::recognizer::tesseract_backend::TesseractRecognizer::from_config(&config))
    }
}
