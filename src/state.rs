use std::sync::Arc;
use std::time::Instant;

use crate::db::Database;
use crate::services::classifier::LlmClassifier;
use crate::services::llm_provider::LLMProvider;
use crate::services::ocr::OcrClient;

/// Shared handles, built once in `main` and injected everywhere. The
/// pipeline never reaches for globals.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    db: Option<Arc<Database>>,
    llm: Arc<LLMProvider>,
    classifier: Arc<LlmClassifier>,
    ocr: Arc<OcrClient>,
    batch_size: usize,
}

impl AppState {
    pub fn new(
        db: Option<Database>,
        llm: LLMProvider,
        ocr: OcrClient,
        batch_size: usize,
    ) -> Self {
        let classifier = Arc::new(LlmClassifier::new(llm.clone()));
        Self {
            started_at: Instant::now(),
            db: db.map(Arc::new),
            llm: Arc::new(llm),
            classifier,
            ocr: Arc::new(ocr),
            batch_size,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn db(&self) -> Option<Arc<Database>> {
        self.db.clone()
    }

    pub fn llm(&self) -> Arc<LLMProvider> {
        Arc::clone(&self.llm)
    }

    pub fn classifier(&self) -> Arc<LlmClassifier> {
        Arc::clone(&self.classifier)
    }

    pub fn ocr(&self) -> Arc<OcrClient> {
        Arc::clone(&self.ocr)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
