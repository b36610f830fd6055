//! Extraction orchestration: normalizer output is split into keep/filtered
//! lists, the keep list is classified, and the results are merged into the
//! final candidate records presented for review.

use tracing::info;

use crate::services::classifier::{self, ClassificationBackend, Classification};
use crate::services::noise_filter;
use crate::services::ocr::OcrClient;
use crate::services::text_parser;

/// Outcome of one extraction run: classified candidates in their original
/// relative order, plus the function words filtered out beforehand (reported
/// back to the user as skipped).
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub candidates: Vec<Classification>,
    pub filtered: Vec<String>,
}

/// Runs the bulk-paste pipeline over raw multi-line text.
pub async fn extract_from_text<B: ClassificationBackend>(
    backend: &B,
    text: &str,
    batch_size: usize,
) -> Extraction {
    let phrases = text_parser::parse_bulk_text(text);
    classify_candidates(backend, phrases, batch_size).await
}

/// Runs the photo pipeline: OCR, token normalization, then classification.
pub async fn extract_from_image<B: ClassificationBackend>(
    backend: &B,
    ocr: &OcrClient,
    image_bytes: &[u8],
    batch_size: usize,
) -> Extraction {
    let words = ocr.extract_from_image(image_bytes).await;
    classify_candidates(backend, words, batch_size).await
}

/// Splits candidates into keep/filtered and classifies the keep list. The
/// relative order of surviving candidates is preserved.
pub async fn classify_candidates<B: ClassificationBackend>(
    backend: &B,
    phrases: Vec<String>,
    batch_size: usize,
) -> Extraction {
    let mut keep = Vec::new();
    let mut filtered = Vec::new();
    for phrase in phrases {
        if noise_filter::should_filter(&phrase) {
            filtered.push(phrase);
        } else {
            keep.push(phrase);
        }
    }

    let candidates = classifier::classify_batch(backend, &keep, batch_size).await;
    info!(
        candidates = candidates.len(),
        filtered = filtered.len(),
        "extraction complete"
    );

    Extraction {
        candidates,
        filtered,
    }
}
