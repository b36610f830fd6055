//! OCR boundary: sends a photographed page to the recognition service and
//! turns the raw text into clean candidate words. Failures never escape this
//! module; a broken call simply yields no candidates.

use std::collections::HashSet;
use std::time::Duration;

use image::DynamicImage;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Upload ceiling imposed by the recognition service.
const MAX_UPLOAD_BYTES: usize = 1_000_000;
const JPEG_QUALITY_STEPS: &[u8] = &[80, 60, 40];
const DOWNSCALE_FACTOR: f32 = 0.7;
const MIN_DIMENSION: u32 = 200;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    HttpStatus(reqwest::StatusCode),
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    text: String,
}

#[derive(Clone)]
pub struct OcrClient {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl OcrClient {
    pub fn from_env() -> Self {
        let endpoint = std::env::var("OCR_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let timeout = std::env::var("OCR_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { endpoint, client }
    }

    pub fn is_available(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Recognizes German text on the image and returns cleaned, deduplicated
    /// candidate words. Any failure is logged and yields an empty list.
    pub async fn extract_from_image(&self, image_bytes: &[u8]) -> Vec<String> {
        match self.recognize(image_bytes).await {
            Ok(text) => {
                let words = extract_words(&text);
                info!(words = words.len(), "image extraction finished");
                words
            }
            Err(err) => {
                warn!(error = %err, "OCR extraction failed");
                Vec::new()
            }
        }
    }

    async fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(OcrError::NotConfigured("OCR_ENDPOINT"))?;

        let payload = shrink_to_limit(image_bytes);
        let part = reqwest::multipart::Part::bytes(payload).file_name("page.jpg");
        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("lang", "deu");

        let url = format!("{}/ocr", endpoint.trim_end_matches('/'));
        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::HttpStatus(status));
        }

        let body: OcrResponse = response.json().await?;
        Ok(body.text)
    }
}

/// Brings an oversized image under the upload ceiling: re-encode as JPEG at
/// decreasing quality first, then shrink dimensions. An image that cannot be
/// decoded is sent as-is and left to the service to reject.
fn shrink_to_limit(image_bytes: &[u8]) -> Vec<u8> {
    if image_bytes.len() <= MAX_UPLOAD_BYTES {
        return image_bytes.to_vec();
    }

    let Ok(decoded) = image::load_from_memory(image_bytes) else {
        warn!("oversized image could not be decoded, sending original");
        return image_bytes.to_vec();
    };
    // JPEG cannot carry an alpha channel.
    let mut current = DynamicImage::ImageRgb8(decoded.to_rgb8());

    for &quality in JPEG_QUALITY_STEPS {
        if let Some(encoded) = encode_jpeg(&current, quality) {
            debug!(quality, bytes = encoded.len(), "recompressed image");
            if encoded.len() <= MAX_UPLOAD_BYTES {
                return encoded;
            }
        }
    }

    let min_quality = *JPEG_QUALITY_STEPS.last().unwrap_or(&40);
    let mut best = Vec::new();
    while current.width().min(current.height()) > MIN_DIMENSION {
        let width = (current.width() as f32 * DOWNSCALE_FACTOR) as u32;
        let height = (current.height() as f32 * DOWNSCALE_FACTOR) as u32;
        current = current.resize(width, height, image::imageops::FilterType::Lanczos3);

        if let Some(encoded) = encode_jpeg(&current, min_quality) {
            debug!(width, height, bytes = encoded.len(), "downscaled image");
            if encoded.len() <= MAX_UPLOAD_BYTES {
                return encoded;
            }
            best = encoded;
        }
    }

    if best.is_empty() {
        image_bytes.to_vec()
    } else {
        best
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Option<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
    image.write_with_encoder(encoder).ok()?;
    Some(buffer)
}

/// Token normalizer for OCR output: whitespace split, punctuation strip,
/// letters-and-umlauts only, case-insensitive first-seen deduplication.
pub fn extract_words(raw_text: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut words = Vec::new();

    for token in raw_text.split_whitespace() {
        let cleaned = clean_token(token);
        if !is_valid_word(&cleaned) {
            continue;
        }
        if seen.insert(cleaned.to_lowercase()) {
            words.push(cleaned);
        }
    }

    words
}

fn clean_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .filter(|&c| is_german_letter(c))
        .collect()
}

fn is_german_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, 'ä' | 'ö' | 'ü' | 'Ä' | 'Ö' | 'Ü' | 'ß')
}

fn is_valid_word(word: &str) -> bool {
    word.chars().count() >= 2 && word.chars().next().is_some_and(char::is_alphabetic)
}
