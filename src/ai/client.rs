//! Gemini Vision API client.
//!
//! Handles request construction, image payload preparation, and transport
//! with bounded retry. The response is returned as raw text; `ai::schema`
//! owns turning it into a validated result, so a client error here is never
//! fatal to a batch.

use crate::ai::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
use crate::models::CasingStyle;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::time::Duration;
use thiserror::Error;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Maximum image dimension (width or height) sent to the API
const MAX_DIMENSION: u32 = 1024;

/// Shared HTTP client for vision API calls
///
/// Lazy-initialized once and reused so TLS sessions and pooled connections
/// survive across a whole batch.
static VISION_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .expect("Failed to create vision HTTP client")
});

/// Read the API key from `.env` or the process environment.
pub fn api_key_from_env() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Failure modes of one analysis call.
#[derive(Debug, Error)]
pub enum AnalysisCallError {
    #[error("rate limited by the vision API")]
    RateLimited,
    #[error("vision API server error ({0})")]
    Server(u16),
    #[error("vision API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("vision API returned an empty response")]
    Empty,
}

impl AnalysisCallError {
    /// Whether retrying the same request can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Server(_) | Self::Network(_)
        )
    }
}

/// Explicit retry schedule for the analysis call.
///
/// Injected into the client rather than hidden in a wrapper, so retry
/// semantics are visible at the call site and testable on their own.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Exponential backoff delay after the given zero-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// One analysis request, assembled by the batch pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    pub image_bytes: &'a [u8],
    pub casing: CasingStyle,
    pub max_length: usize,
    /// OCR token summary, or `"None"` when OCR is off or found nothing
    pub ocr_summary: &'a str,
    pub confidence_threshold: f32,
}

/// Seam between the pipeline and the external vision service.
///
/// Returns the raw response text; interpretation belongs to `ai::schema`.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<String, AnalysisCallError>;
}

/// Client for Google's Gemini Vision API.
pub struct GeminiClient {
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send_once(&self, body: &GenerateRequest) -> Result<String, AnalysisCallError> {
        let url = format!("{GEMINI_API_BASE}/models/{}:generateContent", self.model);

        let response = VISION_CLIENT
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(AnalysisCallError::RateLimited);
        }
        if status.is_server_error() {
            return Err(AnalysisCallError::Server(status.as_u16()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisCallError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;

        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim().to_string();

        if text.is_empty() {
            return Err(AnalysisCallError::Empty);
        }

        Ok(text)
    }
}

#[async_trait]
impl ImageAnalyzer for GeminiClient {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<String, AnalysisCallError> {
        let (payload, mime_type) = prepare_image_payload(request.image_bytes);

        let prompt = format!(
            "{ANALYSIS_SYSTEM_PROMPT}\n\n{}",
            build_analysis_prompt(
                request.casing,
                request.max_length,
                request.ocr_summary,
                request.confidence_threshold,
            )
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: STANDARD.encode(&payload),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_p: 0.8,
                top_k: 20,
                max_output_tokens: 150,
            },
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "transient analysis failure (attempt {}/{}): {e}; retrying in {delay:?}",
                        attempt + 1,
                        self.retry.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Prepare an image for the vision API: downscale if large, re-encode as
/// JPEG. Bytes that don't decode are sent as-is with their sniffed type;
/// the service gets to reject them and the fallback path takes over.
fn prepare_image_payload(image_bytes: &[u8]) -> (Vec<u8>, &'static str) {
    if let Ok(img) = image::load_from_memory(image_bytes) {
        // JPEG has no alpha channel
        let img = DynamicImage::ImageRgb8(resize_if_needed(img).to_rgb8());

        let mut buffer = Vec::new();
        if img
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .is_ok()
        {
            return (buffer, "image/jpeg");
        }
    }

    (
        image_bytes.to_vec(),
        detect_image_mime(image_bytes).unwrap_or("image/jpeg"),
    )
}

/// Resize image if it exceeds the maximum dimension, preserving aspect ratio.
fn resize_if_needed(img: DynamicImage) -> DynamicImage {
    let (width, height) = (img.width(), img.height());

    if width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        return img;
    }

    let scale = (MAX_DIMENSION as f32 / width.max(height) as f32).min(1.0);
    let new_width = (width as f32 * scale) as u32;
    let new_height = (height as f32 * scale) as u32;

    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

/// Detect image MIME type from magic bytes.
pub fn detect_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        Some("image/png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP") {
        Some("image/webp")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.starts_with(b"BM") {
        Some("image/bmp")
    } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        Some("image/tiff")
    } else {
        None
    }
}

/// Whether the bytes look like an image format the pipeline can handle.
pub fn is_supported_image(data: &[u8]) -> bool {
    detect_image_mime(data).is_some()
}

// API request/response types

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
