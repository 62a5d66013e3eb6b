//! Batch processing session.
//!
//! Visits records strictly in input order: cooperative cancel checkpoint,
//! input-format gate, EXIF date, cache lookup, analysis call (or cached
//! result), normalization, per-item validation. One item's failure is
//! recorded on the item and never aborts the batch. A second synchronous
//! sweep then guarantees batch-wide uniqueness of the final names.

use crate::ai::client::{is_supported_image, AnalysisRequest, ImageAnalyzer};
use crate::ai::{fallback_heuristic, validate_response};
use crate::cache::{self, ResultCache};
use crate::models::{ImageRecord, Settings};
use crate::naming::{
    add_date_prefix, apply_casing, ensure_uniqueness, find_and_replace, sanitize_filename,
    validate_filename,
};
use crate::{exif, ocr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Per-batch context: result cache, session id, and a cooperative cancel
/// flag. Constructed per invocation and discarded at completion; nothing
/// here is global.
pub struct BatchSession {
    id: Uuid,
    cache: ResultCache,
    cancel: Arc<AtomicBool>,
}

impl BatchSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cache: ResultCache::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Handle the caller can set from another task to request early
    /// termination. Checked between items, not preemptively.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Process a batch in input order, then resolve name collisions.
    ///
    /// Always completes: failed items carry their errors and a placeholder
    /// name so the batch can still be reviewed.
    pub async fn process_batch(
        &mut self,
        records: &mut [ImageRecord],
        settings: &Settings,
        analyzer: &dyn ImageAnalyzer,
    ) {
        let total = records.len();
        tracing::info!(session = %self.id, "processing batch of {total} items");

        for (idx, record) in records.iter_mut().enumerate() {
            if self.is_cancelled() {
                tracing::info!(session = %self.id, "cancelled before item {}/{total}", idx + 1);
                break;
            }

            tracing::debug!(
                session = %self.id,
                "processing {}/{total}: {}",
                idx + 1,
                record.original_name
            );

            if let Err(message) = self.process_record(record, settings, analyzer).await {
                tracing::warn!("failed to process {}: {message}", record.original_name);
                record.errors.push(message);
                record.new_name = format!("error-{idx}{}", record.extension);
            }
        }

        finalize_names(records);
        tracing::info!(session = %self.id, "batch complete, cache holds {} entries", self.cache.len());
    }

    async fn process_record(
        &mut self,
        record: &mut ImageRecord,
        settings: &Settings,
        analyzer: &dyn ImageAnalyzer,
    ) -> Result<(), String> {
        if !is_supported_image(&record.bytes) {
            return Err(format!(
                "Unsupported input format for '{}'",
                record.original_name
            ));
        }

        record.exif_date = exif::extract_capture_date(&record.bytes);

        let ocr_summary = if settings.include_ocr {
            ocr::format_tokens_for_prompt(&record.ocr_tokens)
        } else {
            "None".to_string()
        };

        let key = cache::cache_key(&record.bytes, settings);
        let (result, latency_ms) = match self.cache.get(&key) {
            Some(hit) => {
                tracing::debug!("cache hit for {}", record.original_name);
                (hit, 0)
            }
            None => {
                let request = AnalysisRequest {
                    image_bytes: &record.bytes,
                    casing: settings.casing,
                    max_length: settings.max_length,
                    ocr_summary: &ocr_summary,
                    confidence_threshold: settings.confidence_threshold,
                };

                let started = Instant::now();
                let result = match analyzer.analyze(request).await {
                    Ok(raw_text) => validate_response(&raw_text, &record.bytes),
                    Err(e) => {
                        // Fail-soft: the heuristic names the image instead
                        record
                            .errors
                            .push(format!("Analysis call failed: {e}"));
                        fallback_heuristic(&record.bytes)
                    }
                };
                let latency_ms = started.elapsed().as_millis() as u64;

                self.cache.put(key, result.clone());
                (result, latency_ms)
            }
        };

        let mut base = sanitize_filename(&result.proposed_filename, settings.max_length);
        base = apply_casing(&base, settings.casing);

        if settings.include_exif_date {
            if let Some(date) = &record.exif_date {
                base = add_date_prefix(&base, date);
            }
        }

        // Validated against the absolute cap: a date prefix may legitimately
        // push a name past the configured length
        if let Err(reason) = validate_filename(&base, crate::models::MAX_NAME_LENGTH) {
            record.errors.push(format!("Name validation failed: {reason}"));
        }

        record.new_name = format!("{base}{}", record.extension);
        record.confidence = result.confidence;
        record.tags = result.semantic_tags;
        record.reasons = result.reasons;
        record.latency_ms = latency_ms;

        Ok(())
    }
}

impl Default for BatchSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve batch-wide name collisions, preserving input order.
pub fn finalize_names(records: &mut [ImageRecord]) {
    let bases: Vec<String> = records.iter().map(|r| r.base_name().to_string()).collect();
    let extensions: Vec<String> = records.iter().map(|r| r.extension.clone()).collect();

    let unique = ensure_uniqueness(&bases, &extensions);
    for (record, name) in records.iter_mut().zip(unique) {
        record.new_name = name;
    }
}

/// Re-apply the configured casing to every final name, preserving an
/// existing numeric date prefix.
pub fn reapply_casing(records: &mut [ImageRecord], settings: &Settings) {
    for record in records.iter_mut() {
        let base = record.base_name().to_string();

        let recased = match split_date_prefix(&base) {
            Some((prefix, rest)) => {
                format!("{prefix}_{}", apply_casing(rest, settings.casing))
            }
            None => apply_casing(&base, settings.casing),
        };

        record.new_name = format!("{recased}{}", record.extension);
    }
}

/// Re-apply EXIF date prefixes to records that have a capture date,
/// replacing any prefix already present.
pub fn reapply_date_prefix(records: &mut [ImageRecord], settings: &Settings) {
    if !settings.include_exif_date {
        return;
    }

    for record in records.iter_mut() {
        let Some(date) = record.exif_date.clone() else {
            continue;
        };

        let base = record.base_name().to_string();
        let bare = match split_date_prefix(&base) {
            Some((_, rest)) => rest,
            None => base.as_str(),
        };

        let prefixed = add_date_prefix(bare, &date);
        record.new_name = format!("{prefixed}{}", record.extension);
    }
}

/// Validate every final base name, returning one human-readable message
/// per failing record.
pub fn validate_all(records: &[ImageRecord], settings: &Settings) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| {
            validate_filename(record.base_name(), settings.max_length)
                .err()
                .map(|reason| format!("{}: {reason}", record.original_name))
        })
        .collect()
}

/// Batch find/replace over base names; extensions are untouched.
pub fn apply_find_replace(
    records: &mut [ImageRecord],
    find: &str,
    replacement: &str,
    use_regex: bool,
) {
    let bases: Vec<String> = records.iter().map(|r| r.base_name().to_string()).collect();
    let replaced = find_and_replace(&bases, find, replacement, use_regex);

    for (record, base) in records.iter_mut().zip(replaced) {
        record.new_name = format!("{base}{}", record.extension);
    }
}

/// Split a leading all-digit prefix: `"20231115_photo"` → `("20231115", "photo")`.
fn split_date_prefix(base: &str) -> Option<(&str, &str)> {
    let (prefix, rest) = base.split_once('_')?;
    if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
        Some((prefix, rest))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::AnalysisCallError;
    use crate::models::CasingStyle;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::AtomicUsize;

    fn png_bytes(r: u8, g: u8, b: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(6, 6, Rgb([r, g, b]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Analyzer double that replays a canned response and counts calls.
    struct ScriptedAnalyzer {
        response: String,
        calls: AtomicUsize,
    }

    impl ScriptedAnalyzer {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageAnalyzer for ScriptedAnalyzer {
        async fn analyze(
            &self,
            _request: AnalysisRequest<'_>,
        ) -> Result<String, AnalysisCallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    /// Analyzer double that always fails.
    struct FailingAnalyzer;

    #[async_trait]
    impl ImageAnalyzer for FailingAnalyzer {
        async fn analyze(
            &self,
            _request: AnalysisRequest<'_>,
        ) -> Result<String, AnalysisCallError> {
            Err(AnalysisCallError::Server(503))
        }
    }

    #[tokio::test]
    async fn test_batch_names_every_record() {
        let analyzer =
            ScriptedAnalyzer::new(r#"{"proposed_filename": "Sunset Beach", "confidence": 0.9}"#);
        let mut records = vec![
            ImageRecord::new("a.png", png_bytes(200, 50, 50)),
            ImageRecord::new("b.png", png_bytes(50, 200, 50)),
        ];

        let mut session = BatchSession::new();
        session
            .process_batch(&mut records, &Settings::default(), &analyzer)
            .await;

        assert_eq!(records[0].new_name, "sunset-beach.png");
        // Uniqueness pass suffixes the duplicate suggestion
        assert_eq!(records[1].new_name, "sunset-beach-1.png");
        assert!((records[0].confidence - 0.9).abs() < 1e-6);
        assert!(records.iter().all(|r| r.errors.is_empty()));
    }

    #[tokio::test]
    async fn test_cache_short_circuits_identical_items() {
        let analyzer =
            ScriptedAnalyzer::new(r#"{"proposed_filename": "twin", "confidence": 0.8}"#);
        let bytes = png_bytes(10, 10, 120);
        let mut records = vec![
            ImageRecord::new("one.png", bytes.clone()),
            ImageRecord::new("two.png", bytes),
        ];

        let mut session = BatchSession::new();
        session
            .process_batch(&mut records, &Settings::default(), &analyzer)
            .await;

        // Same bytes + same settings: exactly one analysis call
        assert_eq!(analyzer.call_count(), 1);
        assert_eq!(session.cache().len(), 1);
        assert_eq!(records[1].latency_ms, 0);
        assert_eq!(records[0].base_name(), "twin");
        assert_eq!(records[1].base_name(), "twin-1");
    }

    #[tokio::test]
    async fn test_failed_call_routes_to_heuristic() {
        let mut records = vec![ImageRecord::new("red.png", png_bytes(255, 200, 200))];

        let mut session = BatchSession::new();
        session
            .process_batch(&mut records, &Settings::default(), &FailingAnalyzer)
            .await;

        assert_eq!(records[0].new_name, "bright-red-photo.png");
        assert!((records[0].confidence - 0.3).abs() < 1e-6);
        assert_eq!(records[0].errors.len(), 1);
        assert!(records[0].errors[0].contains("Analysis call failed"));
    }

    #[tokio::test]
    async fn test_unsupported_input_gets_placeholder() {
        let analyzer = ScriptedAnalyzer::new(r#"{"proposed_filename": "x"}"#);
        let mut records = vec![
            ImageRecord::new("doc.pdf", b"%PDF-1.7 not an image".to_vec()),
            ImageRecord::new("ok.png", png_bytes(9, 9, 9)),
        ];

        let mut session = BatchSession::new();
        session
            .process_batch(&mut records, &Settings::default(), &analyzer)
            .await;

        assert_eq!(records[0].new_name, "error-0.pdf");
        assert_eq!(records[0].errors.len(), 1);
        // The bad item never reached the analyzer; the good one did
        assert_eq!(analyzer.call_count(), 1);
        assert_eq!(records[1].base_name(), "x");
    }

    #[tokio::test]
    async fn test_cancellation_between_items() {
        let analyzer = ScriptedAnalyzer::new(r#"{"proposed_filename": "x"}"#);
        let mut records = vec![
            ImageRecord::new("a.png", png_bytes(1, 2, 3)),
            ImageRecord::new("b.png", png_bytes(4, 5, 6)),
        ];

        let mut session = BatchSession::new();
        session.cancel_handle().store(true, Ordering::SeqCst);
        session
            .process_batch(&mut records, &Settings::default(), &analyzer)
            .await;

        assert_eq!(analyzer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_casing_setting_is_applied() {
        let analyzer =
            ScriptedAnalyzer::new(r#"{"proposed_filename": "sunset over beach"}"#);
        let mut records = vec![ImageRecord::new("a.png", png_bytes(7, 7, 7))];
        let settings = Settings {
            casing: CasingStyle::Camel,
            ..Settings::default()
        };

        let mut session = BatchSession::new();
        session.process_batch(&mut records, &settings, &analyzer).await;

        assert_eq!(records[0].base_name(), "sunsetOverBeach");
    }

    #[test]
    fn test_reapply_casing_preserves_date_prefix() {
        let mut record = ImageRecord::new("a.jpg", vec![]);
        record.new_name = "20231115_Sunset_Beach.jpg".to_string();
        let settings = Settings {
            casing: CasingStyle::Kebab,
            ..Settings::default()
        };

        reapply_casing(std::slice::from_mut(&mut record), &settings);

        assert_eq!(record.new_name, "20231115_sunset-beach.jpg");
    }

    #[test]
    fn test_reapply_date_prefix_replaces_stale_prefix() {
        let mut record = ImageRecord::new("a.jpg", vec![]);
        record.new_name = "19990101_sunset.jpg".to_string();
        record.exif_date = Some("20231115".to_string());
        let settings = Settings {
            include_exif_date: true,
            ..Settings::default()
        };

        reapply_date_prefix(std::slice::from_mut(&mut record), &settings);

        assert_eq!(record.new_name, "20231115_sunset.jpg");
    }

    #[test]
    fn test_validate_all_reports_offenders() {
        let mut good = ImageRecord::new("good.jpg", vec![]);
        good.new_name = "fine-name.jpg".to_string();
        let mut bad = ImageRecord::new("bad.jpg", vec![]);
        bad.new_name = "broken:name.jpg".to_string();

        let messages = validate_all(&[good, bad], &Settings::default());

        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("bad.jpg:"));
    }

    #[test]
    fn test_apply_find_replace_keeps_extensions() {
        let mut records = vec![ImageRecord::new("a.jpg", vec![])];
        records[0].new_name = "hello-world.jpg".to_string();

        apply_find_replace(&mut records, "world", "universe", false);

        assert_eq!(records[0].new_name, "hello-universe.jpg");
    }

    #[test]
    fn test_finalize_names_resolves_collisions() {
        let mut records = vec![
            ImageRecord::new("a.jpg", vec![]),
            ImageRecord::new("b.jpg", vec![]),
        ];
        records[0].new_name = "same.jpg".to_string();
        records[1].new_name = "Same.jpg".to_string();

        finalize_names(&mut records);

        assert_eq!(records[0].new_name, "same.jpg");
        assert_eq!(records[1].new_name, "Same-1.jpg");
    }
}
