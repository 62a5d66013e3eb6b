//! Shared value objects for the renaming pipeline.

use serde::{Deserialize, Serialize};

/// Smallest allowed maximum-filename-length setting
pub const MIN_NAME_LENGTH: usize = 20;
/// Largest allowed maximum-filename-length setting
pub const MAX_NAME_LENGTH: usize = 100;
/// Default maximum filename length
pub const DEFAULT_NAME_LENGTH: usize = 60;
/// Default vision model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Default confidence threshold for flagging low-confidence suggestions
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Casing style applied to generated filenames
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CasingStyle {
    Kebab,
    Snake,
    Camel,
    Title,
}

impl CasingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kebab => "kebab",
            Self::Snake => "snake",
            Self::Camel => "camel",
            Self::Title => "title",
        }
    }

    /// Parse a style name. Unknown names return `None`; callers treat that
    /// as "leave the name untouched" (see `naming::casing::apply_casing_named`).
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "kebab" => Some(Self::Kebab),
            "snake" => Some(Self::Snake),
            "camel" => Some(Self::Camel),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

impl Default for CasingStyle {
    fn default() -> Self {
        Self::Kebab
    }
}

/// Immutable per-batch settings.
///
/// Two `Settings` with identical field values produce identical
/// `canonical_json()` output (and therefore identical cache hashes)
/// regardless of the order fields were written in any serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Vision model identifier
    pub model: String,
    /// Maximum filename length (clamped to 20..=100)
    pub max_length: usize,
    /// Casing style for generated names
    pub casing: CasingStyle,
    /// Prefix names with the EXIF capture date when available
    pub include_exif_date: bool,
    /// Include OCR tokens in the analysis request
    pub include_ocr: bool,
    /// Confidence threshold (clamped to 0.0..=1.0)
    pub confidence_threshold: f32,
}

impl Settings {
    pub fn new(
        model: impl Into<String>,
        max_length: usize,
        casing: CasingStyle,
        include_exif_date: bool,
        include_ocr: bool,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            model: model.into(),
            max_length: max_length.clamp(MIN_NAME_LENGTH, MAX_NAME_LENGTH),
            casing,
            include_exif_date,
            include_ocr,
            confidence_threshold: confidence_threshold.clamp(0.0, 1.0),
        }
    }

    /// Canonical, order-independent JSON encoding used for cache hashing.
    ///
    /// Round-tripping through `serde_json::Value` sorts object keys
    /// (the underlying map is a BTreeMap), so the encoding does not depend
    /// on field order.
    pub fn canonical_json(&self) -> String {
        serde_json::to_value(self)
            .expect("Settings serializes to a JSON object")
            .to_string()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_length: DEFAULT_NAME_LENGTH,
            casing: CasingStyle::default(),
            include_exif_date: false,
            include_ocr: false,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Validated result of one vision-analysis call.
///
/// All four fields are mandatory after validation; `ai::schema` fills
/// absent fields with the defaults below and clamps `confidence`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    /// Suggested base name, without extension
    pub proposed_filename: String,
    /// Short explanation of the suggestion
    pub reasons: String,
    /// Content tags, most relevant first
    pub semantic_tags: Vec<String>,
    /// Confidence score in [0.0, 1.0]
    pub confidence: f32,
}

impl AnalysisResult {
    /// Hard-coded terminal fallback used when neither the response nor the
    /// image pixels can be interpreted.
    pub fn terminal_fallback() -> Self {
        Self {
            proposed_filename: "unnamed-photo".to_string(),
            reasons: "Could not analyze image".to_string(),
            semantic_tags: vec!["photo".to_string()],
            confidence: 0.1,
        }
    }
}

/// Per-item mutable record carried through the whole pipeline.
///
/// Created once per uploaded item and mutated in place by each stage.
/// Failures are recorded in `errors`, never fatal to the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Name the file was uploaded with
    pub original_name: String,
    /// Extension including the leading dot, or empty
    pub extension: String,
    /// Raw file bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Final name (base + extension) once the pipeline has run
    pub new_name: String,
    pub confidence: f32,
    pub tags: Vec<String>,
    pub reasons: String,
    /// EXIF capture date as `YYYYMMDD`, when present
    pub exif_date: Option<String>,
    /// Tokens supplied by the OCR collaborator
    pub ocr_tokens: Vec<String>,
    /// Wall-clock latency of the analysis call (0 on cache hit)
    pub latency_ms: u64,
    /// Accumulated per-item error messages
    pub errors: Vec<String>,
    /// Whether the item participates in export
    pub include: bool,
}

impl ImageRecord {
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let original_name = original_name.into();
        let extension = match original_name.rsplit_once('.') {
            Some((base, ext)) if !base.is_empty() && !ext.is_empty() => format!(".{ext}"),
            _ => String::new(),
        };

        Self {
            original_name,
            extension,
            bytes,
            new_name: String::new(),
            confidence: 0.0,
            tags: Vec::new(),
            reasons: String::new(),
            exif_date: None,
            ocr_tokens: Vec::new(),
            latency_ms: 0,
            errors: Vec::new(),
            include: true,
        }
    }

    /// Base of `new_name` without its extension.
    pub fn base_name(&self) -> &str {
        match self.new_name.rsplit_once('.') {
            Some((base, _)) => base,
            None => &self.new_name,
        }
    }
}
