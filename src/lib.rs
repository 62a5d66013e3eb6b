//! namelens — AI-assisted photo renaming engine.
//!
//! Turns a batch of loosely-structured, possibly malformed vision-model
//! suggestions into deterministic, collision-free, filesystem-safe
//! filenames. A content-addressable cache keyed by (image hash, settings
//! hash) prevents duplicate analysis calls within a session, and a
//! validation/repair/fallback state machine guarantees a usable result for
//! every image no matter what the model returns.

pub mod ai;
pub mod cache;
pub mod exif;
pub mod export;
pub mod models;
pub mod naming;
pub mod ocr;
pub mod pipeline;

pub use ai::{
    api_key_from_env, validate_response, AnalysisCallError, AnalysisRequest, GeminiClient,
    ImageAnalyzer, RetryPolicy,
};
pub use cache::ResultCache;
pub use models::{AnalysisResult, CasingStyle, ImageRecord, Settings};
pub use pipeline::BatchSession;

use tracing_subscriber::EnvFilter;

/// Initialize tracing with the `RUST_LOG` env filter.
///
/// Default: warn for dependencies, info for this crate. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,namelens=info")),
        )
        .try_init();
}
