//! Vision-analysis integration: request construction, transport with
//! bounded retry, and the validation/repair/fallback state machine that
//! guards against unreliable model output.

pub mod client;
pub mod heuristic;
pub mod prompts;
pub mod schema;

pub use client::{
    api_key_from_env, AnalysisCallError, AnalysisRequest, GeminiClient, ImageAnalyzer, RetryPolicy,
};
pub use heuristic::fallback_heuristic;
pub use schema::validate_response;
