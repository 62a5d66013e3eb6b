//! Deterministic pixel-statistics fallback.
//!
//! When the analysis call or its response is unusable, a plausible name is
//! derived from the image alone: downsample, average the channels, classify
//! dominant hue and brightness. No model, no network, same answer every time.

use crate::models::AnalysisResult;
use image::imageops::FilterType;

/// Side length of the downsampled grid used for channel averaging
const SAMPLE_DIM: u32 = 50;

/// Midpoint of the 0..255 channel range; above is "bright", at or below "dark"
const LUMINANCE_MIDPOINT: f64 = 128.0;

/// Produce a fallback result from pixel statistics.
///
/// Confidence is fixed at 0.3 so downstream review can tell heuristic names
/// from model suggestions. If the image itself cannot be decoded, the
/// hard-coded terminal fallback is returned instead.
pub fn fallback_heuristic(image_bytes: &[u8]) -> AnalysisResult {
    let Some((tone, color)) = pixel_statistics(image_bytes) else {
        return AnalysisResult::terminal_fallback();
    };

    AnalysisResult {
        proposed_filename: format!("{tone}-{color}-photo"),
        reasons: "Generated using fallback heuristic (AI analysis failed)".to_string(),
        semantic_tags: vec![tone.to_string(), color.to_string(), "photo".to_string()],
        confidence: 0.3,
    }
}

/// Classify (brightness, dominant hue) or `None` when the bytes don't decode.
fn pixel_statistics(image_bytes: &[u8]) -> Option<(&'static str, &'static str)> {
    let img = image::load_from_memory(image_bytes).ok()?;
    let small = img
        .resize_exact(SAMPLE_DIM, SAMPLE_DIM, FilterType::Triangle)
        .to_rgb8();

    let mut sums = [0.0f64; 3];
    for pixel in small.pixels() {
        sums[0] += pixel[0] as f64;
        sums[1] += pixel[1] as f64;
        sums[2] += pixel[2] as f64;
    }

    let count = (SAMPLE_DIM * SAMPLE_DIM) as f64;
    let (r, g, b) = (sums[0] / count, sums[1] / count, sums[2] / count);

    let color = if r > g && r > b {
        "red"
    } else if g > r && g > b {
        "green"
    } else if b > r && b > g {
        "blue"
    } else {
        "neutral"
    };

    let tone = if (r + g + b) / 3.0 > LUMINANCE_MIDPOINT {
        "bright"
    } else {
        "dark"
    };

    Some((tone, color))
}
