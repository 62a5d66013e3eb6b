use crate::models::CasingStyle;

/// System prompt for filename suggestions
///
/// The strict-JSON instruction is best-effort; `ai::schema` repairs
/// whatever actually comes back.
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"Analyze this image and suggest a descriptive filename. Return ONLY valid JSON:
{"proposed_filename":"descriptive-name","reasons":"brief explanation","semantic_tags":["tag1","tag2"],"confidence":0.8}

Rules: Be specific but concise. No extension. Use kebab-case. Max 60 chars. No dates."#;

/// Build the per-image user prompt.
///
/// Carries the full request contract: target casing, maximum length, the
/// OCR token summary (or "None"), and the confidence threshold the caller
/// will review against.
pub fn build_analysis_prompt(
    casing: CasingStyle,
    max_length: usize,
    ocr_summary: &str,
    confidence_threshold: f32,
) -> String {
    format!(
        r#"Describe this image in a filename. Max {max_length} chars. Style: {casing}.
Text visible in the image (OCR): {ocr_summary}
Suggestions below {confidence_threshold:.2} confidence will be flagged for manual review, so report confidence honestly.
Return JSON only."#,
        casing = casing.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_request_contract() {
        let prompt = build_analysis_prompt(CasingStyle::Snake, 40, "receipt, total", 0.4);

        assert!(prompt.contains("Max 40 chars"));
        assert!(prompt.contains("Style: snake"));
        assert!(prompt.contains("receipt, total"));
        assert!(prompt.contains("0.40"));
    }

    #[test]
    fn test_prompt_with_no_ocr_tokens() {
        let prompt = build_analysis_prompt(CasingStyle::Kebab, 60, "None", 0.4);

        assert!(prompt.contains("(OCR): None"));
    }
}
