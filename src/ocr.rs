//! OCR token digestion.
//!
//! Running the OCR engine is the collaborator's job; this module distills
//! whatever text it produced into a short, prompt-friendly token summary.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// How many top-frequency tokens to keep by default
pub const DEFAULT_TOP_N: usize = 5;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("word pattern compiles"));

/// Common words that carry no naming signal
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
    "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old", "see", "two",
    "way", "who", "boy", "did", "its", "let", "put", "say", "she", "too", "use",
];

/// Distill recognized text into its most frequent meaningful tokens.
///
/// Tokens are lowercase alphabetic words of three or more letters, stop
/// words removed, ranked by frequency with first appearance breaking ties.
pub fn digest_tokens(text: &str, top_n: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for m in WORD_RE.find_iter(text) {
        let word = m.as_str().to_lowercase();
        if STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        let count = counts.entry(word.clone()).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(top_n);
    order
}

/// Format tokens for the analysis prompt: `"None"` when empty,
/// comma-joined otherwise.
pub fn format_tokens_for_prompt(tokens: &[String]) -> String {
    if tokens.is_empty() {
        "None".to_string()
    } else {
        tokens.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_filters_and_ranks() {
        let text = "Invoice invoice INVOICE from the ACME Corp corp, total due";
        let tokens = digest_tokens(text, 3);

        assert_eq!(tokens[0], "invoice"); // 3 occurrences
        assert_eq!(tokens[1], "corp"); // 2 occurrences
        assert_eq!(tokens.len(), 3);
        assert!(!tokens.contains(&"the".to_string()));
    }

    #[test]
    fn test_digest_drops_short_words_and_numbers() {
        let tokens = digest_tokens("ab 12 345 receipt", DEFAULT_TOP_N);

        assert_eq!(tokens, vec!["receipt"]);
    }

    #[test]
    fn test_digest_tie_break_is_first_appearance() {
        let tokens = digest_tokens("zebra apple", DEFAULT_TOP_N);

        assert_eq!(tokens, vec!["zebra", "apple"]);
    }

    #[test]
    fn test_digest_empty_text() {
        assert!(digest_tokens("", DEFAULT_TOP_N).is_empty());
        assert!(digest_tokens("the and for", DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn test_format_for_prompt() {
        assert_eq!(format_tokens_for_prompt(&[]), "None");
        assert_eq!(
            format_tokens_for_prompt(&["receipt".to_string(), "total".to_string()]),
            "receipt, total"
        );
    }
}
