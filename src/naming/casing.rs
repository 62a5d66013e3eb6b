//! Deterministic casing policies for generated filenames.
//!
//! Each policy is idempotent on input already in that form, so re-applying
//! a style from the review table never mangles a name.

use crate::models::CasingStyle;

/// Apply a casing style to a base name.
pub fn apply_casing(name: &str, style: CasingStyle) -> String {
    match style {
        CasingStyle::Kebab => separate_words(name, '-'),
        CasingStyle::Snake => separate_words(name, '_'),
        CasingStyle::Camel => to_camel(name),
        CasingStyle::Title => to_title(name),
    }
}

/// Apply a casing style identified by name.
///
/// Unknown style names leave the input untouched (permissive default).
pub fn apply_casing_named(name: &str, style: &str) -> String {
    match CasingStyle::try_from_str(style) {
        Some(parsed) => apply_casing(name, parsed),
        None => name.to_string(),
    }
}

/// kebab-case and snake_case share one shape: normalize the other
/// separators, break before uppercase letters, lowercase, collapse runs.
fn separate_words(name: &str, sep: char) -> String {
    let mut broken = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            broken.push(sep);
        } else if ch.is_uppercase() {
            broken.push(sep);
            broken.push(ch);
        } else {
            broken.push(ch);
        }
    }

    collapse_runs(&broken.to_lowercase(), sep)
}

fn to_camel(name: &str) -> String {
    let parts: Vec<&str> = name
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    let Some((first, rest)) = parts.split_first() else {
        return String::new();
    };

    // Only the first letter of each segment changes; the remainder is kept
    // as-is so an already-camelCase name survives a second application.
    let mut out = recase_first(first, false);
    for part in rest {
        out.push_str(&recase_first(part, true));
    }
    out
}

fn to_title(name: &str) -> String {
    name.replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First letter recased, remainder unchanged.
fn recase_first(word: &str, upper: bool) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => {
            let mut out = String::with_capacity(word.len());
            if upper {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// First letter uppercased, remainder lowercased.
fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn collapse_runs(s: &str, sep: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_sep = false;
    for ch in s.chars() {
        if ch == sep {
            if !prev_sep {
                out.push(ch);
            }
            prev_sep = true;
        } else {
            out.push(ch);
            prev_sep = false;
        }
    }

    out.trim_matches(sep).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: [CasingStyle; 4] = [
        CasingStyle::Kebab,
        CasingStyle::Snake,
        CasingStyle::Camel,
        CasingStyle::Title,
    ];

    #[test]
    fn test_kebab() {
        assert_eq!(apply_casing("hello_world_test", CasingStyle::Kebab), "hello-world-test");
        assert_eq!(apply_casing("helloWorld", CasingStyle::Kebab), "hello-world");
        assert_eq!(apply_casing("Hello World", CasingStyle::Kebab), "hello-world");
    }

    #[test]
    fn test_snake() {
        assert_eq!(apply_casing("hello-world-test", CasingStyle::Snake), "hello_world_test");
        assert_eq!(apply_casing("helloWorld", CasingStyle::Snake), "hello_world");
        assert_eq!(apply_casing("hello_world_test", CasingStyle::Snake), "hello_world_test");
    }

    #[test]
    fn test_camel() {
        assert_eq!(apply_casing("hello_world_test", CasingStyle::Camel), "helloWorldTest");
        assert_eq!(apply_casing("hello-world", CasingStyle::Camel), "helloWorld");
        assert_eq!(apply_casing("Hello World", CasingStyle::Camel), "helloWorld");
    }

    #[test]
    fn test_title() {
        assert_eq!(apply_casing("hello_world_test", CasingStyle::Title), "Hello World Test");
        assert_eq!(apply_casing("sunset-over-beach", CasingStyle::Title), "Sunset Over Beach");
    }

    #[test]
    fn test_idempotence() {
        for input in ["hello_world_test", "Mixed Case-name", "alreadyCamelCase", "x"] {
            for style in STYLES {
                let once = apply_casing(input, style);
                let twice = apply_casing(&once, style);
                assert_eq!(once, twice, "style {style:?} not idempotent on {input:?}");
            }
        }
    }

    #[test]
    fn test_empty_input() {
        for style in STYLES {
            assert_eq!(apply_casing("", style), "");
        }
    }

    #[test]
    fn test_named_passthrough_for_unknown_style() {
        assert_eq!(apply_casing_named("Some_Name", "pascal"), "Some_Name");
        assert_eq!(apply_casing_named("Some_Name", "kebab"), "some-name");
    }
}
