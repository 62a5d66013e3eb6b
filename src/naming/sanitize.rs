//! Slug sanitization, date prefixes, and filesystem-safety validation.

use deunicode::deunicode;

/// Fallback slug for names that sanitize to nothing
const EMPTY_NAME_FALLBACK: &str = "unnamed";

/// Characters rejected by `validate_filename` on top of control characters
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Sanitize a filename into a safe slug.
///
/// Strips a trailing extension, transliterates non-ASCII characters to
/// their closest ASCII form, lowercases, and maps any remaining disallowed
/// character to a single `_`, collapsing runs. An empty result becomes
/// `"unnamed"`. The final slug is truncated to `max_length` and trailing
/// separators are stripped. Never fails; empty input is a defined case.
pub fn sanitize_filename(name: &str, max_length: usize) -> String {
    // Drop the last extension segment if one is present
    let stem = match name.rsplit_once('.') {
        Some((base, _)) => base,
        None => name,
    };

    let transliterated = deunicode(stem);

    let mut slug = String::with_capacity(transliterated.len());
    let mut prev_sep = true; // swallow leading separators
    for ch in transliterated.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            prev_sep = false;
        } else if !prev_sep {
            slug.push('_');
            prev_sep = true;
        }
    }
    let mut slug = slug.trim_end_matches('_').to_string();

    if slug.is_empty() {
        slug = EMPTY_NAME_FALLBACK.to_string();
    }

    // Truncation happens on the final slug, after separator collapse
    if slug.len() > max_length {
        slug.truncate(max_length);
    }

    slug.trim_end_matches(['-', '_']).to_string()
}

/// Prepend an 8-digit date token: `"{date}_{name}"`.
///
/// Anything other than exactly 8 ASCII digits is ignored and `name` is
/// returned unchanged.
pub fn add_date_prefix(name: &str, date: &str) -> String {
    if date.len() == 8 && date.chars().all(|c| c.is_ascii_digit()) {
        format!("{date}_{name}")
    } else {
        name.to_string()
    }
}

/// Validate a finished base name against filesystem-safety rules.
///
/// Pure check, no side effects. The error string is the human-readable
/// reason recorded on the item.
pub fn validate_filename(name: &str, max_length: usize) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Filename cannot be empty".to_string());
    }

    if name.len() > max_length {
        return Err(format!("Filename exceeds maximum length of {max_length}"));
    }

    if name
        .chars()
        .any(|c| c.is_ascii_control() || ILLEGAL_CHARS.contains(&c))
    {
        return Err("Filename contains illegal characters".to_string());
    }

    if name.starts_with('.') || name.ends_with('.') {
        return Err("Filename cannot start or end with a dot".to_string());
    }

    Ok(())
}
