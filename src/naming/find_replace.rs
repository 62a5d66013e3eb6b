//! Batch find/replace over base names, literal or regex.

use regex::Regex;

/// Replace `find` with `replacement` in every name.
///
/// Literal mode replaces all occurrences of the substring. Regex mode
/// substitutes every match of the pattern; an invalid pattern is fail-soft
/// and leaves the whole batch unmodified rather than surfacing an error.
pub fn find_and_replace(
    names: &[String],
    find: &str,
    replacement: &str,
    use_regex: bool,
) -> Vec<String> {
    if !use_regex {
        return names.iter().map(|n| n.replace(find, replacement)).collect();
    }

    match Regex::new(find) {
        Ok(pattern) => names
            .iter()
            .map(|n| pattern.replace_all(n, replacement).into_owned())
            .collect(),
        Err(e) => {
            tracing::warn!("invalid find/replace pattern {find:?}: {e}; names left unchanged");
            names.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_literal_replace_all_occurrences() {
        let result = find_and_replace(
            &names(&["hello-world", "goodbye-world", "test-file"]),
            "world",
            "universe",
            false,
        );

        assert_eq!(result[0], "hello-universe");
        assert_eq!(result[1], "goodbye-universe");
        assert_eq!(result[2], "test-file");
    }

    #[test]
    fn test_literal_replaces_repeated_matches() {
        let result = find_and_replace(&names(&["aba-aba"]), "aba", "x", false);
        assert_eq!(result[0], "x-x");
    }

    #[test]
    fn test_regex_replace() {
        let result = find_and_replace(
            &names(&["hello-world", "goodbye-world", "test-file"]),
            r"-\w+$",
            "-replaced",
            true,
        );

        assert!(result.iter().all(|n| n.ends_with("-replaced")));
    }

    #[test]
    fn test_invalid_regex_is_fail_soft() {
        let input = names(&["hello-world", "test-file"]);
        let result = find_and_replace(&input, "[unclosed", "x", true);

        assert_eq!(result, input);
    }
}
