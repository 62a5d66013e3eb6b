//! Batch-wide uniqueness resolution for final filenames.

use std::collections::HashMap;

/// Deduplicate a batch of candidate names.
///
/// `names` and `extensions` are parallel slices; input order is the
/// tie-break. The first occurrence of a name is emitted unmodified;
/// later collisions probe `{name}-{counter}{ext}` until a free slot is
/// found. Comparison is case-insensitive and empty base names become
/// `"unnamed"` before probing.
///
/// The contract is the output property: the result preserves length and
/// order, and no two entries are equal case-insensitively.
pub fn ensure_uniqueness(names: &[String], extensions: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(names.len());

    for (name, ext) in names.iter().zip(extensions.iter()) {
        let base = if name.is_empty() { "unnamed" } else { name.as_str() };
        let full = format!("{base}{ext}");
        let key = full.to_lowercase();

        match seen.get(&key).copied() {
            None => {
                seen.insert(key, 1);
                result.push(full);
            }
            Some(start) => {
                let mut counter = start;
                loop {
                    let candidate = format!("{base}-{counter}{ext}");
                    let candidate_key = candidate.to_lowercase();
                    if !seen.contains_key(&candidate_key) {
                        seen.insert(candidate_key, 1);
                        result.push(candidate);
                        break;
                    }
                    counter += 1;
                }
                // Remember where probing left off for this base name
                seen.insert(key, counter + 1);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(names: &[&str], exts: &[&str]) -> Vec<String> {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let exts: Vec<String> = exts.iter().map(|s| s.to_string()).collect();
        ensure_uniqueness(&names, &exts)
    }

    fn assert_pairwise_unique(result: &[String]) {
        let mut lowered: Vec<String> = result.iter().map(|s| s.to_lowercase()).collect();
        lowered.sort();
        lowered.dedup();
        assert_eq!(lowered.len(), result.len(), "collision in {result:?}");
    }

    #[test]
    fn test_duplicates_get_suffixes() {
        let result = run(
            &["photo", "photo", "photo", "image"],
            &[".jpg", ".jpg", ".jpg", ".jpg"],
        );

        assert_eq!(result.len(), 4);
        assert_pairwise_unique(&result);
        // First occurrence unmodified, later ones suffixed
        assert_eq!(result[0], "photo.jpg");
        assert_eq!(result[1], "photo-1.jpg");
        assert_eq!(result[2], "photo-2.jpg");
        assert_eq!(result[3], "image.jpg");
    }

    #[test]
    fn test_case_insensitive_collisions() {
        let result = run(&["Photo", "photo", "PHOTO"], &[".jpg", ".jpg", ".jpg"]);

        assert_eq!(result[0], "Photo.jpg");
        assert_pairwise_unique(&result);
    }

    #[test]
    fn test_collision_with_existing_suffixed_name() {
        // "photo-1" is taken by an input before the probe reaches it
        let result = run(&["photo", "photo-1", "photo"], &[".jpg", ".jpg", ".jpg"]);

        assert_eq!(result[0], "photo.jpg");
        assert_eq!(result[1], "photo-1.jpg");
        assert_pairwise_unique(&result);
    }

    #[test]
    fn test_empty_base_names() {
        let result = run(&["", ""], &[".jpg", ".jpg"]);

        assert_eq!(result[0], "unnamed.jpg");
        assert_pairwise_unique(&result);
    }

    #[test]
    fn test_order_and_length_preserved() {
        let result = run(&["b", "a", "b", "a"], &[".png", ".png", ".png", ".png"]);

        assert_eq!(result.len(), 4);
        assert!(result[0].starts_with('b'));
        assert!(result[1].starts_with('a'));
        assert_pairwise_unique(&result);
    }

    #[test]
    fn test_differing_extensions_do_not_collide() {
        let result = run(&["photo", "photo"], &[".jpg", ".png"]);

        assert_eq!(result, vec!["photo.jpg", "photo.png"]);
    }
}
