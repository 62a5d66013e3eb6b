//! Export preconditions.
//!
//! Packaging (ZIP/CSV/session log) belongs to the export collaborators;
//! this module is the fail-closed gate in front of them. Everything
//! upstream is fail-soft, but an export with colliding or empty names
//! would silently lose files, so it is blocked instead.

use crate::models::ImageRecord;
use std::collections::HashSet;

/// Validate a batch before export.
///
/// Requires at least one included item, no case-insensitive duplicate
/// final names among included items, and no empty final names. Returns
/// every violation as a human-readable message.
pub fn validate_for_export(records: &[ImageRecord]) -> Result<(), Vec<String>> {
    let included: Vec<&ImageRecord> = records.iter().filter(|r| r.include).collect();

    if included.is_empty() {
        return Err(vec!["No files selected for export".to_string()]);
    }

    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for record in &included {
        if !seen.insert(record.new_name.to_lowercase()) {
            duplicates.push(record.new_name.clone());
        }
    }
    if !duplicates.is_empty() {
        errors.push(format!(
            "Duplicate filenames found: {}",
            duplicates.join(", ")
        ));
    }

    let empty: Vec<String> = included
        .iter()
        .filter(|r| r.new_name.trim().is_empty())
        .map(|r| r.original_name.clone())
        .collect();
    if !empty.is_empty() {
        errors.push(format!("Empty filenames for: {}", empty.join(", ")));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(new_name: &str, include: bool) -> ImageRecord {
        let mut r = ImageRecord::new("original.jpg", vec![]);
        r.new_name = new_name.to_string();
        r.include = include;
        r
    }

    #[test]
    fn test_valid_batch_passes() {
        let records = vec![record("a.jpg", true), record("b.jpg", true)];
        assert!(validate_for_export(&records).is_ok());
    }

    #[test]
    fn test_nothing_included_blocks_export() {
        let records = vec![record("a.jpg", false)];
        let errors = validate_for_export(&records).unwrap_err();

        assert_eq!(errors, vec!["No files selected for export".to_string()]);
    }

    #[test]
    fn test_case_insensitive_duplicates_block_export() {
        let records = vec![record("Photo.jpg", true), record("photo.jpg", true)];
        let errors = validate_for_export(&records).unwrap_err();

        assert!(errors[0].contains("Duplicate filenames"));
        assert!(errors[0].contains("photo.jpg"));
    }

    #[test]
    fn test_excluded_duplicates_are_ignored() {
        let records = vec![record("photo.jpg", true), record("photo.jpg", false)];
        assert!(validate_for_export(&records).is_ok());
    }

    #[test]
    fn test_empty_names_block_export() {
        let records = vec![record("a.jpg", true), record("   ", true)];
        let errors = validate_for_export(&records).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Empty filenames for: original.jpg"));
    }
}
