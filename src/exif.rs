//! EXIF capture-date extraction.
//!
//! The naming pipeline only wants one thing from EXIF: an 8-digit
//! `YYYYMMDD` token for `naming::add_date_prefix`. Absent or unparseable
//! metadata is `None`, never an error.

use chrono::{NaiveDate, NaiveDateTime};
// Leading `::` disambiguates the kamadak-exif crate from this module
use ::exif::{In, Reader, Tag, Value};
use std::io::Cursor;

/// Extract the capture date from raw image bytes as `YYYYMMDD`.
pub fn extract_capture_date(image_bytes: &[u8]) -> Option<String> {
    let mut cursor = Cursor::new(image_bytes);
    let exif = Reader::new().read_from_container(&mut cursor).ok()?;

    // Date fields in order of preference
    let date_tags = [Tag::DateTimeOriginal, Tag::DateTime, Tag::DateTimeDigitized];

    date_tags
        .into_iter()
        .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
        .find_map(|field| {
            let raw = match &field.value {
                // Raw ASCII bytes; display_value() would add quotes
                Value::Ascii(vec) if !vec.is_empty() => {
                    String::from_utf8(vec[0].clone()).ok()?
                }
                _ => field.display_value().to_string(),
            };
            parse_exif_date(&raw)
        })
}

/// Parse the EXIF date format `"YYYY:MM:DD HH:MM:SS"` (date-only tolerated)
/// into `YYYYMMDD`.
fn parse_exif_date(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_matches('"');

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y:%m:%d %H:%M:%S") {
        return Some(dt.format("%Y%m%d").to_string());
    }

    let date_part = trimmed.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y:%m:%d")
        .ok()
        .map(|d| d.format("%Y%m%d").to_string())
}
