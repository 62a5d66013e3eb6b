//! Filename normalization pipeline: sanitization, casing, date prefixes,
//! validation, uniqueness, and batch find/replace.

pub mod casing;
pub mod find_replace;
pub mod sanitize;
pub mod uniqueness;

pub use casing::{apply_casing, apply_casing_named};
pub use find_replace::find_and_replace;
pub use sanitize::{add_date_prefix, sanitize_filename, validate_filename};
pub use uniqueness::ensure_uniqueness;
