//! Common validation utilities for admin form fields.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Characters accepted in a slide target link (absolute, relative or anchor).
    static ref TARGET_URL_RE: Regex =
        Regex::new(r"^[~:#,$%&_=().? +\-@/a-zA-Z0-9\p{L}[\p{S}&&[^<>]]]+$")
            .expect("valid regex");

    /// Plain file names only: no separators, no spaces.
    static ref FILE_NAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_.\-]+$").expect("valid regex");

    /// Optionally signed decimal integer.
    static ref INTEGER_RE: Regex = Regex::new(r"^[+\-]?\d+$").expect("valid regex");
}

/// Returns true when `value` is a syntactically valid target link.
pub fn is_target_url(value: &str) -> bool {
    TARGET_URL_RE.is_match(value)
}

/// Returns true when `value` is a safe file name.
pub fn is_file_name(value: &str) -> bool {
    FILE_NAME_RE.is_match(value) && value != "." && value != ".."
}

/// Returns true when `value` is a decimal integer.
pub fn is_integer(value: &str) -> bool {
    INTEGER_RE.is_match(value.trim())
}

/// Returns true when `value` is a non-negative decimal integer.
pub fn is_unsigned_integer(value: &str) -> bool {
    let value = value.trim();
    is_integer(value) && !value.starts_with('-')
}

/// Validates a slide target link. Empty links are accepted.
pub fn validate_target_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() || is_target_url(url) {
        Ok(())
    } else {
        let mut err = ValidationError::new("url_format");
        err.message = Some("The URL format is not correct.".into());
        Err(err)
    }
}

/// Validates an image filename. Empty values mean "no image" and are accepted.
pub fn validate_image_file_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || is_file_name(name) {
        Ok(())
    } else {
        let mut err = ValidationError::new("file_name");
        err.message = Some("Invalid filename.".into());
        Err(err)
    }
}
