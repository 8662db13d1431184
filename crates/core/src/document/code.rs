//! Sequential code formatting.
//!
//! A code is `prefix + zero-padded suffix` where the prefix is the family tag
//! plus `YYYYMM`. The storage layer finds the greatest existing code for the
//! prefix; this module turns that into the next one.

use chrono::NaiveDate;

use super::error::DocumentError;
use super::kind::DocumentKind;

/// Builds the code prefix for a family and month, e.g. `GR202610`.
#[must_use]
pub fn code_prefix(kind: DocumentKind, date: NaiveDate) -> String {
    format!("{}{}", kind.tag(), date.format("%Y%m"))
}

/// Parses the numeric suffix of `code`.
///
/// # Errors
///
/// Returns `MalformedCode` if `code` does not start with `prefix` followed by
/// exactly `width` ASCII digits.
pub fn parse_suffix(prefix: &str, width: usize, code: &str) -> Result<u64, DocumentError> {
    let malformed = || DocumentError::MalformedCode(code.to_string());

    let suffix = code.strip_prefix(prefix).ok_or_else(malformed)?;
    if suffix.len() != width || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    suffix.parse().map_err(|_| malformed())
}

/// Returns the code following `latest`, or the first code when there is none.
///
/// # Errors
///
/// - `MalformedCode` if `latest` cannot be parsed.
/// - `CodeSequenceExhausted` if the next suffix does not fit in `width`.
pub fn next_code(
    prefix: &str,
    width: usize,
    latest: Option<&str>,
) -> Result<String, DocumentError> {
    let current = match latest {
        Some(code) => parse_suffix(prefix, width, code)?,
        None => 0,
    };

    let exhausted = || DocumentError::CodeSequenceExhausted(prefix.to_string());
    let next = current.checked_add(1).ok_or_else(exhausted)?;
    let suffix = format!("{next:0width$}");
    if suffix.len() > width {
        return Err(exhausted());
    }

    Ok(format!("{prefix}{suffix}"))
}
