//! `Vary` header merging.
//!
//! `Vary` is a list header owned by several writers (compression, CORS,
//! content negotiation). Values are appended, never overwritten.

/// Merge `field` into an existing `Vary` value
///
/// Returns the new header value, or `None` when the existing value already
/// covers `field` and nothing needs to be written.
///
/// - `*` absorbs every other entry.
/// - Entries are compared case-insensitively.
/// - Existing entries keep their order and spelling.
#[must_use]
pub fn merge(existing: Option<&str>, field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }

    let existing = existing.map(str::trim).filter(|v| !v.is_empty());
    let Some(existing) = existing else {
        return Some(field.to_string());
    };

    if existing == "*" {
        return None;
    }
    if field == "*" {
        return Some("*".to_string());
    }

    let mut entries = existing.split(',').map(str::trim).filter(|v| !v.is_empty());
    if entries.any(|v| v == "*" || v.eq_ignore_ascii_case(field)) {
        return None;
    }

    Some(format!("{existing}, {field}"))
}
