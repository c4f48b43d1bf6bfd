//! The text a record is embedded from.

use beacon_core::constants::EMBEDDING_TEXT_SEPARATOR;
use beacon_core::models::Record;

/// Name, body (or summary when there is no body), category, then the
/// product, audience and solution tags, joined with `" | "`. Empty parts are
/// skipped.
pub fn embedding_text(record: &Record) -> String {
    let mut parts: Vec<&str> = vec![
        record.name.as_str(),
        record.long_text(),
        record.category.as_str(),
    ];
    parts.extend(record.tags.product.iter().map(String::as_str));
    parts.extend(record.tags.audience.iter().map(String::as_str));
    parts.extend(record.tags.solution.iter().map(String::as_str));

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(EMBEDDING_TEXT_SEPARATOR)
}

/// Blake3 hex digest of an embedding text, used to detect stale vectors.
pub fn text_hash(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}
