//! Decoder for the trailing referenced-records annotation.
//!
//! Grammar, applied to the last marker occurrence in the text:
//!
//! ```text
//! annotation := emphasis? "RELEVANT_RECORDS" emphasis? ":" emphasis? list
//! list       := json-array | item (delim item)* | (item newline)+
//! delim      := "|" | ";" | ","        (first one present, in that order)
//! emphasis   := any run of "*", "_" or "`"
//! ```
//!
//! The marker is case-insensitive and may use a space instead of the
//! underscore. Items are trimmed of quotes, emphasis, list bullets and
//! list numbers.

use std::sync::LazyLock;

use beacon_core::errors::AnnotationParseError;
use beacon_core::models::{RankedResult, RecordId};
use regex::Regex;

static MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)[*_`]*[ \t]*RELEVANT[_ ]RECORDS[ \t]*[*_`]*[ \t]*:[ \t]*[*_`]*").ok()
});

const ITEM_TRIM: &[char] = &['"', '\'', '*', '_', '`', '-', '•', '[', ']'];

/// The annotation split off a generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAnnotation {
    /// Text before the marker, trailing whitespace removed.
    pub body: String,
    /// Record names in annotation order.
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationDecoder;

impl AnnotationDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Text with the last annotation removed. Text without a marker is
    /// returned trimmed and otherwise unchanged.
    pub fn strip(&self, text: &str) -> String {
        match marker_span(text) {
            Some((start, _)) => text[..start].trim_end().to_string(),
            None => text.trim().to_string(),
        }
    }

    /// Decode the annotation.
    ///
    /// `Ok(None)` when there is no marker. An error when the marker is present
    /// but its list is empty or cannot be read.
    pub fn decode(&self, text: &str) -> Result<Option<DecodedAnnotation>, AnnotationParseError> {
        let Some((start, end)) = marker_span(text) else {
            return Ok(None);
        };
        let body = text[..start].trim_end().to_string();
        let names = parse_list(&text[end..])?;
        Ok(Some(DecodedAnnotation { body, names }))
    }
}

/// Byte span of the last marker.
fn marker_span(text: &str) -> Option<(usize, usize)> {
    let re = MARKER.as_ref()?;
    re.find_iter(text).last().map(|m| (m.start(), m.end()))
}

fn parse_list(fragment: &str) -> Result<Vec<String>, AnnotationParseError> {
    // Everything after the last marker is the list, on one line or spread
    // over several.
    let list = fragment
        .trim()
        .trim_end_matches(['*', '_', '`', '.'])
        .trim();

    if list.is_empty() {
        return Err(AnnotationParseError::EmptyList);
    }

    let items: Vec<String> = if list.starts_with('[') {
        let Some(close) = list.rfind(']') else {
            return Err(AnnotationParseError::UnreadableList {
                fragment: list.to_string(),
            });
        };
        let array = &list[..=close];
        match serde_json::from_str::<Vec<serde_json::Value>>(array) {
            Ok(values) => values
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Err(_) => split_list(&array[1..close]),
        }
    } else {
        split_list(list)
    };

    let items: Vec<String> = items
        .iter()
        .map(|s| strip_ordinal(s.trim().trim_matches(ITEM_TRIM).trim()).to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        let only_brackets = list.trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace());
        return Err(if only_brackets.is_empty() {
            AnnotationParseError::EmptyList
        } else {
            AnnotationParseError::UnreadableList {
                fragment: list.to_string(),
            }
        });
    }
    Ok(items)
}

/// A list over several lines holds one item per line; a single line is split
/// on its first delimiter present.
fn split_list(list: &str) -> Vec<String> {
    let lines: Vec<&str> = list
        .lines()
        .map(|l| l.trim().trim_end_matches(['|', ';', ',']).trim_end())
        .filter(|l| !l.is_empty())
        .collect();
    match lines.as_slice() {
        [] => Vec::new(),
        [line] => split_items(line),
        _ => lines.into_iter().map(String::from).collect(),
    }
}

fn split_items(list: &str) -> Vec<String> {
    let delimiter = ['|', ';', ','].into_iter().find(|d| list.contains(*d));
    match delimiter {
        Some(d) => list.split(d).map(String::from).collect(),
        None => vec![list.to_string()],
    }
}

/// Drop a leading "1." or "2)" list number.
fn strip_ordinal(item: &str) -> &str {
    let rest = item.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == item.len() {
        return item;
    }
    match rest.strip_prefix(['.', ')']) {
        Some(after) if after.starts_with(char::is_whitespace) => after.trim_start(),
        _ => item,
    }
}

/// Resolve annotation names against the supplied records.
///
/// Each name resolves by exact case-insensitive match on the record name,
/// else by substring containment in either direction, first candidate in
/// ranked order. Unresolved names are dropped and duplicates collapsed. When
/// nothing resolves, every supplied id is returned.
pub fn resolve_record_ids(names: &[String], ranked: &[RankedResult]) -> Vec<RecordId> {
    let candidates: Vec<(RecordId, String)> = ranked
        .iter()
        .map(|r| (r.record.id, r.record.name.trim().to_lowercase()))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let mut resolved: Vec<RecordId> = Vec::new();
    for name in names {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            continue;
        }
        let hit = candidates
            .iter()
            .find(|(_, c)| *c == wanted)
            .or_else(|| {
                candidates
                    .iter()
                    .find(|(_, c)| c.contains(&wanted) || wanted.contains(c.as_str()))
            })
            .map(|(id, _)| *id);
        if let Some(id) = hit {
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        }
    }

    if resolved.is_empty() {
        ranked.iter().map(|r| r.record.id).collect()
    } else {
        resolved
    }
}
