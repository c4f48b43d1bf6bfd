use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A typed field value as exposed by the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Select(Option<String>),
    MultiSelect(Vec<String>),
    /// Rich text arrives as a list of plain-text segments.
    RichText(Vec<String>),
    Date(Option<String>),
    Url(Option<String>),
    Null,
}

impl FieldValue {
    /// Single text value, `None` when the field is empty.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            Self::Text(s) => s.clone(),
            Self::Select(s) | Self::Date(s) | Self::Url(s) => s.clone()?,
            Self::RichText(segments) => segments.concat(),
            Self::MultiSelect(values) => values.join(", "),
            Self::Null => return None,
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Multi-value view. Single values become a one-element list.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            Self::MultiSelect(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect(),
            other => other.as_text().into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::MultiSelect(values) => values.iter().all(|v| v.trim().is_empty()),
            other => other.as_text().is_none(),
        }
    }
}

/// A record as fetched from the content source: a stable id plus opaque
/// named fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub external_id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
