//! Listing filter and sort order.

use std::fmt;
use std::str::FromStr;

use beacon_core::errors::ValidationError;
use beacon_core::models::{Record, Visibility};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Name hits, then summary hits, then body hits; store order otherwise.
    #[default]
    Relevance,
    /// Sum of usage counters, highest first.
    Popularity,
    Newest,
    Oldest,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Popularity => "popularity",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }
}

impl FromStr for SortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "relevance" => Ok(Self::Relevance),
            "popularity" | "popular" => Ok(Self::Popularity),
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            other => Err(ValidationError::UnknownSort {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criteria for a listing. Every unset criterion matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceFilter {
    /// Record type (category), case-insensitive equality.
    pub record_type: Option<String>,
    /// Every tag must appear in some tag list, case-insensitive.
    pub tags: Vec<String>,
    /// `Internal` matches internal and both; `External` matches external and
    /// both; `Both` matches everything.
    pub audience: Option<Visibility>,
    /// Case-insensitive substring over name, summary and body.
    pub text: Option<String>,
    pub exclude_external_ids: Vec<String>,
    pub sort_by: SortBy,
}

impl ResourceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn audience(mut self, audience: Visibility) -> Self {
        self.audience = Some(audience);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn exclude(mut self, external_id: impl Into<String>) -> Self {
        self.exclude_external_ids.push(external_id.into());
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Lower-cased search text, `None` when absent or blank.
    pub(crate) fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    pub(crate) fn matches(&self, record: &Record, needle: Option<&str>) -> bool {
        if let Some(wanted) = self.record_type.as_deref().map(str::trim) {
            if !wanted.is_empty() && !record.category.trim().eq_ignore_ascii_case(wanted) {
                return false;
            }
        }
        if !self
            .tags
            .iter()
            .filter(|t| !t.trim().is_empty())
            .all(|t| record.tags.contains(t))
        {
            return false;
        }
        if let Some(audience) = self.audience {
            if !record.visibility.is_visible_to(audience) {
                return false;
            }
        }
        if self
            .exclude_external_ids
            .iter()
            .any(|id| id == &record.external_id)
        {
            return false;
        }
        match needle {
            Some(needle) => text_rank(record, needle).is_some(),
            None => true,
        }
    }
}

/// 0 for a name hit, 1 for a summary hit, 2 for a body hit.
pub(crate) fn text_rank(record: &Record, needle: &str) -> Option<u8> {
    if record.name.to_lowercase().contains(needle) {
        Some(0)
    } else if record.summary.to_lowercase().contains(needle) {
        Some(1)
    } else if record
        .body
        .as_deref()
        .is_some_and(|b| b.to_lowercase().contains(needle))
    {
        Some(2)
    } else {
        None
    }
}
