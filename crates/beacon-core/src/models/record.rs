use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Internal record id. Assigned by the store, never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a record may be shown to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Internal,
    External,
    #[default]
    Both,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Both => "both",
        }
    }

    /// Whether a record with this visibility may be shown to `audience`.
    ///
    /// `Both` as an audience sees everything; `Both` as a record visibility is
    /// seen by every audience.
    pub fn is_visible_to(&self, audience: Visibility) -> bool {
        match audience {
            Visibility::Both => true,
            _ => *self == Visibility::Both || *self == audience,
        }
    }
}

impl FromStr for Visibility {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "internal" | "internal only" => Ok(Self::Internal),
            "external" | "external only" | "public" => Ok(Self::External),
            "both" | "all" | "internal & external" | "internal and external" => Ok(Self::Both),
            other => Err(ValidationError::UnknownVisibility {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tag lists a record carries. Each list defaults to empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSet {
    pub product: Vec<String>,
    pub audience: Vec<String>,
    pub solution: Vec<String>,
}

impl TagSet {
    /// All tags across every list, in list order.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.product
            .iter()
            .chain(self.audience.iter())
            .chain(self.solution.iter())
    }

    /// Case-insensitive membership across every list.
    pub fn contains(&self, tag: &str) -> bool {
        self.iter().any(|t| t.eq_ignore_ascii_case(tag.trim()))
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_empty() && self.audience.is_empty() && self.solution.is_empty()
    }
}

/// Which usage counter to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    View,
    Download,
    Share,
}

/// Point-in-time read of a record's usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageCounts {
    pub views: u64,
    pub downloads: u64,
    pub shares: u64,
}

impl UsageCounts {
    /// Popularity: the sum of all three counters.
    pub fn total(&self) -> u64 {
        self.views
            .saturating_add(self.downloads)
            .saturating_add(self.shares)
    }
}

/// A record's content as produced by the reconciler, before the store
/// assigns an id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub external_id: String,
    pub name: String,
    pub category: String,
    pub tags: TagSet,
    pub stage: String,
    pub visibility: Visibility,
    pub summary: String,
    pub body: Option<String>,
    pub link: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A content item held by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub external_id: String,
    pub name: String,
    pub category: String,
    pub tags: TagSet,
    pub stage: String,
    pub visibility: Visibility,
    pub summary: String,
    pub body: Option<String>,
    pub link: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_synced: DateTime<Utc>,
    pub usage: UsageCounts,
}

impl Record {
    /// Build a record from a draft. Usage counters start at zero; the store
    /// overlays the live counters on read.
    pub fn from_draft(id: RecordId, draft: RecordDraft, synced_at: DateTime<Utc>) -> Self {
        Self {
            id,
            external_id: draft.external_id,
            name: draft.name,
            category: draft.category,
            tags: draft.tags,
            stage: draft.stage,
            visibility: draft.visibility,
            summary: draft.summary,
            body: draft.body,
            link: draft.link,
            updated_at: draft.updated_at,
            last_synced: synced_at,
            usage: UsageCounts::default(),
        }
    }

    /// The content fields of this record as a draft.
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            external_id: self.external_id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            stage: self.stage.clone(),
            visibility: self.visibility,
            summary: self.summary.clone(),
            body: self.body.clone(),
            link: self.link.clone(),
            updated_at: self.updated_at,
        }
    }

    /// Long-form text, falling back to the summary when no body is present.
    pub fn long_text(&self) -> &str {
        match self.body.as_deref() {
            Some(body) if !body.trim().is_empty() => body,
            _ => &self.summary,
        }
    }
}
