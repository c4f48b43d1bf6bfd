//! Declarative field-mapping table from raw source fields to record drafts.
//!
//! Each target field lists the source field names it may arrive under. The
//! first candidate present with a non-empty value wins; field names compare
//! case-insensitively. Config aliases are tried before the built-in names.

use std::collections::BTreeMap;
use std::str::FromStr;

use beacon_core::errors::MappingError;
use beacon_core::models::raw_record::FieldValue;
use beacon_core::models::{RawRecord, RecordDraft, TagSet, Visibility};
use chrono::{DateTime, NaiveDate, Utc};

/// The record field a [`FieldSpec`] fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldTarget {
    Name,
    Category,
    ProductTags,
    AudienceTags,
    SolutionTags,
    Stage,
    Visibility,
    Summary,
    Body,
    Link,
    UpdatedAt,
}

impl FieldTarget {
    pub const ALL: [FieldTarget; 11] = [
        Self::Name,
        Self::Category,
        Self::ProductTags,
        Self::AudienceTags,
        Self::SolutionTags,
        Self::Stage,
        Self::Visibility,
        Self::Summary,
        Self::Body,
        Self::Link,
        Self::UpdatedAt,
    ];

    /// Key used for this target in `sync.field_aliases`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::ProductTags => "product",
            Self::AudienceTags => "audience",
            Self::SolutionTags => "solution",
            Self::Stage => "stage",
            Self::Visibility => "visibility",
            Self::Summary => "summary",
            Self::Body => "body",
            Self::Link => "link",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn builtin_candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Name => &["Name", "Title", "Resource Name"],
            Self::Category => &["Type", "Category", "Resource Type", "Content Type"],
            Self::ProductTags => &["Product", "Products", "Product Tags"],
            Self::AudienceTags => &["Audience", "Audiences", "Persona", "Audience Tags"],
            Self::SolutionTags => &["Solution", "Solutions", "Solution Tags"],
            Self::Stage => &["Stage", "Lifecycle Stage", "Funnel Stage"],
            Self::Visibility => &["Visibility", "Internal/External", "Access"],
            Self::Summary => &["Summary", "Description", "Abstract"],
            Self::Body => &["Body", "Content", "Full Text"],
            Self::Link => &["Link", "URL", "File", "Asset Link"],
            Self::UpdatedAt => &["Last Updated", "Updated", "Last Edited", "Date"],
        }
    }

    fn default_requirement(&self) -> Requirement {
        match self {
            Self::Name => Requirement::Required,
            _ => Requirement::Optional,
        }
    }
}

/// Whether a missing target field is an error or takes its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

/// One row of the mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub target: FieldTarget,
    pub candidates: Vec<String>,
    pub requirement: Requirement,
}

/// The resolved mapping table. Build once per reconciliation.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    specs: BTreeMap<FieldTarget, FieldSpec>,
}

impl FieldMapping {
    /// Built-in candidate names only.
    pub fn builtin() -> Self {
        Self::with_aliases(&BTreeMap::new())
    }

    /// Built-in candidates with `aliases[target.key()]` prepended.
    /// Unknown alias keys are ignored.
    pub fn with_aliases(aliases: &BTreeMap<String, Vec<String>>) -> Self {
        let specs = FieldTarget::ALL
            .iter()
            .map(|&target| {
                let mut candidates: Vec<String> =
                    aliases.get(target.key()).cloned().unwrap_or_default();
                for name in target.builtin_candidates() {
                    if !candidates.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                        candidates.push((*name).to_string());
                    }
                }
                let spec = FieldSpec {
                    target,
                    candidates,
                    requirement: target.default_requirement(),
                };
                (target, spec)
            })
            .collect();
        Self { specs }
    }

    pub fn spec(&self, target: FieldTarget) -> Option<&FieldSpec> {
        self.specs.get(&target)
    }

    /// Map one raw record. Any error means the record is skipped.
    pub fn map(&self, raw: &RawRecord) -> Result<RecordDraft, MappingError> {
        let external_id = raw.external_id.trim();
        if external_id.is_empty() {
            return Err(MappingError::EmptyExternalId);
        }
        let external_id = external_id.to_string();

        let name = match self.text(raw, FieldTarget::Name) {
            Some(name) => name,
            None => {
                let candidates = self
                    .spec(FieldTarget::Name)
                    .map(|s| s.candidates.join(", "))
                    .unwrap_or_default();
                return Err(MappingError::MissingField {
                    external_id,
                    field: FieldTarget::Name.key().to_string(),
                    candidates,
                });
            }
        };

        let visibility = match self.text(raw, FieldTarget::Visibility) {
            Some(literal) => {
                Visibility::from_str(&literal).map_err(|e| MappingError::InvalidValue {
                    external_id: external_id.clone(),
                    field: FieldTarget::Visibility.key().to_string(),
                    reason: e.to_string(),
                })?
            }
            None => Visibility::default(),
        };

        let updated_at = match self.text(raw, FieldTarget::UpdatedAt) {
            Some(literal) => {
                Some(parse_date(&literal).ok_or_else(|| MappingError::InvalidValue {
                    external_id: external_id.clone(),
                    field: FieldTarget::UpdatedAt.key().to_string(),
                    reason: format!("unparsable date `{literal}`"),
                })?)
            }
            None => None,
        };

        Ok(RecordDraft {
            name,
            category: self.text(raw, FieldTarget::Category).unwrap_or_default(),
            tags: TagSet {
                product: self.list(raw, FieldTarget::ProductTags),
                audience: self.list(raw, FieldTarget::AudienceTags),
                solution: self.list(raw, FieldTarget::SolutionTags),
            },
            stage: self.text(raw, FieldTarget::Stage).unwrap_or_default(),
            visibility,
            summary: self.text(raw, FieldTarget::Summary).unwrap_or_default(),
            body: self.text(raw, FieldTarget::Body),
            link: self.text(raw, FieldTarget::Link).unwrap_or_default(),
            updated_at,
            external_id,
        })
    }

    /// First candidate field present with a non-empty value.
    fn resolve<'a>(&self, raw: &'a RawRecord, target: FieldTarget) -> Option<&'a FieldValue> {
        let spec = self.specs.get(&target)?;
        spec.candidates.iter().find_map(|candidate| {
            raw.fields
                .iter()
                .find(|(name, value)| name.eq_ignore_ascii_case(candidate) && !value.is_empty())
                .map(|(_, value)| value)
        })
    }

    fn text(&self, raw: &RawRecord, target: FieldTarget) -> Option<String> {
        self.resolve(raw, target).and_then(FieldValue::as_text)
    }

    fn list(&self, raw: &RawRecord, target: FieldTarget) -> Vec<String> {
        self.resolve(raw, target)
            .map(FieldValue::as_list)
            .unwrap_or_default()
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::builtin()
    }
}

/// RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_date(literal: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(literal) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
