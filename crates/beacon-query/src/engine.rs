//! ResourceQueryEngine: filter, sort and paginate the current store
//! snapshot.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use beacon_core::config::QueryConfig;
use beacon_core::errors::ValidationError;
use beacon_core::models::Record;
use beacon_storage::RecordStore;
use tracing::debug;

use crate::filter::{text_rank, ResourceFilter, SortBy};
use crate::page::Page;

/// Facet field names, in the order they are reported.
pub const FACET_FIELDS: [&str; 6] = ["type", "product", "audience", "solution", "stage", "visibility"];

pub struct ResourceQueryEngine {
    store: Arc<RecordStore>,
    max_page_size: usize,
}

impl ResourceQueryEngine {
    pub fn new(store: Arc<RecordStore>, config: &QueryConfig) -> Self {
        Self {
            store,
            max_page_size: config.max_page_size,
        }
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// One page of records matching `filter`, sorted by `filter.sort_by`.
    ///
    /// `page` is 1-based. A page past the end is empty with the real total.
    pub fn query(
        &self,
        filter: &ResourceFilter,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Record>, ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidPage);
        }
        if page_size == 0 || page_size > self.max_page_size {
            return Err(ValidationError::InvalidPageSize {
                page_size,
                max: self.max_page_size,
            });
        }

        let needle = filter.needle();
        let mut matched: Vec<Record> = self
            .store
            .all()
            .into_iter()
            .filter(|r| filter.matches(r, needle.as_deref()))
            .collect();
        sort_records(&mut matched, filter.sort_by, needle.as_deref());

        let total = matched.len();
        let start = (page - 1).saturating_mul(page_size);
        let items: Vec<Record> = matched.into_iter().skip(start).take(page_size).collect();

        debug!(
            total,
            page,
            page_size,
            returned = items.len(),
            sort = %filter.sort_by,
            "record listing"
        );
        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Distinct non-empty values of every filterable field across the store.
    pub fn facets(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut facets: BTreeMap<String, BTreeSet<String>> = FACET_FIELDS
            .iter()
            .map(|f| (f.to_string(), BTreeSet::new()))
            .collect();

        let snapshot = self.store.snapshot();
        for record in snapshot.records() {
            let mut add = |field: &str, value: &str| {
                let value = value.trim();
                if value.is_empty() {
                    return;
                }
                if let Some(values) = facets.get_mut(field) {
                    values.insert(value.to_string());
                }
            };
            add("type", &record.category);
            for tag in &record.tags.product {
                add("product", tag);
            }
            for tag in &record.tags.audience {
                add("audience", tag);
            }
            for tag in &record.tags.solution {
                add("solution", tag);
            }
            add("stage", &record.stage);
            add("visibility", record.visibility.as_str());
        }
        facets
    }
}

fn by_name(a: &Record, b: &Record) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Stable sort; equal keys keep store order.
fn sort_records(records: &mut [Record], sort_by: SortBy, needle: Option<&str>) {
    match sort_by {
        SortBy::Relevance => {
            if let Some(needle) = needle {
                records.sort_by_key(|r| text_rank(r, needle).unwrap_or(u8::MAX));
            }
        }
        SortBy::Popularity => records.sort_by(|a, b| {
            b.usage
                .total()
                .cmp(&a.usage.total())
                .then_with(|| by_name(a, b))
        }),
        SortBy::Newest => records.sort_by(|a, b| match (a.updated_at, b.updated_at) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| by_name(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => by_name(a, b),
        }),
        SortBy::Oldest => records.sort_by(|a, b| match (a.updated_at, b.updated_at) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| by_name(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => by_name(a, b),
        }),
    }
}
