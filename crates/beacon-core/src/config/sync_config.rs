use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Content source and reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Endpoint of the paginated content source. `None` disables HTTP sync.
    pub source_url: Option<String>,
    /// Environment variable holding the source bearer token.
    pub api_key_env: String,
    /// Records requested per source page.
    pub page_size: usize,
    /// Request timeout for each source page.
    pub timeout_secs: u64,
    /// Publish an empty fetch over a populated store.
    pub allow_empty_replace: bool,
    /// Extra source field names per target field, tried before the built-in names.
    pub field_aliases: BTreeMap<String, Vec<String>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            api_key_env: defaults::DEFAULT_SOURCE_API_KEY_ENV.to_string(),
            page_size: defaults::DEFAULT_SOURCE_PAGE_SIZE,
            timeout_secs: defaults::DEFAULT_SOURCE_TIMEOUT_SECS,
            allow_empty_replace: defaults::DEFAULT_ALLOW_EMPTY_REPLACE,
            field_aliases: BTreeMap::new(),
        }
    }
}
