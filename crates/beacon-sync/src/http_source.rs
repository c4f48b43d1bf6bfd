//! Paginated JSON content source over HTTP.
//!
//! Each page is `{ "results": [RawRecord], "has_more": bool, "next_cursor": string? }`.
//! Cursors are followed until `has_more` is false; a failure on any page
//! fails the whole fetch so the reconciler never sees a partial set.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::config::SyncConfig;
use beacon_core::errors::{BeaconResult, ConfigError, SourceError};
use beacon_core::models::RawRecord;
use beacon_core::traits::IContentSource;
use serde::Deserialize;
use tracing::debug;

/// One page of the source response.
#[derive(Debug, Deserialize)]
pub(crate) struct SourcePage {
    #[serde(default)]
    pub results: Vec<RawRecord>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl SourcePage {
    /// The cursor of the following page, `None` when this is the last one.
    fn next(&self) -> Result<Option<String>, SourceError> {
        if !self.has_more {
            return Ok(None);
        }
        match self.next_cursor.as_deref().map(str::trim) {
            Some(cursor) if !cursor.is_empty() => Ok(Some(cursor.to_string())),
            _ => Err(SourceError::Malformed {
                reason: "has_more is true but next_cursor is missing".to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct HttpContentSource {
    client: reqwest::Client,
    url: String,
    bearer_token: Option<String>,
    page_size: usize,
}

impl HttpContentSource {
    pub fn new(
        url: impl Into<String>,
        bearer_token: Option<String>,
        page_size: usize,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| SourceError::Unreachable {
                reason: format!("client setup failed: {e}"),
            })?;
        Ok(Self {
            client,
            url: url.into(),
            bearer_token,
            page_size: page_size.max(1),
        })
    }

    /// Build from `[sync]` config. The bearer token is read from the
    /// environment variable named by `api_key_env`, if set.
    pub fn from_config(config: &SyncConfig) -> BeaconResult<Self> {
        let url = config
            .source_url
            .clone()
            .ok_or_else(|| ConfigError::ValidationFailed {
                field: "sync.source_url".to_string(),
                message: "required for the HTTP content source".to_string(),
            })?;
        let token = std::env::var(&config.api_key_env).ok();
        Ok(Self::new(
            url,
            token,
            config.page_size,
            Duration::from_secs(config.timeout_secs),
        )?)
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<SourcePage, SourceError> {
        let mut req = self
            .client
            .get(&self.url)
            .query(&[("page_size", self.page_size.to_string())]);
        if let Some(cursor) = cursor {
            req = req.query(&[("cursor", cursor)]);
        }
        if let Some(ref token) = self.bearer_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| SourceError::Unreachable {
            reason: e.to_string(),
        })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await.map_err(|e| SourceError::Unreachable {
            reason: format!("reading response body: {e}"),
        })?;
        parse_page(&bytes)
    }
}

pub(crate) fn parse_page(bytes: &[u8]) -> Result<SourcePage, SourceError> {
    serde_json::from_slice(bytes).map_err(|e| SourceError::Malformed {
        reason: e.to_string(),
    })
}

#[async_trait]
impl IContentSource for HttpContentSource {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut visited = HashSet::new();

        loop {
            let page = self.fetch_page(cursor.as_deref()).await?;
            debug!(
                url = %self.url,
                page_records = page.results.len(),
                has_more = page.has_more,
                "content page fetched"
            );
            let next = page.next()?;
            records.extend(page.results);

            match next {
                Some(next) => {
                    if !visited.insert(next.clone()) {
                        return Err(SourceError::Malformed {
                            reason: format!("cursor `{next}` repeated"),
                        });
                    }
                    cursor = Some(next);
                }
                None => break,
            }
        }

        Ok(records)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_has_no_next_cursor() {
        let page = parse_page(br#"{"results": [], "has_more": false}"#).unwrap();
        assert_eq!(page.next().unwrap(), None);
    }

    #[test]
    fn page_with_more_yields_cursor() {
        let page = parse_page(
            br#"{"results": [{"external_id": "a", "fields": {"Name": {"type": "text", "value": "A"}}}],
                 "has_more": true, "next_cursor": "c2"}"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].external_id, "a");
        assert_eq!(page.next().unwrap(), Some("c2".to_string()));
    }

    #[test]
    fn has_more_without_cursor_is_malformed() {
        let page = parse_page(br#"{"results": [], "has_more": true}"#).unwrap();
        assert!(matches!(page.next(), Err(SourceError::Malformed { .. })));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            parse_page(b"<html>gateway timeout</html>"),
            Err(SourceError::Malformed { .. })
        ));
    }

    #[test]
    fn from_config_requires_url() {
        let err = HttpContentSource::from_config(&SyncConfig::default()).unwrap_err();
        assert!(err.to_string().contains("sync.source_url"));
    }

    #[tokio::test]
    async fn unreachable_host_fails_whole_fetch() {
        let source = HttpContentSource::new(
            "http://127.0.0.1:9/records",
            None,
            10,
            Duration::from_millis(500),
        )
        .unwrap();
        let err = source.fetch_all().await.unwrap_err();
        assert!(matches!(err, SourceError::Unreachable { .. }));
    }
}
