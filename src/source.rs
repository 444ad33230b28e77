//! Raw source loading with cache revalidation
//!
//! A load consults the timed cache first and only reaches for the network on
//! a miss or an expired entry. When a refetch comes back byte-identical to
//! the expired copy, the result is still tagged `ContentFrom::Cache`: the
//! round trip confirmed that nothing changed, and downstream consumers may
//! keep trusting output derived from it.

use crate::cache::{cache_key, CacheStatus, JitteredTtl, Namespace, TimedCache};
use crate::error::InsetResult;
use crate::store::KeyValueStore;
use crate::transport::{Method, Transport};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Where a piece of content was served from
///
/// The render cache keys its own freshness off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFrom {
    Cache,
    Source,
}

/// Loaded content with its provenance tag
#[derive(Debug, Clone)]
pub struct Content {
    pub data: String,
    pub from: ContentFrom,
}

/// Resolves raw content for a source URL through the timed cache
pub struct SourceLoader {
    cache: TimedCache,
    transport: Arc<dyn Transport>,
    prefix: String,
    ttl: JitteredTtl,
}

impl SourceLoader {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        prefix: &str,
    ) -> Self {
        Self {
            cache: TimedCache::new(store),
            transport,
            prefix: prefix.to_string(),
            ttl: JitteredTtl::source_default(),
        }
    }

    /// Load the content behind `url`, revalidating an expired cache entry
    ///
    /// A network failure propagates without touching the cache.
    pub async fn load(&self, url: &str) -> InsetResult<Content> {
        let key = cache_key(&self.prefix, Namespace::Source, url);
        let status = self
            .cache
            .read(&key, |written| self.ttl.is_expired(written, Utc::now()));

        match status {
            CacheStatus::Valid(data) => {
                debug!("Source {} served from cache", url);
                Ok(Content {
                    data,
                    from: ContentFrom::Cache,
                })
            }
            CacheStatus::NotPresent => {
                let body = self.fetch(url).await?;
                self.cache.write(&key, &body)?;
                Ok(Content {
                    data: body,
                    from: ContentFrom::Source,
                })
            }
            CacheStatus::Expired(stale) => {
                let body = self.fetch(url).await?;
                let from = if body == stale {
                    debug!("Source {} unchanged after revalidation", url);
                    ContentFrom::Cache
                } else {
                    ContentFrom::Source
                };
                // refresh the timestamp even when the bytes did not change
                self.cache.write(&key, &body)?;
                Ok(Content { data: body, from })
            }
        }
    }

    async fn fetch(&self, url: &str) -> InsetResult<String> {
        let response = self
            .transport
            .request(Method::Get, url, &[("Content-type", "text/plain")], None)
            .await?;
        Ok(response.body)
    }
}
