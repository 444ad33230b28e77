//! Rendered-output cache for Markdown conversion
//!
//! Conversion goes through a remote rendering endpoint, so the result is
//! cached alongside the raw source. Freshness of a rendered entry is not a
//! matter of elapsed time: it is delegated entirely to the provenance tag of
//! the source it was derived from. A source served fresh from the network
//! forces a re-render even if a rendered entry exists, because stale
//! rendered HTML must never outlive the source it came from.
//!
//! Render failures degrade to user-visible fallback text instead of erroring
//! the pipeline.

use crate::cache::{cache_key, CacheStatus, Namespace, TimedCache};
use crate::error::InsetResult;
use crate::source::{Content, ContentFrom};
use crate::store::KeyValueStore;
use crate::transport::{Method, Transport};
use std::sync::Arc;
use tracing::debug;

/// Default Markdown rendering endpoint
pub const RENDER_ENDPOINT: &str = "https://api.github.com/markdown/raw";

/// Fallback text when the endpoint reports a rate limit (HTTP 403)
pub const RATE_LIMIT_MESSAGE: &str =
    "Cannot convert markdown to html, because API rate limit exceeded";

/// Fallback text for any other render failure
pub const RENDER_FAILURE_MESSAGE: &str = "Cannot convert markdown to html";

/// Caches rendered HTML, gated by source provenance
pub struct RenderCache {
    cache: TimedCache,
    transport: Arc<dyn Transport>,
    prefix: String,
    endpoint: String,
}

impl RenderCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        prefix: &str,
    ) -> Self {
        Self {
            cache: TimedCache::new(store),
            transport,
            prefix: prefix.to_string(),
            endpoint: RENDER_ENDPOINT.to_string(),
        }
    }

    /// Override the rendering endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Render `content` to HTML, keyed under `source_id`
    ///
    /// The cached rendering is consulted only when the source came from
    /// cache, and is then trusted regardless of its age. Degraded results
    /// (rate limit, conversion failure) come back as `Ok` fallback text and
    /// are never written to the cache.
    pub async fn render(&self, content: &Content, source_id: &str) -> InsetResult<String> {
        let key = cache_key(&self.prefix, Namespace::Rendered, source_id);

        if content.from == ContentFrom::Cache {
            if let CacheStatus::Valid(html) = self.cache.read(&key, |_| false) {
                debug!("Rendered output for {} served from cache", source_id);
                return Ok(html);
            }
        }

        let headers = [
            ("Content-type", "text/plain"),
            ("Accept", "application/vnd.github.v3+json"),
        ];
        let response = match self
            .transport
            .request(Method::Post, &self.endpoint, &headers, Some(&content.data))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("Render request failed: {}", e);
                return Ok(RENDER_FAILURE_MESSAGE.to_string());
            }
        };

        if response.status == 403 {
            debug!("Render endpoint rate limited");
            return Ok(RATE_LIMIT_MESSAGE.to_string());
        }
        if !(200..300).contains(&response.status) {
            debug!("Render endpoint returned status {}", response.status);
            return Ok(RENDER_FAILURE_MESSAGE.to_string());
        }

        self.cache.write(&key, &response.body)?;
        Ok(response.body)
    }
}
