//! Timed cache over the key/value store
//!
//! Each entry is one JSON record `{"date": <epoch millis>, "data": <value>}`
//! under one string key. Expiry is judged at read time by a caller-supplied
//! predicate; an entry judged expired is removed from the store before its
//! stale value is handed back, so it is never served as `Expired` twice.
//!
//! The source namespace uses [`JitteredTtl`]: a fresh random grace window is
//! drawn on every check, so independent clients holding the same entry do
//! not all expire it at the same wall-clock instant.

use crate::error::InsetResult;
use crate::store::KeyValueStore;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Key namespace separating raw source from rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Source,
    Rendered,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Source => "src",
            Namespace::Rendered => "markdown",
        }
    }
}

/// Build the store key for a `(prefix, namespace, identifier)` triple
///
/// Layout is part of the persisted-state format: `<prefix>_src_<id>` and
/// `<prefix>_markdown_<id>`.
pub fn cache_key(prefix: &str, namespace: Namespace, id: &str) -> String {
    format!("{}_{}_{}", prefix, namespace.as_str(), id)
}

/// Outcome of a cache read
///
/// `Expired` keeps the stale value so the loader can compare it against a
/// fresh fetch during revalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    NotPresent,
    Valid(String),
    Expired(String),
}

/// Persisted cache record
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    date: i64,
    data: String,
}

/// TTL policy with a per-check random grace window
///
/// An entry is expired when `now - written_at > base + jitter` where jitter
/// is redrawn uniformly from `[0, jitter_max)` on every call. Two checks of
/// the same entry at the same instant may disagree while the elapsed time
/// sits inside the jitter window.
#[derive(Debug, Clone, Copy)]
pub struct JitteredTtl {
    base: Duration,
    jitter_max: Duration,
}

impl JitteredTtl {
    pub fn new(base: Duration, jitter_max: Duration) -> Self {
        Self { base, jitter_max }
    }

    /// Policy for raw source entries: 10 hours plus up to 100 minutes
    pub fn source_default() -> Self {
        Self::new(Duration::hours(10), Duration::minutes(100))
    }

    pub fn is_expired(&self, written_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let jitter_ms = rand::thread_rng().gen_range(0..self.jitter_max.num_milliseconds().max(1));
        now - written_at > self.base + Duration::milliseconds(jitter_ms)
    }
}

/// Get/set/invalidate over the key/value store with timestamped entries
pub struct TimedCache {
    store: Arc<dyn KeyValueStore>,
}

impl TimedCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read and decode an entry, judging freshness with `is_expired`
    ///
    /// Malformed records are indistinguishable from absent ones. An expired
    /// entry is removed before its stale value is returned.
    pub fn read(&self, key: &str, is_expired: impl Fn(DateTime<Utc>) -> bool) -> CacheStatus {
        let Some(raw) = self.store.get(key) else {
            return CacheStatus::NotPresent;
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Ignoring malformed cache entry {}: {}", key, e);
                return CacheStatus::NotPresent;
            }
        };

        let Some(written_at) = Utc.timestamp_millis_opt(entry.date).single() else {
            debug!("Ignoring cache entry {} with out-of-range timestamp", key);
            return CacheStatus::NotPresent;
        };

        if is_expired(written_at) {
            debug!("Cache entry {} expired", key);
            self.store.remove(key);
            return CacheStatus::Expired(entry.data);
        }

        CacheStatus::Valid(entry.data)
    }

    /// Store a value under `key` with the current timestamp
    pub fn write(&self, key: &str, value: &str) -> InsetResult<()> {
        let entry = CacheEntry {
            date: Utc::now().timestamp_millis(),
            data: value.to_string(),
        };
        self.store.set(key, &serde_json::to_string(&entry)?);
        Ok(())
    }
}
