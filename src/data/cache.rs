//! Time-bounded memoization of provider responses.
//!
//! Entries are keyed by the exact `(keywords, timeframe, region, language)`
//! tuple. The share transforms never see the cache; it only sits in front of a
//! `RawSeriesProvider`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::data::provider::{FetchRequest, RawSeriesProvider};
use crate::domain::InterestSeries;
use crate::error::AppError;

/// Default time-to-live for cached responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub keywords: Vec<String>,
    pub timeframe: String,
    pub region: String,
    pub language: String,
}

impl From<&FetchRequest> for CacheKey {
    fn from(req: &FetchRequest) -> Self {
        Self {
            keywords: req.keywords.as_slice().to_vec(),
            timeframe: req.timeframe(),
            region: req.region.clone(),
            language: req.language.clone(),
        }
    }
}

struct CacheEntry {
    fetched_at: Instant,
    series: InterestSeries,
}

/// A provider wrapper that reuses responses younger than `ttl`.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<P: RawSeriesProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of entries currently held (expired ones included until the next miss).
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry older than the TTL. Every cache miss does this too.
    pub fn evict_expired(&self) {
        if let Ok(mut map) = self.entries.lock() {
            let ttl = self.ttl;
            map.retain(|_, e| e.fetched_at.elapsed() < ttl);
        }
    }
}

impl<P: RawSeriesProvider> RawSeriesProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, request: &FetchRequest) -> Result<InterestSeries, AppError> {
        let key = CacheKey::from(request);
        {
            let map = self
                .entries
                .lock()
                .map_err(|_| AppError::new(4, "Provider cache lock poisoned."))?;
            if let Some(entry) = map.get(&key) {
                if entry.fetched_at.elapsed() < self.ttl {
                    tracing::debug!(timeframe = %key.timeframe, "provider cache hit");
                    return Ok(entry.series.clone());
                }
            }
        }

        tracing::debug!(provider = self.inner.name(), timeframe = %key.timeframe, "provider cache miss");
        let series = self.inner.fetch(request)?;

        let mut map = self
            .entries
            .lock()
            .map_err(|_| AppError::new(4, "Provider cache lock poisoned."))?;
        let ttl = self.ttl;
        map.retain(|_, e| e.fetched_at.elapsed() < ttl);
        map.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                series: series.clone(),
            },
        );
        Ok(series)
    }
}
