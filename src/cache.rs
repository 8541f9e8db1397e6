//! Single-slot, freshness-windowed headline cache.
//!
//! At most one pool of headlines is kept, tagged with the (category, country)
//! it was fetched for. A request for the same key inside the freshness window
//! is answered from memory; anything else goes to the [`HeadlineSource`].
//! A failed fetch never empties the cache: the caller gets whatever was there
//! before.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::locale::Category;
use crate::source::{Headline, HeadlineSource};

/// How long a fetched pool is served without refetching.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
struct PoolKey {
    category: Category,
    country: String,
}

struct CachePool {
    key: PoolKey,
    items: Arc<[Headline]>,
    fetched_at: Instant,
}

pub struct HeadlineCache {
    source: Arc<dyn HeadlineSource>,
    freshness: Duration,
    pool: Mutex<Option<CachePool>>,
}

impl HeadlineCache {
    pub fn new(source: Arc<dyn HeadlineSource>) -> Self {
        Self::with_freshness(source, FRESHNESS_WINDOW)
    }

    pub fn with_freshness(source: Arc<dyn HeadlineSource>, freshness: Duration) -> Self {
        Self {
            source,
            freshness,
            pool: Mutex::new(None),
        }
    }

    /// Headlines for `category` in `country`, from memory when fresh.
    ///
    /// Never fails. On a fetch error the previous pool is returned as-is
    /// (empty if there never was one).
    pub async fn ensure(&self, category: Category, country: &str) -> Arc<[Headline]> {
        let key = PoolKey {
            category,
            country: country.to_string(),
        };

        if let Some(items) = self.fresh(&key) {
            tracing::debug!(%category, country, "serving cached headlines");
            return items;
        }

        match self.source.fetch(category, country).await {
            Ok(list) => {
                tracing::info!(
                    %category,
                    country,
                    count = list.len(),
                    source = self.source.name(),
                    "fetched headlines"
                );
                let items: Arc<[Headline]> = list.into();
                *self.pool.lock() = Some(CachePool {
                    key,
                    items: Arc::clone(&items),
                    fetched_at: Instant::now(),
                });
                items
            }
            Err(e) => {
                tracing::warn!(%category, country, error = %e, "headline fetch failed, serving previous pool");
                self.snapshot()
            }
        }
    }

    /// Drop the current pool so the next `ensure` always fetches.
    pub fn invalidate(&self) {
        *self.pool.lock() = None;
    }

    /// Current pool contents without touching the network.
    pub fn snapshot(&self) -> Arc<[Headline]> {
        self.pool
            .lock()
            .as_ref()
            .map(|pool| Arc::clone(&pool.items))
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    fn fresh(&self, key: &PoolKey) -> Option<Arc<[Headline]>> {
        let pool = self.pool.lock();
        let pool = pool.as_ref()?;
        (pool.key == *key && pool.fetched_at.elapsed() < self.freshness)
            .then(|| Arc::clone(&pool.items))
    }
}
