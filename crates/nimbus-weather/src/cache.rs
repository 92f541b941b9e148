//! In-memory weather cache with lazy per-key expiry.
//!
//! Fresh hits are served under a shared read lock. Anything that has to talk
//! to the source runs while holding a per-location async lock, so the
//! evict/fetch/insert sequence for one location never interleaves with
//! another operation on the same location.

use crate::clock::{Clock, SystemClock};
use crate::provider::WeatherSource;
use crate::types::WeatherRecord;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug)]
pub struct WeatherCache<S> {
    source: S,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, WeatherRecord>>,
    key_locks: Mutex<HashMap<String, KeyLock>>,
}

/// Per-location lock plus the number of guards holding or waiting on it.
#[derive(Debug, Default)]
struct KeyLock {
    mutex: Arc<AsyncMutex<()>>,
    users: usize,
}

/// Exclusive access to one location; the lock entry is dropped with its last user.
struct KeyGuard<'a> {
    key_locks: &'a Mutex<HashMap<String, KeyLock>>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.key_locks.lock();
        if let Some(lock) = locks.get_mut(&self.key) {
            lock.users = lock.users.saturating_sub(1);
            if lock.users == 0 {
                locks.remove(&self.key);
            }
        }
    }
}

impl<S: WeatherSource> WeatherCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            entries: RwLock::new(HashMap::new()),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Current weather for `location`, served from cache while fresh.
    ///
    /// A missing or stale entry costs exactly one source fetch. Whatever the
    /// source returns replaces the entry; `None` leaves the location uncached.
    pub async fn get_weather_info(&self, location: &str) -> Option<WeatherRecord> {
        if let Some(record) = self.fresh_entry(location) {
            tracing::debug!("Weather cache hit for {}", location);
            return Some(record);
        }

        let _guard = self.lock_key(location).await;

        // Another caller may have refreshed this location while we waited.
        let cached = self.entries.read().get(location).cloned();
        match cached {
            Some(record) if !record.is_expired_at(self.clock.now()) => {
                tracing::debug!("Weather cache hit for {} after wait", location);
                return Some(record);
            }
            Some(record) => {
                tracing::info!(
                    "Cached weather for {} expired at {}, refreshing",
                    location,
                    record.expires_at()
                );
                self.entries.write().remove(location);
            }
            None => tracing::debug!("Weather cache miss for {}", location),
        }

        let fetched = self.source.fetch(location).await;
        match &fetched {
            Some(record) => {
                self.entries
                    .write()
                    .insert(location.to_string(), record.clone());
            }
            None => tracing::debug!("No weather data for {}", location),
        }
        fetched
    }

    /// Drop the cached entry for `location`, if any.
    pub async fn remove_weather_info(&self, location: &str) {
        let _guard = self.lock_key(location).await;
        if self.entries.write().remove(location).is_some() {
            tracing::debug!("Removed cached weather for {}", location);
        }
    }

    /// Whether an entry is held for `location`, fresh or stale.
    pub fn contains(&self, location: &str) -> bool {
        self.entries.read().contains_key(location)
    }

    /// Number of held entries, including stale ones not yet looked up.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry. A refresh already in flight may still store its result.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn fresh_entry(&self, location: &str) -> Option<WeatherRecord> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(location)
            .filter(|record| !record.is_expired_at(now))
            .cloned()
    }

    async fn lock_key(&self, location: &str) -> KeyGuard<'_> {
        let mutex = {
            let mut locks = self.key_locks.lock();
            let lock = locks.entry(location.to_string()).or_default();
            lock.users += 1;
            lock.mutex.clone()
        };

        // Registered before waiting, so a cancelled wait still releases its slot.
        let mut key_guard = KeyGuard {
            key_locks: &self.key_locks,
            key: location.to_string(),
            guard: None,
        };
        key_guard.guard = Some(mutex.lock_owned().await);
        key_guard
    }
}
