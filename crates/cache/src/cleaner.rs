//! Expired-entry cleanup background task
//!
//! CacheCleaner runs in a background thread and periodically sweeps expired
//! entries out of a [`TtlCache`]. Reads already ignore expired entries, so
//! the cleaner only bounds memory; it never changes what callers observe.
//!
//! - Sleeps first, sweeps after each full interval
//! - Polls the shutdown flag at least every 100ms
//! - Graceful shutdown via atomic flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::TtlCache;

/// Shortest sweep interval; shorter requests are raised to this
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(10);

/// Background sweeper for a shared [`TtlCache`]
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use collstore_cache::{CacheCleaner, TtlCache};
///
/// let cache: Arc<TtlCache<String>> = Arc::new(TtlCache::default());
/// let cleaner = CacheCleaner::new(Arc::clone(&cache), Duration::from_secs(60));
/// let handle = cleaner.start();
///
/// cleaner.shutdown();
/// handle.join().unwrap();
/// ```
pub struct CacheCleaner<V> {
    cache: Arc<TtlCache<V>>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl<V> CacheCleaner<V>
where
    V: Clone + Send + 'static,
{
    /// Create a cleaner sweeping `cache` every `interval`
    ///
    /// Intervals below [`MIN_CLEANUP_INTERVAL`], zero included, are clamped
    /// up to it.
    pub fn new(cache: Arc<TtlCache<V>>, interval: Duration) -> Self {
        Self {
            cache,
            interval: interval.max(MIN_CLEANUP_INTERVAL),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the sweeper thread
    ///
    /// The thread runs until [`CacheCleaner::shutdown`] is called.
    pub fn start(&self) -> JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;

        info!(target: "collstore::cache", interval_secs = interval.as_secs(), "Cache cleaner started");

        thread::spawn(move || {
            let poll = Duration::from_millis(100).min(interval);

            while !shutdown.load(Ordering::Relaxed) {
                let mut elapsed = Duration::ZERO;
                while elapsed < interval {
                    if shutdown.load(Ordering::Relaxed) {
                        debug!(target: "collstore::cache", "Cache cleaner stopped");
                        return;
                    }
                    thread::sleep(poll);
                    elapsed += poll;
                }

                cache.cleanup_expired();
            }
            debug!(target: "collstore::cache", "Cache cleaner stopped");
        })
    }

    /// Effective sweep interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Signal the thread to exit on its next poll
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Check if shutdown has been signaled
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
