//! Process-lifetime synthesis result cache.
//!
//! Maps a source identifier (the pagination start URL) to the file name of a
//! previously assembled audio artifact. Each key holds a fill-once cell, so
//! two concurrent requests for the same identifier perform at most one
//! synthesis: the second waits for the first's completed entry. A failed
//! fill leaves the key empty and retryable. Entries are never evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::Result;

/// In-memory mapping from source identifier to audio artifact file name,
/// with atomic reserve-then-fill semantics per key.
#[derive(Debug, Default)]
pub struct AudioCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl AudioCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached artifact file name for a completed synthesis, or
    /// `None` on a miss (including keys whose fill is still in progress).
    pub fn lookup(&self, source_id: &str) -> Option<String> {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        entries.get(source_id).and_then(|cell| cell.get().cloned())
    }

    /// Returns the artifact file name for `source_id`, running `synthesize`
    /// only if no completed entry exists.
    ///
    /// Concurrent callers with the same identifier share one fill; only the
    /// winner runs `synthesize`, the rest await its outcome.
    pub async fn get_or_synthesize<F, Fut>(&self, source_id: &str, synthesize: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let cell = {
            let mut entries = self.entries.lock().expect("cache mutex poisoned");
            entries.entry(source_id.to_string()).or_default().clone()
        };
        cell.get_or_try_init(synthesize).await.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditoError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_second_request_hits_cache() {
        let cache = AudioCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let name = cache
                .get_or_synthesize("https://example.com/book/1.html", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("20260101000000.mp3".to_string())
                })
                .await
                .unwrap();
            assert_eq!(name, "20260101000000.mp3");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_synthesize_separately() {
        let cache = AudioCache::new();
        let calls = AtomicUsize::new(0);

        for key in ["a", "b"] {
            cache
                .get_or_synthesize(key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(format!("{key}.mp3"))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.lookup("a").as_deref(), Some("a.mp3"));
        assert_eq!(cache.lookup("b").as_deref(), Some("b.mp3"));
    }

    #[tokio::test]
    async fn test_failed_fill_is_retryable() {
        let cache = AudioCache::new();

        let first = cache
            .get_or_synthesize("key", || async { Err(AuditoError::Synthesis("backend down".to_string())) })
            .await;
        assert!(first.is_err());
        assert_eq!(cache.lookup("key"), None);

        let second = cache
            .get_or_synthesize("key", || async { Ok("retry.mp3".to_string()) })
            .await
            .unwrap();
        assert_eq!(second, "retry.mp3");
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fill() {
        let cache = Arc::new(AudioCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_synthesize("shared", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        Ok("shared.mp3".to_string())
                    })
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), "shared.mp3");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lookup_miss() {
        let cache = AudioCache::new();
        assert_eq!(cache.lookup("nope"), None);
    }
}
