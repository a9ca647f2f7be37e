//! Request coalescing
//!
//! While a fetch for a key is in flight, further callers for the same key
//! await the same underlying future instead of issuing their own request.
//! The entry is removed once the request resolves, so a later call (a manual
//! retry, say) goes to the backend again.

use crate::api::FetchError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchError>>>;

/// In-flight requests keyed by `K`
pub struct InFlight<K, V>
where
    V: Clone,
{
    pending: Mutex<HashMap<K, SharedFetch<V>>>,
}

impl<K, V> InFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Await the request for `key`, starting it with `start` if none is running
    pub async fn run<F>(&self, key: K, start: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<V, FetchError>>,
    {
        let request = {
            let mut pending = self.pending.lock().unwrap();
            match pending.get(&key) {
                Some(existing) => {
                    tracing::trace!("Joining in-flight request");
                    existing.clone()
                }
                None => {
                    let shared = start().shared();
                    pending.insert(key.clone(), shared.clone());
                    shared
                }
            }
        };

        let result = request.clone().await;

        // Only remove our own entry; a newer request may have replaced it
        let mut pending = self.pending.lock().unwrap();
        if pending
            .get(&key)
            .is_some_and(|current| current.ptr_eq(&request))
        {
            pending.remove(&key);
        }

        result
    }

    /// Number of requests currently in flight
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

impl<K, V> Default for InFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_request() {
        let inflight: Arc<InFlight<String, u32>> = Arc::new(InFlight::new());
        let starts = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());

        let mut handles = Vec::new();
        for _ in 0..3 {
            let inflight = inflight.clone();
            let starts = starts.clone();
            let release = release.clone();
            handles.push(tokio::spawn(async move {
                inflight
                    .run("k".to_string(), move || {
                        starts.fetch_add(1, Ordering::SeqCst);
                        async move {
                            release.notified().await;
                            Ok(7)
                        }
                        .boxed()
                    })
                    .await
            }));
        }

        // Let every task register before releasing the request
        while inflight.len() == 0 {
            tokio::task::yield_now().await;
        }
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        release.notify_one();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(inflight.len(), 0);
    }

    #[tokio::test]
    async fn test_sequential_calls_start_new_requests() {
        let inflight: InFlight<&'static str, u32> = InFlight::new();
        let starts = AtomicUsize::new(0);

        for _ in 0..2 {
            let result = inflight
                .run("k", || {
                    starts.fetch_add(1, Ordering::SeqCst);
                    async { Err(FetchError::Network("down".into())) }.boxed()
                })
                .await;
            assert_eq!(result, Err(FetchError::Network("down".into())));
        }

        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }
}
