//! Waiting for an upstream stage to finish.
//!
//! Separate processes rendezvous through the completion record on storage
//! ([`PollingWaiter`]). Stages running in one process hand the record over
//! through a watch channel instead ([`completion_channel`]). Either way the
//! downstream stage only ever sees a complete record.

use super::record::StageCompletionRecord;
use crate::cancellation::CancellationToken;
use crate::core::StageKind;
use crate::errors::{CorpusflowError, Result};
use crate::storage::{read_json, Storage, StorageError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How a downstream stage polls for its upstream record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between existence checks in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Give up after this many seconds. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_interval_ms() -> u64 {
    2000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_secs: None,
        }
    }
}

impl PollConfig {
    /// Creates a poll configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Sets the wait bound.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Gets the interval as Duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Gets the wait bound as Duration.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Blocks until the upstream stage has published its completion record.
#[async_trait]
pub trait CompletionWaiter<T>: Send + Sync {
    /// Waits for the record; fails only on cancellation, timeout, or a fatal
    /// storage error.
    async fn wait(&self, cancel: &CancellationToken) -> Result<StageCompletionRecord<T>>;
}

/// Polls storage for a completion record at a fixed interval.
pub struct PollingWaiter<T> {
    storage: Arc<dyn Storage>,
    path: PathBuf,
    upstream: StageKind,
    poll: PollConfig,
    _record: PhantomData<fn() -> T>,
}

impl<T> PollingWaiter<T> {
    /// Creates a waiter for the record `upstream` writes at `path`.
    pub fn new(
        storage: Arc<dyn Storage>,
        path: impl Into<PathBuf>,
        upstream: StageKind,
        poll: PollConfig,
    ) -> Self {
        Self {
            storage,
            path: path.into(),
            upstream,
            poll,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> PollingWaiter<T> {
    /// One check. `Ok(None)` means "not complete yet".
    fn try_read(&self) -> Result<Option<StageCompletionRecord<T>>> {
        if !self.storage.exists(&self.path) {
            return Ok(None);
        }
        match read_json(self.storage.as_ref(), &self.path) {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(StorageError::Json(e)) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Upstream record is not a complete record yet, polling again"
                );
                Ok(None)
            }
            Err(StorageError::Io(e)) => Err(CorpusflowError::Io(e)),
        }
    }
}

impl<T> std::fmt::Debug for PollingWaiter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingWaiter")
            .field("path", &self.path)
            .field("upstream", &self.upstream)
            .field("poll", &self.poll)
            .finish()
    }
}

#[async_trait]
impl<T> CompletionWaiter<T> for PollingWaiter<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn wait(&self, cancel: &CancellationToken) -> Result<StageCompletionRecord<T>> {
        let started = Instant::now();
        let deadline = self.poll.timeout().map(|t| started + t);
        let mut attempts: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(cancel));
            }
            if let Some(record) = self.try_read()? {
                info!(
                    upstream = %self.upstream,
                    path = %self.path.display(),
                    attempts,
                    "Upstream stage complete"
                );
                return Ok(record);
            }

            let mut sleep_for = self.poll.interval();
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(CorpusflowError::UpstreamTimeout {
                        path: self.path.clone(),
                        waited: started.elapsed(),
                    });
                }
                sleep_for = sleep_for.min(deadline - now);
            }

            if attempts == 0 {
                info!(upstream = %self.upstream, "Waiting for {} stage to complete...", self.upstream);
            } else {
                debug!(upstream = %self.upstream, attempts, "Still waiting");
            }
            attempts += 1;

            tokio::select! {
                () = cancel.cancelled() => return Err(cancelled(cancel)),
                () = tokio::time::sleep(sleep_for) => {}
            }
        }
    }
}

fn cancelled(cancel: &CancellationToken) -> CorpusflowError {
    CorpusflowError::Cancelled(cancel.reason().unwrap_or_else(|| "cancelled".to_string()))
}

/// Publishing half of an in-process completion signal.
#[derive(Debug)]
pub struct CompletionNotifier<T> {
    tx: watch::Sender<Option<StageCompletionRecord<T>>>,
}

impl<T> CompletionNotifier<T> {
    /// Publishes the record. Later publishes replace earlier ones.
    pub fn publish(&self, record: StageCompletionRecord<T>) {
        self.tx.send_replace(Some(record));
    }
}

/// Receiving half of an in-process completion signal.
#[derive(Debug)]
pub struct ChannelWaiter<T> {
    rx: watch::Receiver<Option<StageCompletionRecord<T>>>,
    upstream: StageKind,
}

/// Creates a completion signal for records produced by `upstream`.
#[must_use]
pub fn completion_channel<T>(upstream: StageKind) -> (CompletionNotifier<T>, ChannelWaiter<T>) {
    let (tx, rx) = watch::channel(None);
    (CompletionNotifier { tx }, ChannelWaiter { rx, upstream })
}

#[async_trait]
impl<T> CompletionWaiter<T> for ChannelWaiter<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn wait(&self, cancel: &CancellationToken) -> Result<StageCompletionRecord<T>> {
        let mut rx = self.rx.clone();
        info!(upstream = %self.upstream, "Waiting for {} stage to complete...", self.upstream);

        tokio::select! {
            () = cancel.cancelled() => Err(cancelled(cancel)),
            published = rx.wait_for(Option::is_some) => {
                let guard = published
                    .map_err(|_| CorpusflowError::ChannelClosed(self.upstream.to_string()))?;
                guard
                    .clone()
                    .ok_or_else(|| CorpusflowError::Internal("empty completion signal".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::record::{FetchItem, FetchRecord};
    use crate::core::ItemStatus;
    use crate::storage::{write_json, MemoryStorage};
    use std::path::Path;

    fn fast_poll() -> PollConfig {
        PollConfig::new().with_interval_ms(5)
    }

    fn sample_record() -> FetchRecord {
        FetchRecord::from_results(vec![FetchItem::new("a.html", ItemStatus::Success)])
    }

    #[test]
    fn test_poll_config_defaults() {
        let poll = PollConfig::default();
        assert_eq!(poll.interval(), Duration::from_secs(2));
        assert_eq!(poll.timeout(), None);
    }

    #[tokio::test]
    async fn test_polling_returns_existing_record() {
        let storage = Arc::new(MemoryStorage::new());
        let path = PathBuf::from("/s/status/fetch_complete.json");
        storage.insert(&path, serde_json::to_vec(&sample_record()).unwrap());

        let waiter: PollingWaiter<FetchItem> =
            PollingWaiter::new(storage, &path, StageKind::Fetch, fast_poll());
        let record = waiter.wait(&CancellationToken::new()).await.unwrap();
        assert_eq!(record.results.len(), 1);
    }

    #[tokio::test]
    async fn test_polling_waits_until_record_appears() {
        let storage = Arc::new(MemoryStorage::new());
        storage.create_dir_all(Path::new("/s/status")).unwrap();
        let path = PathBuf::from("/s/status/fetch_complete.json");

        let writer = {
            let storage = Arc::clone(&storage);
            let path = path.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                write_json(&*storage, &path, &sample_record()).unwrap();
            })
        };

        let waiter: PollingWaiter<FetchItem> =
            PollingWaiter::new(storage.clone(), &path, StageKind::Fetch, fast_poll());
        let record = waiter.wait(&CancellationToken::new()).await.unwrap();
        assert_eq!(record.items_succeeded, 1);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_polling_skips_partial_record() {
        let storage = Arc::new(MemoryStorage::new());
        let path = PathBuf::from("/s/status/fetch_complete.json");
        storage.insert(&path, "{\"results\": [");

        let fixer = {
            let storage = Arc::clone(&storage);
            let path = path.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                storage.insert(path, serde_json::to_vec(&sample_record()).unwrap());
            })
        };

        let waiter: PollingWaiter<FetchItem> =
            PollingWaiter::new(storage.clone(), &path, StageKind::Fetch, fast_poll());
        let record = waiter.wait(&CancellationToken::new()).await.unwrap();
        assert_eq!(record.results[0].file, "a.html");
        fixer.await.unwrap();
    }

    #[tokio::test]
    async fn test_polling_accepts_record_with_foreign_timestamp() {
        let storage = Arc::new(MemoryStorage::new());
        let path = PathBuf::from("/s/status/fetch_complete.json");
        storage.insert(
            &path,
            r#"{"timestamp": 1714564800, "results": [{"file": "a.html", "status": "success"}]}"#,
        );

        let poll = PollConfig::new().with_interval_ms(5).with_timeout_secs(Some(1));
        let waiter: PollingWaiter<FetchItem> =
            PollingWaiter::new(storage, &path, StageKind::Fetch, poll);
        let record = waiter.wait(&CancellationToken::new()).await.unwrap();
        assert_eq!(record.results[0].file, "a.html");
    }

    #[tokio::test]
    async fn test_polling_times_out() {
        let storage = Arc::new(MemoryStorage::new());
        let poll = PollConfig::new().with_interval_ms(5).with_timeout_secs(Some(0));
        let waiter: PollingWaiter<FetchItem> =
            PollingWaiter::new(storage, "/s/status/missing.json", StageKind::Fetch, poll);

        let err = waiter.wait(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CorpusflowError::UpstreamTimeout { .. }));
    }

    #[tokio::test]
    async fn test_polling_cancelled() {
        let storage = Arc::new(MemoryStorage::new());
        let waiter: PollingWaiter<FetchItem> =
            PollingWaiter::new(storage, "/s/status/missing.json", StageKind::Fetch, fast_poll());
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                cancel.cancel("shutdown");
            })
        };

        let err = waiter.wait(&cancel).await.unwrap_err();
        assert!(err.is_cancellation());
        assert!(err.to_string().contains("shutdown"));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_polling_surfaces_storage_faults() {
        let mut storage = crate::storage::MockStorage::new();
        storage.expect_exists().return_const(true);
        storage.expect_read().returning(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            ))
        });
        let waiter: PollingWaiter<FetchItem> =
            PollingWaiter::new(Arc::new(storage), "/s/x.json", StageKind::Fetch, fast_poll());

        let err = waiter.wait(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CorpusflowError::Io(_)));
    }

    #[tokio::test]
    async fn test_channel_delivers_published_record() {
        let (notifier, waiter) = completion_channel::<FetchItem>(StageKind::Fetch);
        let publisher = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            notifier.publish(sample_record());
            notifier
        });

        let record = waiter.wait(&CancellationToken::new()).await.unwrap();
        assert_eq!(record.items_total, 1);
        drop(publisher.await.unwrap());
    }

    #[tokio::test]
    async fn test_channel_closed_without_publish() {
        let (notifier, waiter) = completion_channel::<FetchItem>(StageKind::Process);
        drop(notifier);
        let err = waiter.wait(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CorpusflowError::ChannelClosed(_)));
    }

    #[tokio::test]
    async fn test_channel_cancelled() {
        let (_notifier, waiter) = completion_channel::<FetchItem>(StageKind::Process);
        let cancel = CancellationToken::new();
        cancel.cancel("stop");
        let err = waiter.wait(&cancel).await.unwrap_err();
        assert!(err.is_cancellation());
    }
}
