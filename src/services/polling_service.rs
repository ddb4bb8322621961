//! Timer-driven refresh of remote list resources.
//!
//! A [`PollingService`] spawns one background task per watched resource. The task
//! fetches immediately, then again on every tick of a fixed interval, whether the
//! previous attempt succeeded or not. Results land in a [`Snapshot`] that keeps the
//! last good data around when a later fetch fails (stale-while-revalidate).
//!
//! Fetches for the same key inside the dedup window share a single request through
//! a moka cache shared by every watcher spawned from the same service. An explicit
//! [`PollingHandle::refresh`] evicts the key first, so it always reaches the backend.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tokio::{
    sync::{watch, Notify},
    task::{JoinHandle, JoinSet},
    time::MissedTickBehavior,
};

use crate::{config::ClientConfig, Error, Result};

const DEDUP_CACHE_CAPACITY: u64 = 1_000;

/// Scheduled fetches still pending per watcher before further ticks are skipped.
pub const MAX_IN_FLIGHT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub dedup_window: Duration,
}

impl From<&ClientConfig> for PollOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval,
            dedup_window: config.dedup_window,
        }
    }
}

/// Latest known state of a polled resource.
#[derive(Debug)]
pub struct Snapshot<T> {
    data: Option<Arc<Vec<T>>>,
    error: Option<Error>,
    updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
        }
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl<T> Snapshot<T> {
    /// Last successful result, or an empty slice before the first one.
    pub fn data(&self) -> &[T] {
        self.data.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Error of the most recent attempt, cleared by the next success.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }

    /// When the data was last replaced by a successful fetch.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn apply(&mut self, outcome: Result<Fetched<T>>) {
        match outcome {
            Ok(fetched) => {
                self.data = Some(fetched.data);
                self.error = None;
                self.updated_at = Some(fetched.fetched_at);
            }
            Err(err) => self.error = Some(err),
        }
    }
}

/// A fetch result together with the time the fetch function produced it.
struct Fetched<T> {
    data: Arc<Vec<T>>,
    fetched_at: DateTime<Utc>,
}

impl<T> Clone for Fetched<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

pub struct PollingService<T> {
    options: PollOptions,
    dedup: Option<Cache<String, Fetched<T>>>,
}

impl<T> Clone for PollingService<T> {
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            dedup: self.dedup.clone(),
        }
    }
}

impl<T> PollingService<T>
where
    T: Send + Sync + 'static,
{
    /// A zero `dedup_window` disables deduplication.
    pub fn new(options: PollOptions) -> Self {
        let dedup = (!options.dedup_window.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(DEDUP_CACHE_CAPACITY)
                .time_to_live(options.dedup_window)
                .build()
        });

        Self { options, dedup }
    }

    pub fn options(&self) -> PollOptions {
        self.options
    }

    /// Starts polling `key` with `fetch`. Polling stops when the handle is dropped.
    pub fn watch<F, Fut>(&self, key: impl Into<String>, fetch: F) -> PollingHandle<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
    {
        let key = key.into();
        let (state_tx, state_rx) = watch::channel(Snapshot::default());
        let refresh = Arc::new(Notify::new());

        let fetcher = Fetcher {
            key: key.clone(),
            fetch: Arc::new(fetch),
            dedup: self.dedup.clone(),
        };

        // tokio intervals panic on a zero period
        let interval = self.options.interval.max(Duration::from_millis(1));
        let task = tokio::spawn(drive(fetcher, interval, state_tx, refresh.clone()));

        tracing::debug!(key = %key, interval_ms = interval.as_millis() as u64, "polling started");

        PollingHandle {
            key,
            state: state_rx,
            refresh,
            task,
        }
    }
}

struct Fetcher<T, F> {
    key: String,
    fetch: Arc<F>,
    dedup: Option<Cache<String, Fetched<T>>>,
}

impl<T, F> Clone for Fetcher<T, F> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            fetch: self.fetch.clone(),
            dedup: self.dedup.clone(),
        }
    }
}

impl<T, F, Fut> Fetcher<T, F>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    /// `bypass_dedup` drops any cached result for the key before fetching.
    async fn fetch_once(self, bypass_dedup: bool) -> Result<Fetched<T>> {
        let fetch = self.fetch;
        // only invoked when no in-flight or cached result exists for the key
        let load = async move {
            let data = (*fetch)().await?;
            Ok::<_, Error>(Fetched {
                data: Arc::new(data),
                fetched_at: Utc::now(),
            })
        };

        match self.dedup {
            Some(cache) => {
                if bypass_dedup {
                    cache.invalidate(&self.key).await;
                }
                cache
                    .try_get_with(self.key, load)
                    .await
                    .map_err(|err: Arc<Error>| (*err).clone())
            }
            None => load.await,
        }
    }
}

async fn drive<T, F, Fut>(
    fetcher: Fetcher<T, F>,
    interval: Duration,
    state: watch::Sender<Snapshot<T>>,
    refresh: Arc<Notify>,
) where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Dropping the set aborts whatever is still in flight.
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if in_flight.len() >= MAX_IN_FLIGHT {
                    let pending = in_flight.len();
                    tracing::debug!(key = %fetcher.key, "tick skipped, {pending} fetches pending");
                } else {
                    in_flight.spawn(fetcher.clone().fetch_once(false));
                }
            }
            _ = refresh.notified() => {
                in_flight.spawn(fetcher.clone().fetch_once(true));
            }
            Some(joined) = in_flight.join_next() => match joined {
                Ok(outcome) => {
                    if let Err(err) = &outcome {
                        tracing::warn!(key = %fetcher.key, "poll failed: {err}");
                    }
                    state.send_modify(|snapshot| snapshot.apply(outcome));
                }
                Err(err) if err.is_cancelled() => {}
                Err(err) => tracing::error!(key = %fetcher.key, "poll task panicked: {err}"),
            },
        }
    }
}

/// Consumer side of a polled resource. Dropping it stops the schedule.
pub struct PollingHandle<T> {
    key: String,
    state: watch::Receiver<Snapshot<T>>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl<T> PollingHandle<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.state.borrow().clone()
    }

    /// Waits for the next update and returns it.
    pub async fn changed(&mut self) -> Snapshot<T> {
        // An error only means the task is gone; the last state is still valid.
        let _ = self.state.changed().await;
        self.state.borrow_and_update().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.state.clone()
    }

    /// Revalidates now instead of waiting for the next tick, skipping the dedup cache.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the schedule and in-flight fetches. No update is applied afterwards.
    pub async fn cancel(&mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
        tracing::debug!(key = %self.key, "polling cancelled");
    }
}

impl<T> Drop for PollingHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
