//! Keyed query cache.
//!
//! Every cache key owns one entry holding the last known data, the last
//! error and the lifecycle status. Concurrent reads of one key share a
//! single request, volatile resources are polled while someone is
//! subscribed, and mutations force a refetch through [`QueryCache::invalidate`].
//!
//! A new consumer of a key refetches it unless a request is already in
//! flight or the key settled successfully less than [`DEDUP_WINDOW`] ago.
//!
//! Within one key the most recently *started* request wins: each request is
//! tagged with a sequence number and a response is only applied if its
//! number is still the newest for that key.

use super::refresh::RefreshTable;
use super::state::{QueryState, QueryStatus};
use crate::api::{ApiResponse, Endpoint, Resource};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Cache keys are read endpoints: resource path plus query parameters.
pub type QueryKey = Endpoint;

type ErasedData = Arc<dyn Any + Send + Sync>;
type Outcome = Result<ErasedData, String>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, Outcome> + Send + Sync>;

/// How long successfully settled data is handed to new consumers as is.
pub const DEDUP_WINDOW: Duration = Duration::from_secs(2);

/// A fetchable resource bound to its cache key.
pub struct Query<T> {
    key: QueryKey,
    fetcher: Fetcher,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            fetcher: Arc::clone(&self.fetcher),
            _marker: PhantomData,
        }
    }
}

impl<T: Send + Sync + 'static> Query<T> {
    /// Bind `fetch` to `key`. An envelope with `success: false` settles the
    /// key in the error state with the envelope's message.
    pub fn new<F, Fut>(key: QueryKey, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResponse<T>> + Send + 'static,
    {
        let fetcher: Fetcher = Arc::new(move || {
            let response = fetch();
            async move { into_outcome(response.await) }.boxed()
        });
        Self {
            key,
            fetcher,
            _marker: PhantomData,
        }
    }
}

impl<T> Query<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

fn into_outcome<T: Send + Sync + 'static>(response: ApiResponse<T>) -> Outcome {
    match response.into_data()? {
        Some(data) => {
            let data: ErasedData = Arc::new(data);
            Ok(data)
        }
        None => Err("response contained no data".to_string()),
    }
}

#[derive(Clone, Default)]
struct RawState {
    status: QueryStatus,
    data: Option<ErasedData>,
    error: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl RawState {
    fn typed<T: Send + Sync + 'static>(&self) -> QueryState<T> {
        let data = self.data.clone().and_then(|data| match data.downcast::<T>() {
            Ok(data) => Some(data),
            Err(_) => {
                warn!(
                    "cached data is not a {}, ignoring it",
                    std::any::type_name::<T>()
                );
                None
            }
        });
        QueryState {
            status: self.status,
            data,
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

struct Entry {
    fetcher: Fetcher,
    state: watch::Sender<RawState>,
    /// Sequence number of the newest request started for this key.
    latest_request: u64,
    in_flight: bool,
    settled_at: Option<Instant>,
    consumers: usize,
    poller: Option<JoinHandle<()>>,
}

impl Entry {
    fn new(fetcher: Fetcher) -> Self {
        let (state, _) = watch::channel(RawState::default());
        Self {
            fetcher,
            state,
            latest_request: 0,
            in_flight: false,
            settled_at: None,
            consumers: 0,
            poller: None,
        }
    }

    /// Whether a newly arriving consumer should trigger a request.
    fn needs_fetch(&self) -> bool {
        if self.in_flight {
            return false;
        }
        match self.state.borrow().status {
            QueryStatus::Idle | QueryStatus::Error => true,
            QueryStatus::Loading => false,
            QueryStatus::Success => self
                .settled_at
                .map_or(true, |at| at.elapsed() >= DEDUP_WINDOW),
        }
    }
}

/// A request numbered under the entries lock, launched once the lock is
/// released so fetchers are free to use the cache themselves.
struct Pending {
    key: QueryKey,
    request: u64,
    fetcher: Fetcher,
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    refresh: RefreshTable,
    next_request: AtomicU64,
}

/// Shared handle to the query cache. Cloning is cheap; clones share entries.
///
/// Spawns its fetches and pollers on the current Tokio runtime, so it must be
/// used from within one.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_refresh_table(RefreshTable::default())
    }

    pub fn with_refresh_table(refresh: RefreshTable) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                refresh,
                next_request: AtomicU64::new(0),
            }),
        }
    }

    pub fn refresh_table(&self) -> &RefreshTable {
        &self.inner.refresh
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a long-lived consumer of `query`.
    ///
    /// Fetches unless the key is loading or holds fresh data, and starts
    /// polling when the resource has a refresh interval. The entry lives until the last
    /// subscription for its key is dropped.
    pub fn subscribe<T: Send + Sync + 'static>(&self, query: &Query<T>) -> Subscription<T> {
        let rx = self.acquire(query, true);
        Subscription::new(self.clone(), query.key.clone(), rx)
    }

    /// Read `query` once, joining a request already in flight for its key.
    ///
    /// Follows the same refetch rule as [`QueryCache::subscribe`].
    pub async fn fetch<T: Send + Sync + 'static>(&self, query: &Query<T>) -> QueryState<T> {
        let rx = self.acquire(query, false);
        let mut consumer = Subscription::<T>::new(self.clone(), query.key.clone(), rx);
        consumer.settled().await
    }

    /// Current state of `key` without triggering a request.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<QueryState<T>> {
        self.entries()
            .get(key)
            .map(|entry| entry.state.borrow().typed())
    }

    /// Force a new request for `key`, superseding any request in flight.
    ///
    /// Returns `false` when nobody holds the key.
    pub fn revalidate(&self, key: &QueryKey) -> bool {
        let pending = {
            let mut entries = self.entries();
            let Some(entry) = entries.get_mut(key) else {
                return false;
            };
            self.begin(key, entry)
        };
        self.launch(pending);
        true
    }

    /// Revalidate every live key of `resource`, e.g. all pages of a list.
    ///
    /// Returns the number of keys refetched.
    pub fn invalidate(&self, resource: Resource) -> usize {
        let pending: Vec<Pending> = {
            let mut entries = self.entries();
            entries
                .iter_mut()
                .filter(|(key, _)| key.resource() == resource)
                .map(|(key, entry)| self.begin(key, entry))
                .collect()
        };
        let count = pending.len();
        debug!(?resource, keys = count, "invalidated");
        for request in pending {
            self.launch(request);
        }
        count
    }

    /// Live keys, in no particular order.
    pub fn keys(&self) -> Vec<QueryKey> {
        self.entries().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn acquire<T>(&self, query: &Query<T>, poll: bool) -> watch::Receiver<RawState> {
        let (rx, pending) = {
            let mut entries = self.entries();
            let entry = entries.entry(query.key.clone()).or_insert_with(|| {
                debug!(key = %query.key, "cache entry created");
                Entry::new(Arc::clone(&query.fetcher))
            });
            entry.consumers += 1;
            let rx = entry.state.subscribe();

            let pending = entry
                .needs_fetch()
                .then(|| self.begin(&query.key, entry));

            if poll && entry.poller.is_none() {
                if let Some(interval) = self.inner.refresh.interval(query.key.resource()) {
                    entry.poller = Some(self.spawn_poller(query.key.clone(), interval));
                }
            }
            (rx, pending)
        };
        if let Some(pending) = pending {
            self.launch(pending);
        }
        rx
    }

    /// Poll tick: refetch unless a request is already outstanding.
    fn refresh(&self, key: &QueryKey) {
        let pending = {
            let mut entries = self.entries();
            match entries.get_mut(key) {
                Some(entry) if !entry.in_flight => self.begin(key, entry),
                _ => return,
            }
        };
        self.launch(pending);
    }

    /// Number a new request for `key` and mark it loading. Must be followed
    /// by [`QueryCache::launch`] after the entries lock is dropped.
    fn begin(&self, key: &QueryKey, entry: &mut Entry) -> Pending {
        let request = self.inner.next_request.fetch_add(1, Ordering::Relaxed) + 1;
        entry.latest_request = request;
        entry.in_flight = true;
        entry.state.send_modify(|s| s.status = QueryStatus::Loading);
        debug!(%key, request, "fetch started");
        Pending {
            key: key.clone(),
            request,
            fetcher: Arc::clone(&entry.fetcher),
        }
    }

    fn launch(&self, pending: Pending) {
        let Pending {
            key,
            request,
            fetcher,
        } = pending;
        let response = fetcher();
        let cache = self.clone();
        tokio::spawn(async move {
            let outcome = response.await;
            cache.settle(&key, request, outcome);
        });
    }

    fn settle(&self, key: &QueryKey, request: u64, outcome: Outcome) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            debug!(%key, request, "no consumers left, discarding response");
            return;
        };
        if request != entry.latest_request {
            debug!(%key, request, latest = entry.latest_request, "discarding stale response");
            return;
        }

        entry.in_flight = false;
        entry.settled_at = Some(Instant::now());
        entry.state.send_modify(|s| {
            s.updated_at = Some(Utc::now());
            match outcome {
                Ok(data) => {
                    s.status = QueryStatus::Success;
                    s.data = Some(data);
                    s.error = None;
                }
                Err(message) => {
                    s.status = QueryStatus::Error;
                    s.error = Some(message);
                }
            }
        });
        debug!(%key, request, "fetch settled");
    }

    fn release(&self, key: &QueryKey) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.consumers = entry.consumers.saturating_sub(1);
        if entry.consumers > 0 {
            return;
        }
        if let Some(poller) = entry.poller.take() {
            poller.abort();
        }
        entries.remove(key);
        debug!(%key, "cache entry torn down");
    }

    fn spawn_poller(&self, key: QueryKey, interval: Duration) -> JoinHandle<()> {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        debug!(%key, ?interval, "polling started");
        let first_tick = Instant::now() + interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                QueryCache { inner }.refresh(&key);
            }
        })
    }
}

/// A consumer's handle on one cache key. Dropping it releases the key.
pub struct Subscription<T> {
    cache: QueryCache,
    key: QueryKey,
    rx: watch::Receiver<RawState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Subscription<T> {
    fn new(cache: QueryCache, key: QueryKey, rx: watch::Receiver<RawState>) -> Self {
        Self {
            cache,
            key,
            rx,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Ask for fresh data for this key.
    pub fn revalidate(&self) -> bool {
        self.cache.revalidate(&self.key)
    }
}

impl<T: Send + Sync + 'static> Subscription<T> {
    pub fn state(&self) -> QueryState<T> {
        self.rx.borrow().typed()
    }

    /// Wait for the next state change.
    pub async fn changed(&mut self) -> QueryState<T> {
        if self.rx.changed().await.is_err() {
            warn!(key = %self.key, "cache entry dropped while subscribed");
        }
        self.rx.borrow_and_update().typed()
    }

    /// Wait until the key is in `Success` or `Error`.
    pub async fn settled(&mut self) -> QueryState<T> {
        loop {
            {
                let state = self.rx.borrow_and_update();
                if state.status.is_settled() {
                    return state.typed();
                }
            }
            if self.rx.changed().await.is_err() {
                return self.rx.borrow().typed();
            }
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cache.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    /// A query whose responses are released by the test, one per request, in
    /// the order the requests were started.
    fn gated_query(
        key: QueryKey,
        requests: usize,
    ) -> (Query<u32>, Vec<oneshot::Sender<ApiResponse<u32>>>) {
        let mut senders = Vec::new();
        let mut receivers = VecDeque::new();
        for _ in 0..requests {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        let receivers = Arc::new(Mutex::new(receivers));
        let query = Query::new(key, move || {
            let rx = receivers.lock().unwrap().pop_front();
            async move {
                match rx {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| ApiResponse::failure("gate dropped")),
                    None => ApiResponse::failure("no more responses"),
                }
            }
        });
        (query, senders)
    }

    /// A query that answers immediately and records when it was called.
    fn recording_query(key: QueryKey, calls: Arc<Mutex<Vec<Instant>>>) -> Query<usize> {
        Query::new(key, move || {
            let mut calls = calls.lock().unwrap();
            calls.push(Instant::now());
            let n = calls.len();
            async move { ApiResponse::ok(n) }
        })
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_request() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate_tx, gate_rx) = oneshot::channel::<()>();
        let gate = Arc::new(Mutex::new(Some(gate_rx)));

        let counter = Arc::clone(&calls);
        let query = Query::new(Endpoint::new(Resource::DataSources), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let gate = gate.lock().unwrap().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                ApiResponse::ok(vec!["ds-1".to_string()])
            }
        });

        let release = async {
            tokio::task::yield_now().await;
            let _ = gate_tx.send(());
        };
        let (a, b, _) = tokio::join!(cache.fetch(&query), cache.fetch(&query), release);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*a.data.unwrap(), vec!["ds-1".to_string()]);
        assert_eq!(b.status, QueryStatus::Success);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn later_request_wins_over_late_response() {
        let cache = QueryCache::new();
        let (query, mut gates) = gated_query(Endpoint::new(Resource::Anomalies), 2);

        let mut sub = cache.subscribe(&query);
        assert!(sub.revalidate());

        let second = gates.pop().unwrap();
        let first = gates.pop().unwrap();

        second.send(ApiResponse::ok(2)).unwrap();
        let state = sub.settled().await;
        assert_eq!(state.data.as_deref(), Some(&2));

        first.send(ApiResponse::ok(1)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let state = sub.state();
        assert_eq!(state.status, QueryStatus::Success);
        assert_eq!(state.data.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn failure_keeps_last_good_data() {
        let cache = QueryCache::new();
        let (query, mut gates) = gated_query(Endpoint::new(Resource::DashboardStats), 2);
        let mut sub = cache.subscribe(&query);

        gates.remove(0).send(ApiResponse::ok(7)).unwrap();
        assert_eq!(sub.settled().await.data.as_deref(), Some(&7));

        assert!(sub.revalidate());
        assert!(sub.state().is_loading());
        gates
            .remove(0)
            .send(ApiResponse::failure("Failed to fetch /api/dashboard/stats"))
            .unwrap();
        let state = sub.settled().await;

        assert_eq!(state.status, QueryStatus::Error);
        assert_eq!(state.data.as_deref(), Some(&7));
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch /api/dashboard/stats")
        );
    }

    #[tokio::test]
    async fn invalidate_refetches_every_page_of_a_resource() {
        let cache = QueryCache::new();
        let backend = Arc::new(Mutex::new(vec!["a".to_string()]));

        let make = |page: u32| {
            let backend = Arc::clone(&backend);
            Query::new(Endpoint::data_errors(page, 10), move || {
                let rows = backend.lock().unwrap().clone();
                async move { ApiResponse::ok(rows) }
            })
        };
        let page2 = make(2);
        let page3 = make(3);
        let other = Query::new(Endpoint::new(Resource::CorrectionRules), || async {
            ApiResponse::ok(Vec::<String>::new())
        });

        let mut sub2 = cache.subscribe(&page2);
        let mut sub3 = cache.subscribe(&page3);
        let _rules = cache.subscribe(&other);
        assert_eq!(cache.len(), 3);
        assert_eq!(sub2.settled().await.data.unwrap().len(), 1);
        sub3.settled().await;

        backend.lock().unwrap().push("b".to_string());
        assert_eq!(cache.invalidate(Resource::DataErrors), 2);

        assert_eq!(sub2.settled().await.data.unwrap().len(), 2);
        assert_eq!(sub3.settled().await.data.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn dropping_last_subscription_tears_down() {
        let cache = QueryCache::new();
        let (query, mut gates) = gated_query(Endpoint::new(Resource::AnomalyRules), 1);

        let sub = cache.subscribe(&query);
        let second = cache.subscribe(&query);
        assert_eq!(cache.len(), 1);
        drop(sub);
        assert_eq!(cache.len(), 1);
        drop(second);
        assert!(cache.is_empty());

        // The request is not cancelled, its response is just dropped.
        gates.remove(0).send(ApiResponse::ok(1)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.is_empty());
        assert!(!cache.revalidate(query.key()));
    }

    #[tokio::test]
    async fn distinct_params_get_distinct_entries() {
        let cache = QueryCache::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let page2 = recording_query(Endpoint::data_errors(2, 10), Arc::clone(&calls));
        let page3 = recording_query(Endpoint::data_errors(3, 10), Arc::clone(&calls));

        let mut a = cache.subscribe(&page2);
        let mut b = cache.subscribe(&page3);
        a.settled().await;
        b.settled().await;

        assert_eq!(cache.len(), 2);
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert!(cache
            .peek::<usize>(&Endpoint::data_errors(3, 10))
            .is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_data_is_shared_then_revalidated() {
        let cache = QueryCache::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let query = recording_query(Endpoint::new(Resource::DataSources), Arc::clone(&calls));

        let mut first = cache.subscribe(&query);
        first.settled().await;
        let state = cache.fetch(&query).await;
        assert_eq!(state.data.as_deref(), Some(&1));
        assert_eq!(calls.lock().unwrap().len(), 1);

        tokio::time::advance(DEDUP_WINDOW).await;
        let mut second = cache.subscribe(&query);
        assert!(second.state().is_loading());
        let state = second.settled().await;
        assert_eq!(state.data.as_deref(), Some(&2));
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(first.state().data.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn new_consumers_retry_a_failed_key() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = Query::new(Endpoint::new(Resource::DashboardStats), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    ApiResponse::failure("Failed to fetch /api/dashboard/stats")
                } else {
                    ApiResponse::ok(n)
                }
            }
        });

        let mut first = cache.subscribe(&query);
        assert!(first.settled().await.is_error());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let state = cache.fetch(&query).await;
        assert_eq!(state.status, QueryStatus::Success);
        assert_eq!(state.data.as_deref(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let mut second = cache.subscribe(&query);
        assert_eq!(second.settled().await.data.as_deref(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.state().status, QueryStatus::Success);
    }

    #[tokio::test]
    async fn fetcher_may_read_the_cache() {
        let cache = QueryCache::new();
        let key = Endpoint::new(Resource::CorrectionRules);
        let handle = cache.clone();
        let own_key = key.clone();
        let query = Query::new(key, move || {
            let status = handle.peek::<u32>(&own_key).map(|s| s.status);
            async move { ApiResponse::ok(u32::from(status == Some(QueryStatus::Loading))) }
        });

        let state = cache.fetch(&query).await;
        assert_eq!(state.data.as_deref(), Some(&1));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn volatile_resources_poll_while_subscribed() {
        let cache = QueryCache::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let query = recording_query(Endpoint::new(Resource::ProcessingJobs), Arc::clone(&calls));

        let mut sub = cache.subscribe(&query);
        sub.settled().await;
        tokio::time::sleep(Duration::from_millis(10_500)).await;

        {
            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), 3);
            assert_eq!(calls[1] - calls[0], Duration::from_secs(5));
            assert_eq!(calls[2] - calls[1], Duration::from_secs(5));
        }
        assert_eq!(sub.state().data.as_deref(), Some(&3));

        drop(sub);
        assert!(cache.is_empty());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_uses_the_refresh_table() {
        let cache = QueryCache::new();
        let health_calls = Arc::new(Mutex::new(Vec::new()));
        let usage_calls = Arc::new(Mutex::new(Vec::new()));
        let source_calls = Arc::new(Mutex::new(Vec::new()));

        let _health = cache.subscribe(&recording_query(
            Endpoint::new(Resource::SystemHealth),
            Arc::clone(&health_calls),
        ));
        let _usage = cache.subscribe(&recording_query(
            Endpoint::new(Resource::ResourceUsage),
            Arc::clone(&usage_calls),
        ));
        let _sources = cache.subscribe(&recording_query(
            Endpoint::new(Resource::DataSources),
            Arc::clone(&source_calls),
        ));

        tokio::time::sleep(Duration::from_secs(61)).await;

        // Initial fetch plus one per elapsed interval.
        assert_eq!(health_calls.lock().unwrap().len(), 1 + 2);
        assert_eq!(usage_calls.lock().unwrap().len(), 1 + 6);
        assert_eq!(source_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn one_shot_fetch_does_not_poll() {
        let cache = QueryCache::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let query = recording_query(Endpoint::new(Resource::SystemHealth), Arc::clone(&calls));

        let state = cache.fetch(&query).await;
        assert_eq!(state.status, QueryStatus::Success);
        assert!(cache.is_empty());
    }
}
