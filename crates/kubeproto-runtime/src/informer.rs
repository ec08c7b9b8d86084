//! Shared informer cache
//!
//! A [`SharedInformerFactory`] owns one [`Informer`] per object type. Each
//! informer keeps an [`Indexer`] in sync through list-then-watch on a
//! background task.
//!
//! ```text
//! factory.informer_for::<T>()   -> same Arc<Informer<T>> for every caller
//! factory.run(&stop)            -> starts each registered loop exactly once,
//!                                  remembers `stop` so later registrations
//!                                  start immediately
//! handle.stop()                 -> every loop exits
//! ```
//!
//! The factory lock only guards registration. Listers read the indexer
//! through its own lock and never touch the factory.

use futures::StreamExt;
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::{Backend, ListOptions, WatchEvent};
use crate::error::Result;
use crate::lister::Lister;
use crate::object::Object;

const INITIAL_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Sender half of a stop signal
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

/// Cancellation context handed to informer loops
///
/// Stopped once [`StopHandle::stop`] is called or the handle is dropped.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected stop handle and signal
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once the signal fires
    pub async fn stopped(&mut self) {
        // Err means the handle is gone, which also counts as stopped
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

/// (namespace, name); cluster-scoped objects use an empty namespace
pub type ObjectKey = (String, String);

/// Local store of one object type
#[derive(Debug)]
pub struct Indexer<T> {
    items: RwLock<BTreeMap<ObjectKey, T>>,
}

impl<T> Default for Indexer<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Object> Indexer<T> {
    pub fn key(object: &T) -> ObjectKey {
        (
            object.namespace().unwrap_or_default().to_string(),
            object.name().to_string(),
        )
    }

    /// Swap the whole content for a fresh list result
    pub fn replace(&self, objects: Vec<T>) {
        let items = objects.into_iter().map(|o| (Self::key(&o), o)).collect();
        *self.write() = items;
    }

    pub fn apply(&self, event: WatchEvent<T>) {
        let mut items = self.write();
        match event {
            WatchEvent::Added(o) | WatchEvent::Modified(o) => {
                items.insert(Self::key(&o), o);
            }
            WatchEvent::Deleted(o) => {
                items.remove(&Self::key(&o));
            }
        }
    }

    /// Deep copy of one object
    pub fn get(&self, namespace: &str, name: &str) -> Option<T> {
        self.read()
            .get(&(namespace.to_string(), name.to_string()))
            .map(T::deep_copy)
    }

    /// Deep copies of the objects accepted by `filter`, in key order
    pub fn list_by(&self, filter: impl Fn(&T) -> bool) -> Vec<T> {
        self.read()
            .values()
            .filter(|o| filter(o))
            .map(T::deep_copy)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<ObjectKey, T>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<ObjectKey, T>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A list-then-watch subscription for one object type
#[derive(Debug)]
pub struct Informer<T> {
    indexer: Arc<Indexer<T>>,
    namespace: Option<String>,
    options: ListOptions,
    synced: watch::Sender<bool>,
    loops_started: AtomicUsize,
}

impl<T: Object> Informer<T> {
    pub fn new(namespace: Option<String>, options: ListOptions) -> Self {
        let (synced, _) = watch::channel(false);
        Self {
            indexer: Arc::new(Indexer::default()),
            namespace,
            options,
            synced,
            loops_started: AtomicUsize::new(0),
        }
    }

    pub fn indexer(&self) -> &Arc<Indexer<T>> {
        &self.indexer
    }

    pub fn lister(&self) -> Lister<T> {
        Lister::new(self.indexer.clone())
    }

    /// True once the first list has been stored
    pub fn has_synced(&self) -> bool {
        *self.synced.borrow()
    }

    /// Number of background loops ever started for this informer
    pub fn loops_started(&self) -> usize {
        self.loops_started.load(Ordering::SeqCst)
    }

    fn synced_receiver(&self) -> watch::Receiver<bool> {
        self.synced.subscribe()
    }

    /// Keep the indexer in sync until `stop` fires
    pub async fn run<B: Backend>(self: Arc<Self>, backend: B, mut stop: StopSignal) {
        self.loops_started.fetch_add(1, Ordering::SeqCst);
        let kind = T::RESOURCE.kind;
        let mut backoff = INITIAL_BACKOFF;

        while !stop.is_stopped() {
            tokio::select! {
                _ = stop.stopped() => break,
                result = self.list_and_watch(&backend) => match result {
                    Ok(()) => {
                        debug!(kind, "watch closed, relisting");
                        backoff = INITIAL_BACKOFF;
                    }
                    Err(e) => warn!(kind, error = %e, retry_in = ?backoff, "list/watch failed"),
                },
            }

            tokio::select! {
                _ = stop.stopped() => break,
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
        debug!(kind, "informer stopped");
    }

    async fn list_and_watch<B: Backend>(&self, backend: &B) -> Result<()> {
        let namespace = self.namespace.as_deref();
        // Subscribe before listing so nothing between the two is lost
        let mut events = backend.watch::<T>(namespace, &self.options).await?;
        let objects = backend.list::<T>(namespace, &self.options).await?;
        debug!(kind = T::RESOURCE.kind, count = objects.len(), "listed");
        self.indexer.replace(objects);
        self.synced.send_replace(true);

        while let Some(event) = events.next().await {
            self.indexer.apply(event?);
        }
        Ok(())
    }
}

type StartFn = Box<dyn Fn(StopSignal) -> JoinHandle<()> + Send + Sync>;

struct Registration {
    informer: Arc<dyn Any + Send + Sync>,
    start: StartFn,
    started: bool,
    synced: watch::Receiver<bool>,
}

#[derive(Default)]
struct FactoryState {
    /// (group/version/Kind, type) -> registration; iterated in key order
    informers: BTreeMap<(String, TypeId), Registration>,
    stop: Option<StopSignal>,
}

/// Process-wide informer registry, one informer per object type
pub struct SharedInformerFactory<B: Backend> {
    backend: B,
    namespace: Option<String>,
    options: ListOptions,
    state: Mutex<FactoryState>,
}

impl<B: Backend> SharedInformerFactory<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            namespace: None,
            options: ListOptions::default(),
            state: Mutex::new(FactoryState::default()),
        }
    }

    /// Restrict every informer to one namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Apply list/watch filters to every informer
    pub fn with_options(mut self, options: ListOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The shared informer for `T`, created on first request
    ///
    /// When the factory is already running, a new informer starts at once.
    pub fn informer_for<T: Object>(&self) -> Arc<Informer<T>> {
        let mut state = self.lock();
        let key = (T::RESOURCE.key(), TypeId::of::<T>());

        if let Some(registration) = state.informers.get(&key) {
            if let Ok(informer) = registration.informer.clone().downcast::<Informer<T>>() {
                return informer;
            }
        }

        let informer = Arc::new(Informer::<T>::new(
            self.namespace.clone(),
            self.options.clone(),
        ));
        let start: StartFn = {
            let informer = informer.clone();
            let backend = self.backend.clone();
            Box::new(move |stop| tokio::spawn(informer.clone().run(backend.clone(), stop)))
        };

        let mut registration = Registration {
            informer: informer.clone(),
            synced: informer.synced_receiver(),
            start,
            started: false,
        };
        if let Some(stop) = state.stop.clone() {
            debug!(kind = T::RESOURCE.kind, "factory running, starting informer");
            let _ = (registration.start)(stop);
            registration.started = true;
        }
        state.informers.insert(key, registration);
        informer
    }

    /// Start every registered informer that is not running yet
    ///
    /// Idempotent. The first signal passed is kept and used to start
    /// informers registered afterwards.
    pub fn run(&self, stop: &StopSignal) {
        let mut state = self.lock();
        let stop = state.stop.get_or_insert_with(|| stop.clone()).clone();
        for ((key, _), registration) in state.informers.iter_mut() {
            if !registration.started {
                debug!(informer = %key, "starting informer");
                let _ = (registration.start)(stop.clone());
                registration.started = true;
            }
        }
    }

    /// Wait until every informer registered so far has synced
    ///
    /// Returns the sync state per `group/version/Kind`; entries are `false`
    /// when `stop` fired first.
    pub async fn wait_for_cache_sync(&self, stop: &StopSignal) -> BTreeMap<String, bool> {
        let receivers: Vec<(String, watch::Receiver<bool>)> = self
            .lock()
            .informers
            .iter()
            .map(|((key, _), r)| (key.clone(), r.synced.clone()))
            .collect();

        let mut out = BTreeMap::new();
        for (key, mut synced) in receivers {
            let mut stop = stop.clone();
            let done = tokio::select! {
                ok = async { synced.wait_for(|s| *s).await.is_ok() } => ok,
                _ = stop.stopped() => false,
            };
            out.insert(key, done);
        }
        out
    }

    /// `group/version/Kind` of every registered informer, sorted
    pub fn registered(&self) -> Vec<String> {
        self.lock()
            .informers
            .keys()
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
