//! In-memory backend for tests
//!
//! [`FakeBackend`] records every call as an [`Action`], runs it through the
//! reactor chain, then applies it to an [`ObjectTracker`]. Objects are deep
//! copied on the way in and on the way out, so a test never shares storage
//! with the tracker.

use async_trait::async_trait;
use futures::StreamExt;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::warn;

use crate::backend::{Backend, ListOptions, WatchEvent, WatchStream};
use crate::error::{Result, RuntimeError};
use crate::labels::LabelSelector;
use crate::object::Object;

/// Buffered events per watch before a slow watcher starts skipping
const WATCH_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    List,
    Create,
    Update,
    Delete,
    Watch,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Watch => "watch",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub verb: Verb,
    /// Plural resource name
    pub resource: &'static str,
    pub namespace: Option<String>,
    pub name: Option<String>,
}

impl Action {
    fn new<T: Object>(verb: Verb, namespace: Option<&str>, name: Option<&str>) -> Self {
        Self {
            verb,
            resource: T::RESOURCE.plural,
            namespace: namespace
                .filter(|ns| T::RESOURCE.namespaced && !ns.is_empty())
                .map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    /// `"*"` matches any verb or resource
    pub fn matches(&self, verb: &str, resource: &str) -> bool {
        (verb == "*" || verb == self.verb.as_str()) && (resource == "*" || resource == self.resource)
    }
}

type Reaction = dyn Fn(&Action) -> Option<RuntimeError> + Send + Sync;

#[derive(Clone)]
struct Reactor {
    verb: String,
    resource: String,
    reaction: Arc<Reaction>,
}

type Stored = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
enum Change {
    Added,
    Modified,
    Deleted,
}

#[derive(Clone)]
struct TrackerEvent {
    key: String,
    namespace: String,
    change: Change,
    object: Stored,
}

/// Typed in-memory object store
pub struct ObjectTracker {
    /// (group/version/Kind, namespace, name) -> object
    objects: RwLock<BTreeMap<(String, String, String), Stored>>,
    resource_version: AtomicU64,
    events: broadcast::Sender<TrackerEvent>,
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTracker {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(WATCH_BUFFER);
        Self {
            objects: RwLock::new(BTreeMap::new()),
            resource_version: AtomicU64::new(0),
            events,
        }
    }

    /// Insert or replace an object without going through an action
    pub fn add<T: Object>(&self, object: &T) -> Result<()> {
        let namespace = scope::<T>(object.namespace());
        let key = object_key::<T>(&namespace, name_of(object)?);
        let existed = self.write().contains_key(&key);
        self.store(key, object, if existed { Change::Modified } else { Change::Added });
        Ok(())
    }

    pub fn get<T: Object>(&self, namespace: Option<&str>, name: &str) -> Result<T> {
        let namespace = scope::<T>(namespace);
        self.read()
            .get(&object_key::<T>(&namespace, name))
            .and_then(|o| o.downcast_ref::<T>())
            .map(T::deep_copy)
            .ok_or_else(|| not_found::<T>(&namespace, name))
    }

    /// Objects of `T`, in (namespace, name) order
    pub fn list<T: Object>(&self, namespace: Option<&str>) -> Vec<T> {
        let type_key = T::RESOURCE.key();
        let namespace = namespace.filter(|ns| T::RESOURCE.namespaced && !ns.is_empty());
        self.read()
            .iter()
            .filter(|((k, ns, _), _)| *k == type_key && namespace.is_none_or(|want| *ns == want))
            .filter_map(|(_, o)| o.downcast_ref::<T>())
            .map(T::deep_copy)
            .collect()
    }

    pub fn create<T: Object>(&self, namespace: Option<&str>, object: &T) -> Result<T> {
        let namespace = scope::<T>(namespace.or(object.namespace()));
        let name = name_of(object)?;
        let key = object_key::<T>(&namespace, name);
        if self.read().contains_key(&key) {
            return Err(RuntimeError::AlreadyExists {
                kind: T::RESOURCE.kind.to_string(),
                namespace: Some(namespace).filter(|ns| !ns.is_empty()),
                name: name.to_string(),
            });
        }
        let stored = self.prepare(object, &namespace);
        self.store(key, &stored, Change::Added);
        Ok(stored)
    }

    pub fn update<T: Object>(&self, namespace: Option<&str>, object: &T) -> Result<T> {
        let namespace = scope::<T>(namespace.or(object.namespace()));
        let name = name_of(object)?;
        let key = object_key::<T>(&namespace, name);
        if !self.read().contains_key(&key) {
            return Err(not_found::<T>(&namespace, name));
        }
        let stored = self.prepare(object, &namespace);
        self.store(key, &stored, Change::Modified);
        Ok(stored)
    }

    pub fn delete<T: Object>(&self, namespace: Option<&str>, name: &str) -> Result<()> {
        let namespace = scope::<T>(namespace);
        let key = object_key::<T>(&namespace, name);
        let removed = self
            .write()
            .remove(&key)
            .ok_or_else(|| not_found::<T>(&namespace, name))?;
        self.publish(&key, Change::Deleted, removed);
        Ok(())
    }

    /// Changes to `T` from now on; `None` spans all namespaces
    pub fn watch<T: Object>(&self, namespace: Option<&str>) -> WatchStream<T> {
        let receiver = self.events.subscribe();
        let type_key = T::RESOURCE.key();
        let namespace = namespace
            .filter(|ns| T::RESOURCE.namespaced && !ns.is_empty())
            .map(str::to_string);

        futures::stream::unfold(receiver, move |mut receiver| {
            let type_key = type_key.clone();
            let namespace = namespace.clone();
            async move {
                loop {
                    let event = match receiver.recv().await {
                        Ok(event) => event,
                        // Events were dropped; the consumer has to relist
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, kind = T::RESOURCE.kind, "fake watch lagged");
                            let err = RuntimeError::Watch(format!(
                                "watch of {} fell behind by {} events",
                                T::RESOURCE.kind,
                                skipped
                            ));
                            return Some((Err(err), receiver));
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    };
                    if event.key != type_key
                        || namespace.as_ref().is_some_and(|ns| *ns != event.namespace)
                    {
                        continue;
                    }
                    let Some(object) = event.object.downcast_ref::<T>().map(T::deep_copy) else {
                        continue;
                    };
                    let event = match event.change {
                        Change::Added => WatchEvent::Added(object),
                        Change::Modified => WatchEvent::Modified(object),
                        Change::Deleted => WatchEvent::Deleted(object),
                    };
                    return Some((Ok(event), receiver));
                }
            }
        })
        .boxed()
    }

    /// Total number of tracked objects
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Deep copy with type meta, namespace and a fresh resource version
    fn prepare<T: Object>(&self, object: &T, namespace: &str) -> T {
        let mut stored = object.deep_copy().with_type_meta();
        let version = self.resource_version.fetch_add(1, Ordering::SeqCst) + 1;
        let metadata = stored.metadata_mut();
        metadata.resource_version = Some(version.to_string());
        if !namespace.is_empty() {
            metadata.namespace = Some(namespace.to_string());
        }
        stored
    }

    fn store<T: Object>(&self, key: (String, String, String), object: &T, change: Change) {
        let stored: Stored = Arc::new(object.deep_copy());
        self.write().insert(key.clone(), stored.clone());
        self.publish(&key, change, stored);
    }

    fn publish(&self, key: &(String, String, String), change: Change, object: Stored) {
        // No receivers is fine
        let _ = self.events.send(TrackerEvent {
            key: key.0.clone(),
            namespace: key.1.clone(),
            change,
            object,
        });
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<(String, String, String), Stored>> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<(String, String, String), Stored>> {
        self.objects.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn scope<T: Object>(namespace: Option<&str>) -> String {
    if T::RESOURCE.namespaced {
        namespace.unwrap_or_default().to_string()
    } else {
        String::new()
    }
}

fn object_key<T: Object>(namespace: &str, name: &str) -> (String, String, String) {
    (T::RESOURCE.key(), namespace.to_string(), name.to_string())
}

fn name_of<T: Object>(object: &T) -> Result<&str> {
    match object.name() {
        "" => Err(RuntimeError::MissingName {
            kind: T::RESOURCE.kind.to_string(),
        }),
        name => Ok(name),
    }
}

fn not_found<T: Object>(namespace: &str, name: &str) -> RuntimeError {
    RuntimeError::NotFound {
        kind: T::RESOURCE.kind.to_string(),
        namespace: Some(namespace.to_string()).filter(|ns| !ns.is_empty()),
        name: name.to_string(),
    }
}

/// Backend over an [`ObjectTracker`] with an action log and reactors
#[derive(Clone, Default)]
pub struct FakeBackend {
    tracker: Arc<ObjectTracker>,
    actions: Arc<RwLock<Vec<Action>>>,
    reactors: Arc<RwLock<Vec<Reactor>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tracker; seeding is not recorded as actions
    pub fn with_objects<T: Object>(self, objects: impl IntoIterator<Item = T>) -> Result<Self> {
        for object in objects {
            self.tracker.add(&object)?;
        }
        Ok(self)
    }

    pub fn tracker(&self) -> &ObjectTracker {
        &self.tracker
    }

    /// Every action recorded so far, in call order
    pub fn actions(&self) -> Vec<Action> {
        self.actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_actions(&self) {
        self.actions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Run `reaction` before the tracker for matching actions
    ///
    /// `verb` and `resource` accept `"*"`. Returning `Some(error)` fails the
    /// call with that error; `None` passes it on down the chain. The most
    /// recently prepended reactor runs first.
    pub fn prepend_reactor(
        &self,
        verb: &str,
        resource: &str,
        reaction: impl Fn(&Action) -> Option<RuntimeError> + Send + Sync + 'static,
    ) {
        self.reactors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                0,
                Reactor {
                    verb: verb.to_string(),
                    resource: resource.to_string(),
                    reaction: Arc::new(reaction),
                },
            );
    }

    fn invoke(&self, action: Action) -> Result<()> {
        self.actions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action.clone());

        let reactors = self
            .reactors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for reactor in reactors {
            if action.matches(&reactor.verb, &reactor.resource) {
                if let Some(error) = (reactor.reaction)(&action) {
                    return Err(error);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get<T: Object>(&self, namespace: Option<&str>, name: &str) -> Result<T> {
        self.invoke(Action::new::<T>(Verb::Get, namespace, Some(name)))?;
        self.tracker.get(namespace, name)
    }

    async fn create<T: Object>(&self, namespace: Option<&str>, object: &T) -> Result<T> {
        let namespace = namespace.or(object.namespace());
        self.invoke(Action::new::<T>(Verb::Create, namespace, Some(object.name())))?;
        self.tracker.create(namespace, object)
    }

    async fn update<T: Object>(&self, namespace: Option<&str>, object: &T) -> Result<T> {
        let namespace = namespace.or(object.namespace());
        self.invoke(Action::new::<T>(Verb::Update, namespace, Some(object.name())))?;
        self.tracker.update(namespace, object)
    }

    async fn delete<T: Object>(&self, namespace: Option<&str>, name: &str) -> Result<()> {
        self.invoke(Action::new::<T>(Verb::Delete, namespace, Some(name)))?;
        self.tracker.delete::<T>(namespace, name)
    }

    /// Label selectors and `limit` apply; field selectors are ignored
    async fn list<T: Object>(&self, namespace: Option<&str>, options: &ListOptions) -> Result<Vec<T>> {
        self.invoke(Action::new::<T>(Verb::List, namespace, None))?;
        let selector = match &options.label_selector {
            Some(s) => LabelSelector::parse(s)?,
            None => LabelSelector::everything(),
        };
        let mut items: Vec<T> = self
            .tracker
            .list::<T>(namespace)
            .into_iter()
            .filter(|o| selector.matches(o.labels()))
            .collect();
        if let Some(limit) = options.limit {
            items.truncate(limit as usize);
        }
        Ok(items)
    }

    async fn watch<T: Object>(
        &self,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<WatchStream<T>> {
        self.invoke(Action::new::<T>(Verb::Watch, namespace, None))?;
        let stream = self.tracker.watch::<T>(namespace);
        Ok(match &options.label_selector {
            Some(s) => {
                let selector = LabelSelector::parse(s)?;
                stream
                    .filter(move |event| {
                        let keep = match event {
                            Ok(e) => selector.matches(e.object().labels()),
                            Err(_) => true,
                        };
                        futures::future::ready(keep)
                    })
                    .boxed()
            }
            None => stream,
        })
    }
}
