use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use kube::runtime::reflector::{self, ObjectRef, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::client::scope::{key_for, object_key, split_key, ManagedResource};
use crate::core::client::store::ResourceCache;
use crate::core::controller::handler::HandlerFunc;
use crate::errors::{Error, Result};

pub const DEFAULT_REQUEUE_DELAY: Duration = Duration::from_secs(5);

/// Something the management client starts and waits on.
#[async_trait]
pub trait Starter: Send + Sync {
    fn name(&self) -> &str;

    /// Spawns the reflector and `threadiness` workers. Starting twice is a no-op.
    fn start(&self, client: Client, threadiness: usize) -> Result<Vec<JoinHandle<()>>>;

    /// Resolves once the cache holds the initial listing.
    async fn sync(&self) -> Result<()>;
}

#[derive(Default)]
struct QueueState {
    dirty: HashSet<String>,
    processing: HashSet<String>,
}

/// Work queue that holds each key at most once and never hands the same key
/// to two workers at the same time. A key re-added while in flight is sent
/// again by `done`.
struct WorkQueue {
    state: Mutex<QueueState>,
    tx: mpsc::UnboundedSender<String>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
}

impl WorkQueue {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Mutex::new(QueueState::default()),
            tx,
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| {
            warn!("work queue lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn add(&self, key: String) {
        let mut state = self.state();
        if !state.dirty.insert(key.clone()) {
            return;
        }
        // Re-sent by `done` once the worker holding it finishes.
        if state.processing.contains(&key) {
            return;
        }
        let _ = self.tx.send(key);
    }

    fn add_after(self: &Arc<Self>, key: String, delay: Duration) {
        let queue = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(key);
        });
    }

    async fn next(&self) -> Option<String> {
        let key = self.rx.lock().await.recv().await?;
        let mut state = self.state();
        state.dirty.remove(&key);
        state.processing.insert(key.clone());
        Some(key)
    }

    fn done(&self, key: &str) {
        let mut state = self.state();
        state.processing.remove(key);
        if state.dirty.contains(key) {
            let _ = self.tx.send(key.to_string());
        }
    }

    fn len(&self) -> usize {
        self.state().dirty.len()
    }
}

type NamedHandlers<K> = Arc<RwLock<Vec<(String, HandlerFunc<K>)>>>;

/// Watches one kind in one namespace and feeds every change through the
/// registered handlers.
pub struct GenericController<K: ManagedResource> {
    name: String,
    namespace: String,
    requeue_delay: Duration,
    cache: ResourceCache<K>,
    store: Store<K>,
    writer: Mutex<Option<reflector::store::Writer<K>>>,
    handlers: NamedHandlers<K>,
    queue: Arc<WorkQueue>,
    started: AtomicBool,
}

impl<K: ManagedResource> GenericController<K> {
    pub fn new(name: impl Into<String>, namespace: &str) -> Self {
        let (store, writer) = reflector::store::<K>();
        Self {
            name: name.into(),
            namespace: namespace.to_string(),
            requeue_delay: DEFAULT_REQUEUE_DELAY,
            cache: ResourceCache::new(store.clone()),
            store,
            writer: Mutex::new(Some(writer)),
            handlers: Arc::new(RwLock::new(Vec::new())),
            queue: Arc::new(WorkQueue::new()),
            started: AtomicBool::new(false),
        }
    }

    pub fn with_requeue_delay(mut self, delay: Duration) -> Self {
        self.requeue_delay = delay;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn cache(&self) -> ResourceCache<K> {
        self.cache.clone()
    }

    /// Handlers run in registration order.
    pub fn add_handler(&self, name: impl Into<String>, handler: HandlerFunc<K>) {
        let name = name.into();
        debug!("{}: adding handler {}", self.name, name);
        match self.handlers.write() {
            Ok(mut handlers) => handlers.push((name, handler)),
            Err(_) => error!("{}: handler list poisoned, dropping {}", self.name, name),
        }
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.handlers
            .read()
            .map(|h| h.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn enqueue(&self, namespace: &str, name: &str) {
        self.queue.add(key_for(namespace, name));
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Runs every handler for `key` against the cached object.
    pub async fn process(&self, key: &str) -> Result<()> {
        process_key(&self.handlers, &self.store, key).await
    }

    #[cfg(test)]
    pub(crate) fn seed(&self, objects: Vec<K>) {
        let mut guard = self.writer.lock().unwrap();
        let writer = guard.as_mut().unwrap();
        writer.apply_watcher_event(&watcher::Event::Init);
        for obj in objects {
            writer.apply_watcher_event(&watcher::Event::InitApply(obj));
        }
        writer.apply_watcher_event(&watcher::Event::InitDone);
    }

    #[cfg(test)]
    pub(crate) fn apply(&self, event: watcher::Event<K>) {
        let mut guard = self.writer.lock().unwrap();
        guard.as_mut().unwrap().apply_watcher_event(&event);
    }
}

fn lookup<K: ManagedResource>(store: &Store<K>, key: &str) -> Option<Arc<K>> {
    let (namespace, name) = split_key(key);
    let mut obj_ref = ObjectRef::<K>::new(name);
    if !namespace.is_empty() {
        obj_ref = obj_ref.within(namespace);
    }
    store.get(&obj_ref)
}

async fn process_key<K: ManagedResource>(
    handlers: &NamedHandlers<K>,
    store: &Store<K>,
    key: &str,
) -> Result<()> {
    let mut obj = lookup(store, key);
    let snapshot: Vec<(String, HandlerFunc<K>)> = handlers
        .read()
        .map(|h| h.clone())
        .map_err(|_| Error::Handler("handler list poisoned".to_string()))?;

    // Each handler sees the object as the previous one left it.
    let mut failures = Vec::new();
    for (name, handler) in snapshot {
        match handler(key.to_string(), obj.clone()).await {
            Ok(Some(updated)) => obj = Some(Arc::new(updated)),
            Ok(None) => {}
            Err(e) => failures.push(format!("{name}: {e}")),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::Handler(failures.join(", ")))
    }
}

/// Takes one key off the queue and runs the handlers for it, scheduling a
/// retry after `delay` on failure. Returns false once the queue is closed.
async fn work_next<K: ManagedResource>(
    name: &str,
    queue: &Arc<WorkQueue>,
    handlers: &NamedHandlers<K>,
    store: &Store<K>,
    delay: Duration,
) -> bool {
    let Some(key) = queue.next().await else {
        return false;
    };
    let result = process_key(handlers, store, &key).await;
    queue.done(&key);
    if let Err(e) = result {
        error!("{} failed to process {}: {}", name, key, e);
        queue.add_after(key, delay);
    }
    true
}

#[async_trait]
impl<K: ManagedResource> Starter for GenericController<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, client: Client, threadiness: usize) -> Result<Vec<JoinHandle<()>>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        let writer = self
            .writer
            .lock()
            .ok()
            .and_then(|mut w| w.take())
            .ok_or_else(|| Error::CacheSync(format!("{}: store writer already taken", self.name)))?;

        let mut handles = Vec::with_capacity(threadiness + 1);

        let api = K::api(client, &self.namespace);
        let queue = self.queue.clone();
        let name = self.name.clone();
        handles.push(tokio::spawn(async move {
            info!("Starting {} reflector", name);
            let mut stream = reflector::reflector(writer, watcher(api, watcher::Config::default()).default_backoff())
                .touched_objects()
                .boxed();
            while let Some(result) = stream.next().await {
                match result {
                    Ok(obj) => queue.add(object_key(&obj)),
                    Err(e) => warn!("{} watch error: {:?}", name, e),
                }
            }
            warn!("{} reflector stream ended", name);
        }));

        for worker in 0..threadiness.max(1) {
            let queue = self.queue.clone();
            let store = self.store.clone();
            let handlers = self.handlers.clone();
            let name = self.name.clone();
            let delay = self.requeue_delay;
            handles.push(tokio::spawn(async move {
                if store.wait_until_ready().await.is_err() {
                    error!("{} worker {}: cache never became ready", name, worker);
                    return;
                }
                while work_next(&name, &queue, &handlers, &store, delay).await {}
            }));
        }

        info!("{} started with {} workers", self.name, threadiness.max(1));
        Ok(handles)
    }

    async fn sync(&self) -> Result<()> {
        self.store
            .wait_until_ready()
            .await
            .map_err(|e| Error::CacheSync(format!("{}: {:?}", self.name, e)))
    }
}
