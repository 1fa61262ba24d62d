use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use kube::ResourceExt;
use tracing::{debug, warn};

use crate::core::client::object_client::ObjectClient;
use crate::core::client::scope::ManagedResource;
use crate::core::controller::handler::HandlerFunc;
use crate::errors::Result;

pub const CREATED_ANNOTATION_PREFIX: &str = "lifecycle.cattle.io/create.";
pub const FINALIZER_PREFIX: &str = "controller.cattle.io/";
pub const CLUSTER_SCOPED_FINALIZER_PREFIX: &str = "clusterscoped.controller.cattle.io/";

/// Typed create / remove / updated callbacks.
///
/// Each callback gets its own copy of the object and returns the modified
/// copy, or `None` when it left the object alone.
#[async_trait]
pub trait Lifecycle<K: ManagedResource>: Send + Sync {
    async fn create(&self, _obj: K) -> Result<Option<K>> {
        Ok(None)
    }

    async fn remove(&self, _obj: K) -> Result<Option<K>> {
        Ok(None)
    }

    async fn updated(&self, obj: K) -> Result<Option<K>>;

    fn has_create(&self) -> bool {
        true
    }

    /// Whether `remove` must run before the object may go away.
    fn has_finalize(&self) -> bool {
        true
    }
}

/// Drives a `Lifecycle` from controller events, tracking progress on the
/// object itself through a finalizer and a created annotation.
pub struct ObjectLifecycleAdapter<K: ManagedResource> {
    name: String,
    cluster_scoped: bool,
    lifecycle: Arc<dyn Lifecycle<K>>,
    client: Arc<dyn ObjectClient<K>>,
}

impl<K: ManagedResource> ObjectLifecycleAdapter<K> {
    pub fn new(
        name: impl Into<String>,
        cluster_scoped: bool,
        lifecycle: Arc<dyn Lifecycle<K>>,
        client: Arc<dyn ObjectClient<K>>,
    ) -> Self {
        Self {
            name: name.into(),
            cluster_scoped,
            lifecycle,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn finalizer_key(&self) -> String {
        if self.cluster_scoped {
            format!("{CLUSTER_SCOPED_FINALIZER_PREFIX}{}", self.name)
        } else {
            format!("{FINALIZER_PREFIX}{}", self.name)
        }
    }

    pub fn created_annotation(&self) -> String {
        format!("{CREATED_ANNOTATION_PREFIX}{}", self.name)
    }

    fn is_initialized(&self, obj: &K) -> bool {
        obj.annotations()
            .get(&self.created_annotation())
            .is_some_and(|v| v == "true")
    }

    fn has_finalizer(&self, obj: &K) -> bool {
        let key = self.finalizer_key();
        obj.finalizers().iter().any(|f| *f == key)
    }

    /// Handles one controller event. Returns the stored object when an update
    /// was written.
    pub async fn sync(&self, key: &str, obj: Option<Arc<K>>) -> Result<Option<K>> {
        let Some(obj) = obj else {
            return Ok(None);
        };
        let original = (*obj).clone();

        if original.meta().deletion_timestamp.is_some() {
            return self.finalize(key, original).await;
        }

        let mut current = original.clone();

        if !self.is_initialized(&current) {
            if self.lifecycle.has_finalize() && !self.has_finalizer(&current) {
                current.finalizers_mut().push(self.finalizer_key());
            }
            if self.lifecycle.has_create() {
                match self.lifecycle.create(current.clone()).await {
                    Ok(Some(created)) => current = created,
                    Ok(None) => {}
                    Err(e) => {
                        // Keep the finalizer even though create failed.
                        self.persist_if_changed(&original, &current).await?;
                        return Err(e);
                    }
                }
            }
            current
                .annotations_mut()
                .insert(self.created_annotation(), "true".to_string());
            debug!("{}: initialized {}", self.name, key);
        }

        match self.lifecycle.updated(current.clone()).await {
            Ok(Some(updated)) => current = updated,
            Ok(None) => {}
            Err(e) => {
                self.persist_if_changed(&original, &current).await?;
                return Err(e);
            }
        }

        self.persist_if_changed(&original, &current).await
    }

    async fn finalize(&self, key: &str, obj: K) -> Result<Option<K>> {
        if !self.has_finalizer(&obj) {
            return Ok(None);
        }

        let mut current = self.lifecycle.remove(obj.clone()).await?.unwrap_or(obj);
        let finalizer = self.finalizer_key();
        current.finalizers_mut().retain(|f| *f != finalizer);
        debug!("{}: removing finalizer from {}", self.name, key);

        let stored = self.client.update(&current.name_any(), &current).await?;
        Ok(Some(stored))
    }

    async fn persist_if_changed(&self, original: &K, current: &K) -> Result<Option<K>> {
        if serde_json::to_value(original)? == serde_json::to_value(current)? {
            return Ok(None);
        }
        let stored = self.client.update(&current.name_any(), current).await?;
        Ok(Some(stored))
    }

    pub fn into_handler(self) -> HandlerFunc<K> {
        let adapter = Arc::new(self);
        Arc::new(move |key: String, obj: Option<Arc<K>>| {
            let adapter = adapter.clone();
            async move {
                let result = adapter.sync(&key, obj).await;
                if let Err(e) = &result {
                    warn!("{}: lifecycle failed for {}: {}", adapter.name, key, e);
                }
                result
            }
            .boxed()
        })
    }
}

pub type LifecycleFn<K> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<Option<K>>> + Send + Sync>;

fn lifecycle_fn<K, F, Fut>(f: F) -> LifecycleFn<K>
where
    K: ManagedResource,
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<K>>> + Send + 'static,
{
    Arc::new(move |obj| f(obj).boxed())
}

/// A `Lifecycle` assembled from optional closures.
pub struct LifecycleDelegate<K: ManagedResource> {
    create: Option<LifecycleFn<K>>,
    change: Option<LifecycleFn<K>>,
    remove: Option<LifecycleFn<K>>,
}

impl<K: ManagedResource> Default for LifecycleDelegate<K> {
    fn default() -> Self {
        Self {
            create: None,
            change: None,
            remove: None,
        }
    }
}

impl<K: ManagedResource> LifecycleDelegate<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<K>>> + Send + 'static,
    {
        self.create = Some(lifecycle_fn(f));
        self
    }

    pub fn on_change<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<K>>> + Send + 'static,
    {
        self.change = Some(lifecycle_fn(f));
        self
    }

    pub fn on_remove<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<K>>> + Send + 'static,
    {
        self.remove = Some(lifecycle_fn(f));
        self
    }
}

#[async_trait]
impl<K: ManagedResource> Lifecycle<K> for LifecycleDelegate<K> {
    async fn create(&self, obj: K) -> Result<Option<K>> {
        match &self.create {
            Some(f) => f(obj).await,
            None => Ok(None),
        }
    }

    async fn remove(&self, obj: K) -> Result<Option<K>> {
        match &self.remove {
            Some(f) => f(obj).await,
            None => Ok(None),
        }
    }

    async fn updated(&self, obj: K) -> Result<Option<K>> {
        match &self.change {
            Some(f) => f(obj).await,
            None => Ok(None),
        }
    }

    fn has_create(&self) -> bool {
        self.create.is_some()
    }

    fn has_finalize(&self) -> bool {
        self.remove.is_some()
    }
}
