use std::future::Future;
use std::sync::Arc;

use futures::stream::BoxStream;
use kube::api::{DeleteParams, ListParams, ObjectList, Patch, PatchParams};
use kube::runtime::watcher;
use kube::ResourceExt;
use serde_json::Value;

use crate::core::client::management_client::ControllerRegistry;
use crate::core::client::object_client::ObjectClient;
use crate::core::client::scope::ManagedResource;
use crate::core::client::store::ResourceCache;
use crate::core::controller::generic_controller::GenericController;
use crate::core::controller::handler::{cluster_scoped_handler, feature_handler, FeatureGate, HandlerFunc};
use crate::core::controller::lifecycle::{Lifecycle, LifecycleDelegate, ObjectLifecycleAdapter};
use crate::errors::Result;

/// Typed client for one kind in one namespace: REST calls, the shared
/// controller and its cache.
pub struct ResourceClient<K: ManagedResource> {
    namespace: String,
    objects: Arc<dyn ObjectClient<K>>,
    registry: Arc<ControllerRegistry>,
}

impl<K: ManagedResource> Clone for ResourceClient<K> {
    fn clone(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            objects: self.objects.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<K: ManagedResource> ResourceClient<K> {
    pub fn new(namespace: &str, objects: Arc<dyn ObjectClient<K>>, registry: Arc<ControllerRegistry>) -> Self {
        Self {
            namespace: namespace.to_string(),
            objects,
            registry,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn object_client(&self) -> Arc<dyn ObjectClient<K>> {
        self.objects.clone()
    }

    pub async fn create(&self, obj: &K) -> Result<K> {
        self.objects.create(obj).await
    }

    pub async fn get(&self, name: &str) -> Result<K> {
        self.objects.get(name).await
    }

    pub async fn get_namespaced(&self, namespace: &str, name: &str) -> Result<K> {
        self.objects.get_namespaced(namespace, name).await
    }

    pub async fn update(&self, obj: &K) -> Result<K> {
        self.objects.update(&obj.name_any(), obj).await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        self.objects.delete(name, &DeleteParams::default()).await
    }

    pub async fn delete_namespaced(&self, namespace: &str, name: &str) -> Result<()> {
        self.objects
            .delete_namespaced(namespace, name, &DeleteParams::default())
            .await
    }

    pub async fn list(&self, lp: &ListParams) -> Result<ObjectList<K>> {
        self.objects.list(lp).await
    }

    pub fn watch(&self, config: watcher::Config) -> BoxStream<'static, Result<watcher::Event<K>>> {
        self.objects.watch(config)
    }

    pub async fn patch(&self, obj: &K, pp: &PatchParams, patch: &Patch<Value>) -> Result<K> {
        self.objects.patch(obj, pp, patch).await
    }

    pub async fn delete_collection(&self, dp: &DeleteParams, lp: &ListParams) -> Result<()> {
        self.objects.delete_collection(dp, lp).await
    }

    /// The controller shared by every client of this kind and namespace.
    pub fn controller(&self) -> Arc<GenericController<K>> {
        self.registry.controller::<K>(&self.namespace)
    }

    pub fn cache(&self) -> ResourceCache<K> {
        self.controller().cache()
    }

    pub fn enqueue(&self, namespace: &str, name: &str) {
        self.controller().enqueue(namespace, name);
    }

    pub fn add_handler(&self, name: &str, handler: HandlerFunc<K>) {
        self.controller().add_handler(name, handler);
    }

    pub fn add_feature_handler(&self, gate: FeatureGate, name: &str, handler: HandlerFunc<K>) {
        self.add_handler(name, feature_handler(gate, handler));
    }

    pub fn add_cluster_scoped_handler(&self, name: &str, cluster_name: &str, handler: HandlerFunc<K>) {
        self.add_handler(name, cluster_scoped_handler(cluster_name, handler));
    }

    pub fn add_cluster_scoped_feature_handler(
        &self,
        gate: FeatureGate,
        name: &str,
        cluster_name: &str,
        handler: HandlerFunc<K>,
    ) {
        self.add_handler(name, feature_handler(gate, cluster_scoped_handler(cluster_name, handler)));
    }

    fn lifecycle_handler(&self, name: &str, cluster_scoped: bool, lifecycle: Arc<dyn Lifecycle<K>>) -> HandlerFunc<K> {
        ObjectLifecycleAdapter::new(name, cluster_scoped, lifecycle, self.objects.clone()).into_handler()
    }

    pub fn add_lifecycle(&self, name: &str, lifecycle: Arc<dyn Lifecycle<K>>) {
        let handler = self.lifecycle_handler(name, false, lifecycle);
        self.add_handler(name, handler);
    }

    pub fn add_feature_lifecycle(&self, gate: FeatureGate, name: &str, lifecycle: Arc<dyn Lifecycle<K>>) {
        let handler = self.lifecycle_handler(name, false, lifecycle);
        self.add_feature_handler(gate, name, handler);
    }

    /// The lifecycle runs as `<name>_<cluster>` so each cluster keeps its own
    /// finalizer and created marker.
    pub fn add_cluster_scoped_lifecycle(&self, name: &str, cluster_name: &str, lifecycle: Arc<dyn Lifecycle<K>>) {
        let handler = self.lifecycle_handler(&format!("{name}_{cluster_name}"), true, lifecycle);
        self.add_cluster_scoped_handler(name, cluster_name, handler);
    }

    pub fn add_cluster_scoped_feature_lifecycle(
        &self,
        gate: FeatureGate,
        name: &str,
        cluster_name: &str,
        lifecycle: Arc<dyn Lifecycle<K>>,
    ) {
        let handler = self.lifecycle_handler(&format!("{name}_{cluster_name}"), true, lifecycle);
        self.add_cluster_scoped_feature_handler(gate, name, cluster_name, handler);
    }

    pub fn on_create<F, Fut>(&self, name: &str, sync: F)
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<K>>> + Send + 'static,
    {
        self.add_lifecycle(&format!("{name}-create"), Arc::new(LifecycleDelegate::new().on_create(sync)));
    }

    pub fn on_change<F, Fut>(&self, name: &str, sync: F)
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<K>>> + Send + 'static,
    {
        self.add_lifecycle(&format!("{name}-change"), Arc::new(LifecycleDelegate::new().on_change(sync)));
    }

    pub fn on_remove<F, Fut>(&self, name: &str, sync: F)
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<K>>> + Send + 'static,
    {
        self.add_lifecycle(name, Arc::new(LifecycleDelegate::new().on_remove(sync)));
    }
}
