use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kube::{Client, Resource};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::apis::management::v3::{ClusterLogging, ProjectLogging, Setting};
use crate::core::client::object_client::KubeObjectClient;
use crate::core::client::resource_client::ResourceClient;
use crate::core::client::scope::ManagedResource;
use crate::core::controller::generic_controller::{GenericController, Starter};
use crate::errors::Result;

type ControllerKey = (TypeId, String);

/// One controller per (kind, namespace), created on first use and shared by
/// every client of that pair.
pub struct ControllerRegistry {
    requeue_delay: Duration,
    controllers: Mutex<HashMap<ControllerKey, Arc<dyn Any + Send + Sync>>>,
    starters: Mutex<Vec<Arc<dyn Starter>>>,
}

impl ControllerRegistry {
    pub fn new(requeue_delay: Duration) -> Self {
        Self {
            requeue_delay,
            controllers: Mutex::new(HashMap::new()),
            starters: Mutex::new(Vec::new()),
        }
    }

    pub fn controller<K: ManagedResource>(&self, namespace: &str) -> Arc<GenericController<K>> {
        let key = (TypeId::of::<K>(), namespace.to_string());
        let mut controllers = self.controllers.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = controllers
            .get(&key)
            .and_then(|c| c.clone().downcast::<GenericController<K>>().ok())
        {
            return existing;
        }

        let name = format!("{}Controller", K::kind(&()));
        debug!("Creating {} for namespace {:?}", name, namespace);
        let controller = Arc::new(GenericController::<K>::new(name, namespace).with_requeue_delay(self.requeue_delay));
        controllers.insert(key, controller.clone());
        self.starters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(controller.clone());
        controller
    }

    pub fn starter_count(&self) -> usize {
        self.starters.lock().map(|s| s.len()).unwrap_or_default()
    }

    fn starters(&self) -> Vec<Arc<dyn Starter>> {
        self.starters.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Starts every registered controller that is not running yet.
    pub fn start(&self, client: Client, threadiness: usize) -> Result<Vec<JoinHandle<()>>> {
        let mut handles = Vec::new();
        for starter in self.starters() {
            handles.extend(starter.start(client.clone(), threadiness)?);
        }
        Ok(handles)
    }

    /// Waits for every registered controller's cache.
    pub async fn sync(&self) -> Result<()> {
        for starter in self.starters() {
            starter.sync().await?;
            debug!("{} cache synced", starter.name());
        }
        Ok(())
    }
}

/// Entry point to the `management.cattle.io/v3` clients.
#[derive(Clone)]
pub struct ManagementClient {
    client: Client,
    registry: Arc<ControllerRegistry>,
}

impl ManagementClient {
    pub fn new(client: Client, requeue_delay: Duration) -> Self {
        Self {
            client,
            registry: Arc::new(ControllerRegistry::new(requeue_delay)),
        }
    }

    pub fn registry(&self) -> Arc<ControllerRegistry> {
        self.registry.clone()
    }

    pub fn resource<K: ManagedResource>(&self, namespace: &str) -> ResourceClient<K> {
        let objects = Arc::new(KubeObjectClient::<K>::new(self.client.clone(), namespace));
        ResourceClient::new(namespace, objects, self.registry.clone())
    }

    pub fn cluster_loggings(&self, namespace: &str) -> ResourceClient<ClusterLogging> {
        self.resource(namespace)
    }

    pub fn project_loggings(&self, namespace: &str) -> ResourceClient<ProjectLogging> {
        self.resource(namespace)
    }

    pub fn settings(&self) -> ResourceClient<Setting> {
        self.resource("")
    }

    pub fn start(&self, threadiness: usize) -> Result<Vec<JoinHandle<()>>> {
        info!(
            "Starting {} management controllers ({} group)",
            self.registry.starter_count(),
            Setting::group(&())
        );
        self.registry.start(self.client.clone(), threadiness)
    }

    pub async fn sync(&self) -> Result<()> {
        self.registry.sync().await?;
        info!("Management controller caches synced");
        Ok(())
    }
}
