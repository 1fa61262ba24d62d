use crate::apis::management::v3::{ClusterLogging, ProjectLogging, Setting};
use crate::core::client::management_client::ManagementClient;
use crate::core::client::store::ResourceCache;

/// Caches shared with the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub cluster_loggings: ResourceCache<ClusterLogging>,
    pub project_loggings: ResourceCache<ProjectLogging>,
    pub settings: ResourceCache<Setting>,
}

pub fn build_app_state(management: &ManagementClient, namespace: &str) -> AppState {
    AppState {
        cluster_loggings: management.cluster_loggings(namespace).cache(),
        project_loggings: management.project_loggings(namespace).cache(),
        settings: management.settings().cache(),
    }
}
