use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::core::client::management_client::ManagementClient;
use crate::core::client::resource_client::ResourceClient;
use crate::core::controller::handler::FeatureGate;
use crate::domain::logging::service::logging_status_service::{LoggingResource, LoggingStatusLifecycle};

/// Names the status lifecycle registers under.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub name: String,
    pub cluster_name: Option<String>,
    pub enabled: bool,
}

impl From<&AppConfig> for LifecycleSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            name: config.lifecycle_name.clone(),
            cluster_name: config.cluster_name.clone(),
            enabled: config.logging_enabled,
        }
    }
}

/// Feature-gated, and cluster scoped when a cluster name is configured.
pub fn register_status_lifecycle<K: LoggingResource>(client: &ResourceClient<K>, settings: &LifecycleSettings) {
    let enabled = settings.enabled;
    let gate: FeatureGate = Arc::new(move || enabled);
    let lifecycle = Arc::new(LoggingStatusLifecycle::<K>::new());

    match settings.cluster_name.as_deref() {
        Some(cluster) => client.add_cluster_scoped_feature_lifecycle(gate, &settings.name, cluster, lifecycle),
        None => client.add_feature_lifecycle(gate, &settings.name, lifecycle),
    }
}

pub fn register(management: &ManagementClient, config: &AppConfig) {
    let settings = LifecycleSettings::from(config);
    register_status_lifecycle(&management.cluster_loggings(&config.watch_namespace), &settings);
    register_status_lifecycle(&management.project_loggings(&config.watch_namespace), &settings);
    info!(
        "Registered {} lifecycles (enabled: {}, cluster: {})",
        settings.name,
        settings.enabled,
        settings.cluster_name.as_deref().unwrap_or("-")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::management::v3::{
        ClusterLogging, ClusterLoggingSpec, ElasticsearchConfig, LoggingConditionType, LoggingTargets,
    };
    use crate::apis::management::v3::conditions::is_condition_true;
    use crate::core::client::management_client::ControllerRegistry;
    use crate::core::client::object_client::testing::MockObjectClient;
    use kube::ResourceExt;
    use std::time::Duration;

    fn client() -> (ResourceClient<ClusterLogging>, Arc<MockObjectClient<ClusterLogging>>) {
        let mock = Arc::new(MockObjectClient::new(""));
        let registry = Arc::new(ControllerRegistry::new(Duration::from_millis(10)));
        (ResourceClient::new("", mock.clone(), registry), mock)
    }

    fn logging(cluster: &str) -> ClusterLogging {
        let mut cl = ClusterLogging::new(
            "es",
            ClusterLoggingSpec {
                targets: LoggingTargets {
                    elasticsearch_config: Some(ElasticsearchConfig {
                        endpoint: Some("https://es:9200".into()),
                        index_prefix: Some(cluster.into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                cluster_name: cluster.into(),
                ..Default::default()
            },
        );
        cl.metadata.namespace = Some(cluster.into());
        cl
    }

    fn settings(cluster: Option<&str>, enabled: bool) -> LifecycleSettings {
        LifecycleSettings {
            name: "logging-status".into(),
            cluster_name: cluster.map(str::to_string),
            enabled,
        }
    }

    #[tokio::test]
    async fn registers_global_lifecycle() {
        let (client, mock) = client();
        register_status_lifecycle(&client, &settings(None, true));
        assert_eq!(client.controller().handler_names(), vec!["logging-status"]);

        client.controller().seed(vec![logging("c-a")]);
        client.controller().process("c-a/es").await.unwrap();

        let stored = mock.last_update().unwrap();
        assert_eq!(stored.finalizers(), &["controller.cattle.io/logging-status".to_string()]);
        let conditions = &stored.status.as_ref().unwrap().conditions;
        assert!(is_condition_true(conditions, LoggingConditionType::Provisioned));
        assert!(is_condition_true(conditions, LoggingConditionType::Updated));
    }

    #[tokio::test]
    async fn cluster_scoped_registration_only_touches_own_cluster() {
        let (client, mock) = client();
        register_status_lifecycle(&client, &settings(Some("c-a"), true));

        client.controller().seed(vec![logging("c-a"), logging("c-b")]);
        client.controller().process("c-b/es").await.unwrap();
        assert_eq!(mock.update_count(), 0);

        client.controller().process("c-a/es").await.unwrap();
        let stored = mock.last_update().unwrap();
        assert_eq!(
            stored.finalizers(),
            &["clusterscoped.controller.cattle.io/logging-status_c-a".to_string()]
        );
    }

    #[tokio::test]
    async fn disabled_gate_skips_everything() {
        let (client, mock) = client();
        register_status_lifecycle(&client, &settings(None, false));

        client.controller().seed(vec![logging("c-a")]);
        client.controller().process("c-a/es").await.unwrap();
        assert_eq!(mock.update_count(), 0);
    }

    #[test]
    fn settings_from_config() {
        let config = AppConfig {
            cluster_name: Some("local".into()),
            logging_enabled: false,
            ..Default::default()
        };
        let settings = LifecycleSettings::from(&config);
        assert_eq!(settings.name, "logging-status");
        assert_eq!(settings.cluster_name.as_deref(), Some("local"));
        assert!(!settings.enabled);
    }
}
