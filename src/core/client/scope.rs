use std::fmt::Debug;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::apis::management::v3::{ClusterLogging, ProjectLogging, Setting};

pub const PROJECT_ID_ANNOTATION: &str = "field.cattle.io/projectId";

/// A kind the management client can build clients, caches and controllers for.
pub trait ManagedResource:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const NAMESPACED: bool;

    /// Api handle for `namespace`; an empty namespace means all namespaces.
    fn api(client: Client, namespace: &str) -> Api<Self>;

    /// Name of the cluster this object belongs to, if any.
    fn owning_cluster(&self) -> Option<String> {
        cluster_from_meta(self.meta())
    }
}

/// Cluster prefix of the `projectId` annotation, falling back to the namespace.
pub fn cluster_from_meta(meta: &ObjectMeta) -> Option<String> {
    let from_annotation = meta
        .annotations
        .as_ref()
        .and_then(|a| a.get(PROJECT_ID_ANNOTATION))
        .and_then(|id| id.split_once(':'))
        .map(|(cluster, _)| cluster.to_string())
        .filter(|c| !c.is_empty());

    from_annotation.or_else(|| meta.namespace.clone().filter(|ns| !ns.is_empty()))
}

/// `namespace/name`, or `name` for cluster-scoped objects.
pub fn object_key<K: Resource>(obj: &K) -> String {
    key_for(obj.namespace().as_deref().unwrap_or_default(), &obj.name_any())
}

pub fn key_for(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}/{name}")
    }
}

/// Splits a cache key back into `(namespace, name)`.
pub fn split_key(key: &str) -> (&str, &str) {
    key.split_once('/').unwrap_or(("", key))
}

fn namespaced_api<K>(client: Client, namespace: &str) -> Api<K>
where
    K: Resource<DynamicType = (), Scope = k8s_openapi::NamespaceResourceScope>,
{
    if namespace.is_empty() {
        Api::all(client)
    } else {
        Api::namespaced(client, namespace)
    }
}

impl ManagedResource for ClusterLogging {
    const NAMESPACED: bool = true;

    fn api(client: Client, namespace: &str) -> Api<Self> {
        namespaced_api(client, namespace)
    }

    fn owning_cluster(&self) -> Option<String> {
        if self.spec.cluster_name.is_empty() {
            cluster_from_meta(&self.metadata)
        } else {
            Some(self.spec.cluster_name.clone())
        }
    }
}

impl ManagedResource for ProjectLogging {
    const NAMESPACED: bool = true;

    fn api(client: Client, namespace: &str) -> Api<Self> {
        namespaced_api(client, namespace)
    }

    fn owning_cluster(&self) -> Option<String> {
        self.spec
            .cluster_name()
            .map(str::to_string)
            .or_else(|| cluster_from_meta(&self.metadata))
    }
}

impl ManagedResource for Setting {
    const NAMESPACED: bool = false;

    fn api(client: Client, _namespace: &str) -> Api<Self> {
        Api::all(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::management::v3::{ClusterLoggingSpec, ProjectLoggingSpec};
    use std::collections::BTreeMap;

    fn meta(ns: Option<&str>, project_id: Option<&str>) -> ObjectMeta {
        ObjectMeta {
            name: Some("obj".into()),
            namespace: ns.map(str::to_string),
            annotations: project_id.map(|id| {
                BTreeMap::from([(PROJECT_ID_ANNOTATION.to_string(), id.to_string())])
            }),
            ..Default::default()
        }
    }

    #[test]
    fn cluster_logging_prefers_spec_cluster_name() {
        let mut cl = ClusterLogging::new(
            "es",
            ClusterLoggingSpec {
                cluster_name: "c-abc".into(),
                ..Default::default()
            },
        );
        cl.metadata = meta(Some("c-other"), None);
        assert_eq!(cl.owning_cluster().as_deref(), Some("c-abc"));

        cl.spec.cluster_name.clear();
        assert_eq!(cl.owning_cluster().as_deref(), Some("c-other"));
    }

    #[test]
    fn project_logging_uses_project_prefix() {
        let mut pl = ProjectLogging::new(
            "es",
            ProjectLoggingSpec {
                project_name: "c-abc:p-xyz".into(),
                ..Default::default()
            },
        );
        pl.metadata = meta(Some("p-xyz"), Some("c-def:p-xyz"));
        assert_eq!(pl.owning_cluster().as_deref(), Some("c-abc"));

        pl.spec.project_name = "p-xyz".into();
        assert_eq!(pl.owning_cluster().as_deref(), Some("c-def"));
    }

    #[test]
    fn metadata_fallbacks() {
        assert_eq!(cluster_from_meta(&meta(Some("ns"), None)).as_deref(), Some("ns"));
        assert_eq!(cluster_from_meta(&meta(None, None)), None);
        assert_eq!(
            cluster_from_meta(&meta(Some("ns"), Some("c-1:p-1"))).as_deref(),
            Some("c-1")
        );
    }

    #[test]
    fn keys() {
        assert_eq!(key_for("ns", "a"), "ns/a");
        assert_eq!(key_for("", "a"), "a");
        assert_eq!(split_key("ns/a"), ("ns", "a"));
        assert_eq!(split_key("a"), ("", "a"));

        let setting = Setting::new("server-url", "x");
        assert_eq!(object_key(&setting), "server-url");
    }
}
