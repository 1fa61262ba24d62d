use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use kube::runtime::reflector::{ObjectRef, Store};
use kube::ResourceExt;

use crate::apis::management::v3::resources::lower_camel_kind;
use crate::core::client::scope::{key_for, split_key, ManagedResource};
use crate::core::client::selector::Selector;
use crate::errors::{Error, Result};

/// Maps an object to the index keys it is filed under.
pub type IndexFunc<K> = Arc<dyn Fn(&K) -> Vec<String> + Send + Sync>;

/// Read-only view over a controller's reflector store. No API calls.
pub struct Lister<K: ManagedResource> {
    store: Store<K>,
}

impl<K: ManagedResource> Clone for Lister<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<K: ManagedResource> Lister<K> {
    pub fn new(store: Store<K>) -> Self {
        Self { store }
    }

    /// Cached object, or a NotFound error keyed the way the API server keys it.
    pub fn get(&self, namespace: &str, name: &str) -> Result<Arc<K>> {
        let mut obj_ref = ObjectRef::<K>::new(name);
        if !namespace.is_empty() {
            obj_ref = obj_ref.within(namespace);
        }
        self.store.get(&obj_ref).ok_or_else(|| {
            Error::not_found(
                &K::group(&()),
                &lower_camel_kind(&K::kind(&())),
                key_for(namespace, name),
            )
        })
    }

    pub fn get_by_key(&self, key: &str) -> Result<Arc<K>> {
        let (namespace, name) = split_key(key);
        self.get(namespace, name)
    }

    /// Objects in `namespace` (all namespaces when empty) matching `selector`.
    pub fn list(&self, namespace: &str, selector: &Selector) -> Vec<Arc<K>> {
        let mut items: Vec<Arc<K>> = self
            .store
            .state()
            .into_iter()
            .filter(|obj| namespace.is_empty() || obj.namespace().as_deref() == Some(namespace))
            .filter(|obj| selector.matches(Some(obj.labels())))
            .collect();
        items.sort_by_key(|obj| key_for(obj.namespace().as_deref().unwrap_or_default(), &obj.name_any()));
        items
    }

    pub fn store(&self) -> &Store<K> {
        &self.store
    }
}

/// Lister plus named secondary indexes.
pub struct ResourceCache<K: ManagedResource> {
    lister: Lister<K>,
    indexers: Arc<RwLock<BTreeMap<String, IndexFunc<K>>>>,
}

impl<K: ManagedResource> Clone for ResourceCache<K> {
    fn clone(&self) -> Self {
        Self {
            lister: self.lister.clone(),
            indexers: self.indexers.clone(),
        }
    }
}

impl<K: ManagedResource> ResourceCache<K> {
    pub fn new(store: Store<K>) -> Self {
        Self {
            lister: Lister::new(store),
            indexers: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn lister(&self) -> &Lister<K> {
        &self.lister
    }

    pub fn get(&self, namespace: &str, name: &str) -> Result<Arc<K>> {
        self.lister.get(namespace, name)
    }

    pub fn list(&self, namespace: &str, selector: &Selector) -> Vec<Arc<K>> {
        self.lister.list(namespace, selector)
    }

    /// Registers an index. Names are unique per cache.
    pub fn index<F>(&self, name: &str, indexer: F) -> Result<()>
    where
        F: Fn(&K) -> Vec<String> + Send + Sync + 'static,
    {
        let mut indexers = self
            .indexers
            .write()
            .map_err(|_| Error::IndexerConflict(format!("indexer lock poisoned while adding {name}")))?;
        if indexers.contains_key(name) {
            return Err(Error::IndexerConflict(format!("indexer {name} already exists")));
        }
        indexers.insert(name.to_string(), Arc::new(indexer));
        Ok(())
    }

    /// Objects filed under `key` in the index `name`.
    pub fn get_indexed(&self, name: &str, key: &str) -> Result<Vec<Arc<K>>> {
        let indexer = self
            .indexers
            .read()
            .ok()
            .and_then(|indexers| indexers.get(name).cloned())
            .ok_or_else(|| Error::UnknownIndex(name.to_string()))?;

        let mut items: Vec<Arc<K>> = self
            .lister
            .store
            .state()
            .into_iter()
            .filter(|obj| indexer(obj).iter().any(|k| k == key))
            .collect();
        items.sort_by_key(|obj| obj.name_any());
        Ok(items)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::seeded_store;
    use super::*;
    use crate::apis::management::v3::{ClusterLogging, ClusterLoggingSpec, Setting};
    use crate::errors::is_not_found;
    use std::collections::BTreeMap;

    fn cluster_logging(ns: &str, name: &str, cluster: &str, labels: &[(&str, &str)]) -> ClusterLogging {
        let mut cl = ClusterLogging::new(
            name,
            ClusterLoggingSpec {
                cluster_name: cluster.into(),
                ..Default::default()
            },
        );
        cl.metadata.namespace = Some(ns.into());
        cl.metadata.labels = Some(
            labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        );
        cl
    }

    fn cache() -> ResourceCache<ClusterLogging> {
        ResourceCache::new(seeded_store(vec![
            cluster_logging("c-a", "es", "c-a", &[("target", "es")]),
            cluster_logging("c-a", "kafka", "c-a", &[("target", "kafka")]),
            cluster_logging("c-b", "es", "c-b", &[("target", "es")]),
        ]))
    }

    #[test]
    fn get_hits_cache() {
        let cache = cache();
        let obj = cache.get("c-b", "es").unwrap();
        assert_eq!(obj.spec.cluster_name, "c-b");
        assert_eq!(cache.lister().get_by_key("c-a/kafka").unwrap().name_any(), "kafka");
    }

    #[test]
    fn get_miss_synthesizes_not_found() {
        let err = cache().get("c-a", "missing").unwrap_err();
        assert!(is_not_found(&err));
        match err {
            Error::NotFound { group, resource, name } => {
                assert_eq!(group, "management.cattle.io");
                assert_eq!(resource, "clusterLogging");
                assert_eq!(name, "c-a/missing");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn cluster_scoped_miss_uses_bare_name() {
        let lister = Lister::new(seeded_store(vec![Setting::new("server-url", "x")]));
        assert_eq!(lister.get("", "server-url").unwrap().value, "x");
        let err = lister.get("", "cacerts").unwrap_err();
        assert_eq!(err.to_string(), "setting.management.cattle.io \"cacerts\" not found");
    }

    #[test]
    fn list_filters_namespace_and_selector() {
        let cache = cache();
        let all = cache.list("", &Selector::everything());
        assert_eq!(all.len(), 3);

        let in_a = cache.list("c-a", &Selector::everything());
        assert_eq!(in_a.len(), 2);

        let es = cache.list("", &Selector::parse("target=es").unwrap());
        let keys: Vec<String> = es
            .iter()
            .map(|o| format!("{}/{}", o.namespace().unwrap(), o.name_any()))
            .collect();
        assert_eq!(keys, vec!["c-a/es", "c-b/es"]);
    }

    #[test]
    fn indexes() {
        let cache = cache();
        cache
            .index("byCluster", |cl: &ClusterLogging| vec![cl.spec.cluster_name.clone()])
            .unwrap();

        let err = cache.index("byCluster", |_: &ClusterLogging| Vec::new()).unwrap_err();
        assert!(matches!(err, Error::IndexerConflict(_)));

        let in_a = cache.get_indexed("byCluster", "c-a").unwrap();
        assert_eq!(in_a.len(), 2);
        assert!(cache.get_indexed("byCluster", "c-z").unwrap().is_empty());

        let err = cache.get_indexed("byProject", "p-1").unwrap_err();
        assert!(matches!(err, Error::UnknownIndex(_)));
    }
}
