use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use kube::api::{DeleteParams, ListParams, ObjectList, Patch, PatchParams, PostParams};
use kube::runtime::watcher;
use kube::{Api, Client, ResourceExt};
use serde_json::Value;
use tracing::debug;

use crate::core::client::scope::ManagedResource;
use crate::errors::{Error, Result};

/// REST operations on one kind, bound to a default namespace.
///
/// `create`, `update` and `patch` target the object's own namespace when it
/// carries one and fall back to the client's namespace otherwise.
#[async_trait]
pub trait ObjectClient<K: ManagedResource>: Send + Sync {
    fn namespace(&self) -> &str;

    async fn create(&self, obj: &K) -> Result<K>;

    async fn get(&self, name: &str) -> Result<K>;

    async fn get_namespaced(&self, namespace: &str, name: &str) -> Result<K>;

    /// Persists the whole object, status included.
    async fn update(&self, name: &str, obj: &K) -> Result<K>;

    async fn delete(&self, name: &str, dp: &DeleteParams) -> Result<()>;

    async fn delete_namespaced(&self, namespace: &str, name: &str, dp: &DeleteParams) -> Result<()>;

    async fn list(&self, lp: &ListParams) -> Result<ObjectList<K>>;

    async fn patch(&self, obj: &K, pp: &PatchParams, patch: &Patch<Value>) -> Result<K>;

    async fn delete_collection(&self, dp: &DeleteParams, lp: &ListParams) -> Result<()>;

    /// Event stream for the client's namespace.
    fn watch(&self, config: watcher::Config) -> BoxStream<'static, Result<watcher::Event<K>>>;
}

pub(crate) fn target_namespace<'a, K: ManagedResource>(obj: &'a K, fallback: &'a str) -> &'a str {
    match obj.meta().namespace.as_deref() {
        Some(ns) if !ns.is_empty() => ns,
        _ => fallback,
    }
}

/// Body for a `replace_status` call after `replaced` came back from the main
/// resource: the stored object carrying `wanted`'s status. `None` when the
/// server already holds that status or `wanted` has none.
///
/// The whole status is replaced so fields cleared in `wanted` are cleared on
/// the server too.
pub(crate) fn status_replacement<K: ManagedResource>(wanted: &K, replaced: &K) -> Result<Option<Value>> {
    let status = match serde_json::to_value(wanted)?.get("status") {
        Some(status) if !status.is_null() => status.clone(),
        _ => return Ok(None),
    };
    let mut body = serde_json::to_value(replaced)?;
    if body.get("status") == Some(&status) {
        return Ok(None);
    }
    match body.as_object_mut() {
        Some(fields) => {
            fields.insert("status".to_string(), status);
            Ok(Some(body))
        }
        None => Ok(None),
    }
}

/// `ObjectClient` backed by the API server.
#[derive(Clone)]
pub struct KubeObjectClient<K: ManagedResource> {
    client: Client,
    namespace: String,
    api: Api<K>,
}

impl<K: ManagedResource> KubeObjectClient<K> {
    pub fn new(client: Client, namespace: &str) -> Self {
        let api = K::api(client.clone(), namespace);
        Self {
            client,
            namespace: namespace.to_string(),
            api,
        }
    }

    fn api_in(&self, namespace: &str) -> Api<K> {
        if namespace == self.namespace {
            self.api.clone()
        } else {
            K::api(self.client.clone(), namespace)
        }
    }
}

#[async_trait]
impl<K: ManagedResource> ObjectClient<K> for KubeObjectClient<K> {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn create(&self, obj: &K) -> Result<K> {
        let api = self.api_in(target_namespace(obj, &self.namespace));
        let created = api.create(&PostParams::default(), obj).await?;
        debug!("Created {} {}", K::kind(&()), created.name_any());
        Ok(created)
    }

    async fn get(&self, name: &str) -> Result<K> {
        Ok(self.api.get(name).await?)
    }

    async fn get_namespaced(&self, namespace: &str, name: &str) -> Result<K> {
        Ok(self.api_in(namespace).get(name).await?)
    }

    async fn update(&self, name: &str, obj: &K) -> Result<K> {
        let api = self.api_in(target_namespace(obj, &self.namespace));
        let replaced = api.replace(name, &PostParams::default(), obj).await?;

        // The main resource ignores status when the kind has a status subresource.
        match status_replacement(obj, &replaced)? {
            Some(body) => {
                debug!("Writing status of {} {}", K::kind(&()), name);
                let data = serde_json::to_vec(&body)?;
                Ok(api.replace_status(name, &PostParams::default(), data).await?)
            }
            None => Ok(replaced),
        }
    }

    async fn delete(&self, name: &str, dp: &DeleteParams) -> Result<()> {
        self.api.delete(name, dp).await?;
        Ok(())
    }

    async fn delete_namespaced(&self, namespace: &str, name: &str, dp: &DeleteParams) -> Result<()> {
        self.api_in(namespace).delete(name, dp).await?;
        Ok(())
    }

    async fn list(&self, lp: &ListParams) -> Result<ObjectList<K>> {
        Ok(self.api.list(lp).await?)
    }

    async fn patch(&self, obj: &K, pp: &PatchParams, patch: &Patch<Value>) -> Result<K> {
        let api = self.api_in(target_namespace(obj, &self.namespace));
        Ok(api.patch(&obj.name_any(), pp, patch).await?)
    }

    async fn delete_collection(&self, dp: &DeleteParams, lp: &ListParams) -> Result<()> {
        self.api.delete_collection(dp, lp).await?;
        Ok(())
    }

    fn watch(&self, config: watcher::Config) -> BoxStream<'static, Result<watcher::Event<K>>> {
        watcher(self.api.clone(), config)
            .map(|event| event.map_err(Error::from))
            .boxed()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::core::client::scope::key_for;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;

    /// In-memory `ObjectClient` recording every write.
    pub struct MockObjectClient<K> {
        namespace: String,
        pub objects: Mutex<BTreeMap<String, K>>,
        pub updates: Mutex<Vec<K>>,
    }

    impl<K: ManagedResource> MockObjectClient<K> {
        pub fn new(namespace: &str) -> Self {
            Self {
                namespace: namespace.to_string(),
                objects: Mutex::new(BTreeMap::new()),
                updates: Mutex::new(Vec::new()),
            }
        }

        pub fn update_count(&self) -> usize {
            self.updates.lock().unwrap().len()
        }

        pub fn last_update(&self) -> Option<K> {
            self.updates.lock().unwrap().last().cloned()
        }

        fn not_found(name: &str) -> Error {
            Error::not_found(&K::group(&()), &K::plural(&()), name)
        }
    }

    #[async_trait]
    impl<K: ManagedResource> ObjectClient<K> for MockObjectClient<K> {
        fn namespace(&self) -> &str {
            &self.namespace
        }

        async fn create(&self, obj: &K) -> Result<K> {
            let mut created = obj.clone();
            let ns = target_namespace(obj, &self.namespace).to_string();
            if K::NAMESPACED {
                created.meta_mut().namespace = Some(ns.clone());
            }
            let key = key_for(if K::NAMESPACED { &ns } else { "" }, &obj.name_any());
            self.objects.lock().unwrap().insert(key, created.clone());
            Ok(created)
        }

        async fn get(&self, name: &str) -> Result<K> {
            self.get_namespaced(&self.namespace, name).await
        }

        async fn get_namespaced(&self, namespace: &str, name: &str) -> Result<K> {
            let key = key_for(namespace, name);
            self.objects
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or_else(|| Self::not_found(&key))
        }

        async fn update(&self, name: &str, obj: &K) -> Result<K> {
            let key = key_for(target_namespace(obj, &self.namespace), name);
            self.objects.lock().unwrap().insert(key, obj.clone());
            self.updates.lock().unwrap().push(obj.clone());
            Ok(obj.clone())
        }

        async fn delete(&self, name: &str, dp: &DeleteParams) -> Result<()> {
            let namespace = self.namespace.clone();
            self.delete_namespaced(&namespace, name, dp).await
        }

        async fn delete_namespaced(&self, namespace: &str, name: &str, _dp: &DeleteParams) -> Result<()> {
            let key = key_for(namespace, name);
            self.objects
                .lock()
                .unwrap()
                .remove(&key)
                .map(|_| ())
                .ok_or_else(|| Self::not_found(&key))
        }

        async fn list(&self, _lp: &ListParams) -> Result<ObjectList<K>> {
            let items = self.objects.lock().unwrap().values().cloned().collect();
            Ok(ObjectList {
                types: Default::default(),
                metadata: ListMeta::default(),
                items,
            })
        }

        async fn patch(&self, obj: &K, _pp: &PatchParams, _patch: &Patch<Value>) -> Result<K> {
            self.update(&obj.name_any(), obj).await
        }

        async fn delete_collection(&self, _dp: &DeleteParams, _lp: &ListParams) -> Result<()> {
            self.objects.lock().unwrap().clear();
            Ok(())
        }

        fn watch(&self, _config: watcher::Config) -> BoxStream<'static, Result<watcher::Event<K>>> {
            futures::stream::empty().boxed()
        }
    }
}
