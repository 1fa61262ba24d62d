use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::trace;

use crate::core::client::scope::ManagedResource;
use crate::errors::Result;

/// Called with the cache key and the cached object, `None` once it is gone.
/// A returned object is the handler's updated copy.
pub type HandlerFunc<K> =
    Arc<dyn Fn(String, Option<Arc<K>>) -> BoxFuture<'static, Result<Option<K>>> + Send + Sync>;

pub type FeatureGate = Arc<dyn Fn() -> bool + Send + Sync>;

pub fn handler_fn<K, F, Fut>(f: F) -> HandlerFunc<K>
where
    K: ManagedResource,
    F: Fn(String, Option<Arc<K>>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<K>>> + Send + 'static,
{
    Arc::new(move |key, obj| f(key, obj).boxed())
}

/// Skips `handler` while the gate is closed.
pub fn feature_handler<K: ManagedResource>(gate: FeatureGate, handler: HandlerFunc<K>) -> HandlerFunc<K> {
    Arc::new(move |key, obj| {
        if gate() {
            handler(key, obj)
        } else {
            trace!("feature disabled, skipping {}", key);
            futures::future::ready(Ok(None)).boxed()
        }
    })
}

/// Only passes objects owned by `cluster_name`. Deletions always pass.
pub fn cluster_scoped_handler<K: ManagedResource>(cluster_name: &str, handler: HandlerFunc<K>) -> HandlerFunc<K> {
    let cluster_name = cluster_name.to_string();
    Arc::new(move |key, obj| match obj {
        None => handler(key, None),
        Some(o) if o.owning_cluster().as_deref() == Some(cluster_name.as_str()) => handler(key, Some(o)),
        Some(_) => futures::future::ready(Ok(None)).boxed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::management::v3::{ClusterLogging, ClusterLoggingSpec};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn counting(counter: Arc<AtomicUsize>) -> HandlerFunc<ClusterLogging> {
        handler_fn(move |_key, _obj: Option<Arc<ClusterLogging>>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        })
    }

    fn logging_for(cluster: &str) -> Arc<ClusterLogging> {
        Arc::new(ClusterLogging::new(
            "es",
            ClusterLoggingSpec {
                cluster_name: cluster.into(),
                ..Default::default()
            },
        ))
    }

    #[tokio::test]
    async fn feature_gate_toggles_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let enabled = Arc::new(AtomicBool::new(false));
        let gate_flag = enabled.clone();
        let gate: FeatureGate = Arc::new(move || gate_flag.load(Ordering::SeqCst));
        let handler = feature_handler(gate, counting(calls.clone()));

        handler("ns/es".into(), None).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        enabled.store(true, Ordering::SeqCst);
        handler("ns/es".into(), None).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cluster_scope_filters_foreign_objects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = cluster_scoped_handler("c-a", counting(calls.clone()));

        handler("ns/es".into(), Some(logging_for("c-b"))).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        handler("ns/es".into(), Some(logging_for("c-a"))).await.unwrap();
        handler("ns/es".into(), None).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
