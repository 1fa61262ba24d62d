use anyhow::{Context, Result};
use kube::Client;
use tracing::{debug, info};

/// Client from the in-cluster service account, or the local kubeconfig
/// during development.
pub async fn build_kube_client() -> Result<Client> {
    let client = Client::try_default()
        .await
        .context("failed to infer Kubernetes client configuration")?;

    debug!("Kubernetes client initialized, default namespace {}", client.default_namespace());
    Ok(client)
}

/// Fails early when the management CRDs are not served by the API server.
pub async fn check_api_group(client: &Client) -> Result<()> {
    use crate::apis::management::v3::{GROUP_NAME, VERSION};

    let resources = client
        .list_api_group_resources(&format!("{GROUP_NAME}/{VERSION}"))
        .await
        .with_context(|| format!("API group {GROUP_NAME}/{VERSION} is not available"))?;

    info!(
        "API group {}/{} serves {} resources",
        GROUP_NAME,
        VERSION,
        resources.resources.len()
    );
    Ok(())
}
