use anyhow::Result;
use tracing::{info, warn};

use cattle_management::apis::management::v3::crds;
use cattle_management::app_state::build_app_state;
use cattle_management::config::AppConfig;
use cattle_management::core::client::kube_client::{build_kube_client, check_api_group};
use cattle_management::core::client::management_client::ManagementClient;
use cattle_management::core::util::tracing_util::init_tracing;
use cattle_management::domain::logging::service::logging_register_service;
use cattle_management::routes::app_router;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    if std::env::args().nth(1).as_deref() == Some("crds") {
        println!("{}", serde_json::to_string_pretty(&crds())?);
        return Ok(());
    }

    let _log_guard = init_tracing(&config)?;
    info!("Starting cattle-management with {:?}", config);

    let client = build_kube_client().await?;
    if let Err(e) = check_api_group(&client).await {
        warn!("{:#}", e);
    }

    let management = ManagementClient::new(client, config.requeue_delay);
    logging_register_service::register(&management, &config);
    let state = build_app_state(&management, &config.watch_namespace);

    let handles = management.start(config.controller_threads)?;
    management.sync().await?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);
    axum::serve(listener, app_router().with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down {} controller tasks", handles.len());
    for handle in handles {
        handle.abort();
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
