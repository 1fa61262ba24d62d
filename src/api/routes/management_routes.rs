//! Management routes (e.g., /v3/clusterloggings)

use axum::{routing::get, Router};

use crate::api::controller::management::ManagementController;
use crate::app_state::AppState;

pub fn management_routes() -> Router<AppState> {
    Router::new()
        .route("/resources", get(ManagementController::list_resources))
        .route("/clusterloggings", get(ManagementController::list_cluster_loggings))
        .route(
            "/clusterloggings/{namespace}/{name}",
            get(ManagementController::get_cluster_logging),
        )
        .route("/projectloggings", get(ManagementController::list_project_loggings))
        .route(
            "/projectloggings/{namespace}/{name}",
            get(ManagementController::get_project_logging),
        )
        .route("/settings", get(ManagementController::list_settings))
        .route("/settings/{name}", get(ManagementController::get_setting))
}
