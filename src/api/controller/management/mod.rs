//! Management controller: read-only views over the controller caches

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::dto::list_dto::{ListQuery, ListResponse};
use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::apis::management::v3::resources::{ResourceDescriptor, RESOURCES};
use crate::apis::management::v3::{ClusterLogging, ProjectLogging, Setting};
use crate::app_state::AppState;
use crate::core::client::scope::ManagedResource;
use crate::core::client::selector::Selector;
use crate::core::client::store::ResourceCache;
use crate::errors::{AppError, Result};

fn list_from<K: ManagedResource>(cache: &ResourceCache<K>, query: &ListQuery) -> Result<ListResponse<K>> {
    let selector = match query.label_selector.as_deref() {
        Some(raw) => Selector::parse(raw)?,
        None => Selector::everything(),
    };
    let namespace = query.namespace.as_deref().unwrap_or_default();
    let items = cache
        .list(namespace, &selector)
        .into_iter()
        .map(|obj| (*obj).clone())
        .collect();
    Ok(ListResponse::new(items))
}

fn get_from<K: ManagedResource>(cache: &ResourceCache<K>, namespace: &str, name: &str) -> Result<K> {
    cache.get(namespace, name).map(|obj| (*obj).clone())
}

pub struct ManagementController;

impl ManagementController {
    pub async fn list_resources() -> Result<Json<ApiResponse<Vec<ResourceDescriptor>>>, AppError> {
        to_json(Ok(RESOURCES.to_vec()))
    }

    pub async fn list_cluster_loggings(
        State(state): State<AppState>,
        Query(query): Query<ListQuery>,
    ) -> Result<Json<ApiResponse<ListResponse<ClusterLogging>>>, AppError> {
        to_json(list_from(&state.cluster_loggings, &query))
    }

    pub async fn get_cluster_logging(
        State(state): State<AppState>,
        Path((namespace, name)): Path<(String, String)>,
    ) -> Result<Json<ApiResponse<ClusterLogging>>, AppError> {
        to_json(get_from(&state.cluster_loggings, &namespace, &name))
    }

    pub async fn list_project_loggings(
        State(state): State<AppState>,
        Query(query): Query<ListQuery>,
    ) -> Result<Json<ApiResponse<ListResponse<ProjectLogging>>>, AppError> {
        to_json(list_from(&state.project_loggings, &query))
    }

    pub async fn get_project_logging(
        State(state): State<AppState>,
        Path((namespace, name)): Path<(String, String)>,
    ) -> Result<Json<ApiResponse<ProjectLogging>>, AppError> {
        to_json(get_from(&state.project_loggings, &namespace, &name))
    }

    pub async fn list_settings(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<ListResponse<Setting>>>, AppError> {
        to_json(list_from(&state.settings, &ListQuery::default()))
    }

    pub async fn get_setting(
        State(state): State<AppState>,
        Path(name): Path<String>,
    ) -> Result<Json<ApiResponse<Setting>>, AppError> {
        to_json(get_from(&state.settings, "", &name))
    }
}
