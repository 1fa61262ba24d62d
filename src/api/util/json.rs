use axum::Json;

use crate::api::dto::ApiResponse;
use crate::errors::{AppError, Result};

/// Wraps a lister result; cache misses become 404, bad selectors 400.
pub fn to_json<T: serde::Serialize>(result: Result<T>) -> Result<Json<ApiResponse<T>>, AppError> {
    result.map(|value| Json(ApiResponse::ok(value))).map_err(AppError::from)
}
