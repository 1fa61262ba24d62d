use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the typed clients, listers and controllers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("K8s API error: {0}")]
    Kube(#[from] kube::Error),

    /// Cache miss in a lister, shaped like the API server's NotFound.
    #[error("{resource}.{group} \"{name}\" not found")]
    NotFound {
        group: String,
        resource: String,
        name: String,
    },

    #[error("invalid label selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("indexer conflict: {0}")]
    IndexerConflict(String),

    #[error("index with name {0} does not exist")]
    UnknownIndex(String),

    #[error("invalid object: {0}")]
    InvalidObject(String),

    #[error("handler error: {0}")]
    Handler(String),

    #[error("watch error: {0}")]
    Watch(#[from] kube::runtime::watcher::Error),

    #[error("cache for {0} did not sync")]
    CacheSync(String),

    #[error("Body parsing error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn not_found(group: &str, resource: &str, name: impl Into<String>) -> Self {
        Error::NotFound {
            group: group.to_string(),
            resource: resource.to_string(),
            name: name.into(),
        }
    }

    /// Wraps an arbitrary handler failure.
    pub fn handler<E: ToString>(err: E) -> Self {
        Error::Handler(err.to_string())
    }
}

/// True for cache misses and for 404 answers from the API server.
pub fn is_not_found(err: &Error) -> bool {
    match err {
        Error::NotFound { .. } => true,
        Error::Kube(kube::Error::Api(resp)) => resp.code == 404,
        _ => false,
    }
}

pub fn is_conflict(err: &Error) -> bool {
    matches!(err, Error::Kube(kube::Error::Api(resp)) if resp.code == 409)
}

/// Errors surfaced by the HTTP view.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("K8s API error: {0}")]
    K8sApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Helper for mapping any unknown error into internal error
pub fn internal_error<E: ToString>(err: E) -> AppError {
    AppError::InternalServerError(err.to_string())
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { .. } => AppError::NotFound(err.to_string()),
            Error::InvalidSelector { .. } => AppError::BadRequest(err.to_string()),
            Error::Kube(ref e) => {
                if is_not_found(&err) {
                    AppError::NotFound(e.to_string())
                } else {
                    AppError::K8sApiError(e.to_string())
                }
            }
            other => internal_error(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::K8sApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(json!({
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
