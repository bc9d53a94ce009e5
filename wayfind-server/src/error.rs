use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::task::JoinError;
use wayfind_core::Error;

/// Error returned by request handlers
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    Join(JoinError),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Core(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::Join(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            Self::Core(err) => {
                let (status, kind) = match err {
                    Error::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                    Error::InvalidArgument(_) | Error::InvalidData(_) => {
                        (StatusCode::BAD_REQUEST, "invalid_argument")
                    }
                    Error::RouteNotFound { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "route_not_found")
                    }
                    Error::Cancelled => (StatusCode::GATEWAY_TIMEOUT, "cancelled"),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
                };
                (status, kind, err.to_string())
            }
            Self::Join(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                format!("route computation failed: {err}"),
            ),
        };

        if status.is_server_error() {
            tracing::error!("{message}");
        }

        let mut body = json!({ "error": kind, "message": message });
        if let Self::Core(Error::RouteNotFound { .. }) = self {
            body["hint"] = json!("no path satisfies this route type; try a different route type");
        }
        (status, Json(body)).into_response()
    }
}
