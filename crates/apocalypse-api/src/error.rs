use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, warn};

use apocalypse_db::StoreError;

/// Every failure a handler can produce. Responses carry only the status
/// code; the detail goes to the log inside the request span.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not decode request: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("robot endpoint request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("robot endpoint returned an undecodable payload: {0}")]
    UpstreamDecode(#[source] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::UpstreamDecode(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Store(_) | Self::Upstream(_) | Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match status {
            s if s.is_server_error() => error!(status = s.as_u16(), "{}", self),
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
                debug!(status = status.as_u16(), "{}", self)
            }
            _ => warn!(status = status.as_u16(), "{}", self),
        }
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status() {
        assert_eq!(ApiError::Decode("eof".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("HD1".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            ApiError::Store(StoreError::Poisoned).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ApiError::UpstreamDecode(bad_json).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_has_no_body_detail() {
        let resp = ApiError::Store(StoreError::Poisoned).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().get(axum::http::header::CONTENT_TYPE).is_none());
    }
}
