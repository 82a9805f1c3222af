use std::path::PathBuf;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Request, rejection::BytesRejection},
    http::Uri,
    routing::{get, put},
};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{debug, info_span};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::{docs, report, roster, survivors};

/// Cap on request bodies. Larger bodies are rejected with 400.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Files served verbatim.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    pub style_sheet: PathBuf,
    pub api_spec: PathBuf,
}

/// Build the application router.
///
/// - `GET /survivors`, `POST /survivors`
/// - `GET /survivors/stats`
/// - `PUT /survivors/location`
/// - `GET /survivors/infected?status=`, `PUT /survivors/infected`
/// - `PUT /survivors/resources`
/// - `GET /robotcpu?category=&sortby=`
/// - `GET /reportweb`
/// - `GET /docs`, `GET /swagger.yaml`, `GET /style.css`
pub fn router(state: AppState, assets: &StaticAssets) -> Router {
    Router::new()
        .route(
            "/survivors",
            get(survivors::list_survivors).post(survivors::create_survivor),
        )
        .route("/survivors/stats", get(survivors::stats))
        .route("/survivors/location", put(survivors::update_location))
        .route(
            "/survivors/infected",
            get(survivors::list_infected).put(survivors::set_infected),
        )
        .route("/survivors/resources", put(survivors::update_resources))
        .route("/robotcpu", get(roster::robot_cpus))
        .route("/reportweb", get(report::report))
        .route("/docs", get(docs::redoc))
        .route_service("/swagger.yaml", ServeFile::new(&assets.api_spec))
        .route_service("/style.css", ServeFile::new(&assets.style_sheet))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        )
        .with_state(state)
}

/// Unknown paths: the body is still read (under the same cap) and logged.
async fn not_found(uri: Uri, body: Result<Bytes, BytesRejection>) -> ApiError {
    match body {
        Ok(body) => {
            debug!("Unrouted request body: {}", String::from_utf8_lossy(&body));
            ApiError::NotFound(uri.path().to_string())
        }
        Err(e) => ApiError::Decode(e.body_text()),
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
