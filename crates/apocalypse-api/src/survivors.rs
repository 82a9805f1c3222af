use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, error, info};

use apocalypse_db::{StoreError, UpdateOutcome};
use apocalypse_types::api::{
    InfectedQuery, NewSurvivor, SetInfectedRequest, SurvivorStats, UpdateLocationRequest,
    UpdateResourcesRequest,
};

use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::state::AppState;

/// Read endpoints may be called from any origin.
pub(crate) fn with_cors<T: IntoResponse>(body: T) -> impl IntoResponse {
    ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], body)
}

/// GET /survivors
pub async fn list_survivors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let survivors = state.with_db(|db| db.get_all_survivors()).await??;
    debug!("Listing {} survivors", survivors.len());
    Ok(with_cors(Json(survivors)))
}

/// POST /survivors — inserts without checking for an existing id.
pub async fn create_survivor(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewSurvivor>,
) -> Result<StatusCode, ApiError> {
    info!("Creating survivor {} ({})", req.id, req.name);
    state.with_db(move |db| db.insert_survivor(&req)).await??;
    Ok(StatusCode::OK)
}

/// GET /survivors/stats
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (healthy, infected) = state
        .with_db(|db| Ok((db.count_by_infected(false)?, db.count_by_infected(true)?)))
        .await??;

    let stats = SurvivorStats::from_counts(healthy, infected);
    debug!(healthy, infected, "Survivor stats");
    Ok(with_cors(Json(stats)))
}

/// GET /survivors/infected?status=
pub async fn list_infected(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<impl IntoResponse, ApiError> {
    let query = InfectedQuery {
        status: params.first("status").map(str::to_owned),
    };
    let infected = query.infected();
    let survivors = state
        .with_db(move |db| db.get_survivors_by_infected(infected))
        .await??;
    debug!(infected, "Listing {} survivors by infection status", survivors.len());
    Ok(with_cors(Json(survivors)))
}

/// PUT /survivors/location
pub async fn update_location(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateLocationRequest>,
) -> Result<StatusCode, ApiError> {
    info!("Updating location of {} to ({}, {})", req.id, req.longitude, req.latitude);
    let id = req.id.clone();
    let outcome = state
        .with_db(move |db| db.update_location(&req.id, req.longitude, req.latitude))
        .await??;

    match outcome {
        UpdateOutcome::Updated => Ok(StatusCode::OK),
        UpdateOutcome::NotFound => Err(ApiError::NotFound(id)),
    }
}

/// PUT /survivors/infected
pub async fn set_infected(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SetInfectedRequest>,
) -> Result<StatusCode, ApiError> {
    info!("Flagging {} as infected", req.id);
    let id = req.id.clone();
    let result = state.with_db(move |db| db.update_infected(&req.id)).await?;
    not_found_on_failure(id, result)
}

/// PUT /survivors/resources
pub async fn update_resources(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateResourcesRequest>,
) -> Result<StatusCode, ApiError> {
    let (id, resources) = req.into_parts();
    info!("Updating resources of {}", id);
    let target = id.clone();
    let result = state
        .with_db(move |db| db.update_resources(&target, &resources))
        .await?;
    not_found_on_failure(id, result)
}

/// The infected and resources endpoints answer 404 for storage failures as
/// well as for unknown ids. Existing clients depend on that mapping.
fn not_found_on_failure(
    id: String,
    result: Result<UpdateOutcome, StoreError>,
) -> Result<StatusCode, ApiError> {
    match result {
        Ok(UpdateOutcome::Updated) => Ok(StatusCode::OK),
        Ok(UpdateOutcome::NotFound) => Err(ApiError::NotFound(id)),
        Err(e) => {
            error!("Update of {} failed: {}", id, e);
            Err(ApiError::NotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failure_maps_to_not_found() {
        let err = not_found_on_failure("HD1".into(), Err(StoreError::Poisoned)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn outcomes_map_to_status() {
        assert_eq!(
            not_found_on_failure("HD1".into(), Ok(UpdateOutcome::Updated)).unwrap(),
            StatusCode::OK
        );
        assert!(matches!(
            not_found_on_failure("HD1".into(), Ok(UpdateOutcome::NotFound)),
            Err(ApiError::NotFound(id)) if id == "HD1"
        ));
    }
}
