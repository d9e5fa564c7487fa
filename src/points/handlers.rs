use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreatePointRequest, DataResponse, UpdatePointRequest, UpdateResponse},
    repo::{self, Point},
    validate::Validated,
};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub const POINT_NOT_FOUND: &str = "Point not found";

pub fn point_routes() -> Router<AppState> {
    Router::new()
        .route("/points", get(list_points).post(create_point))
        .route("/points/", get(list_points).post(create_point))
        .route("/points/:id", put(update_point).delete(delete_point))
}

/// Ids that are not UUIDs cannot name a stored point.
fn parse_point_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| debug!(id = %raw, error = %e, "point id is not a uuid"))
        .ok()
}

#[instrument(skip(state))]
pub async fn list_points(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<DataResponse<Vec<Point>>>, AppError> {
    let points = repo::list_by_owner(&state.db, identity.id).await?;
    Ok(Json(DataResponse { data: points }))
}

#[instrument(skip(state, body))]
pub async fn create_point(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Validated(body): Validated<CreatePointRequest>,
) -> Result<Json<DataResponse<Point>>, AppError> {
    let point = repo::insert(&state.db, identity.id, &body).await?;
    info!(point_id = %point.id, user_id = %identity.id, "point created");
    Ok(Json(DataResponse { data: point }))
}

/// A miss (unknown id or another user's point) answers 200 with a message,
/// unlike delete.
#[instrument(skip(state, body))]
pub async fn update_point(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Validated(body): Validated<UpdatePointRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    if body.is_empty() {
        debug!(%id, "empty update; stored values are kept");
    }

    let updated = match parse_point_id(&id) {
        Some(point_id) => repo::update_owned(&state.db, identity.id, point_id, &body).await?,
        None => None,
    };

    match updated {
        Some(point) => {
            info!(point_id = %point.id, user_id = %identity.id, "point updated");
            Ok(Json(UpdateResponse::Updated { data: point }))
        }
        None => {
            debug!(%id, user_id = %identity.id, "no owned point to update");
            Ok(Json(UpdateResponse::Missing {
                message: POINT_NOT_FOUND,
            }))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_point(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Point>>, AppError> {
    let deleted = match parse_point_id(&id) {
        Some(point_id) => repo::delete_owned(&state.db, identity.id, point_id).await?,
        None => None,
    };

    let point = deleted.ok_or_else(|| {
        debug!(%id, user_id = %identity.id, "no owned point to delete");
        AppError::NotFound(POINT_NOT_FOUND.into())
    })?;
    info!(point_id = %point.id, user_id = %identity.id, "point deleted");
    Ok(Json(DataResponse { data: point }))
}
