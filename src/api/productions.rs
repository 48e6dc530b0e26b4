use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{Body, Params, PathParam, SharedState};
use crate::db::{DbProduction, ProductionFilter, ProductionInput};
use crate::error::ServiceError;
use crate::services::productions;

/// GET /api/productions[?play_no=&company_no=&archived=]
pub async fn list(
    State(state): State<SharedState>,
    Params(filter): Params<ProductionFilter>,
) -> Result<Json<Vec<DbProduction>>, ServiceError> {
    state
        .with_db(|db| productions::list_productions(db, &filter))
        .map(Json)
}

pub async fn create(
    State(state): State<SharedState>,
    Body(input): Body<ProductionInput>,
) -> Result<(StatusCode, Json<DbProduction>), ServiceError> {
    let production = state.with_db(|db| productions::create_production(db, input))?;
    Ok((StatusCode::CREATED, Json(production)))
}

pub async fn show(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbProduction>, ServiceError> {
    state
        .with_db(|db| productions::get_production(db, id))
        .map(Json)
}

pub async fn update(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(input): Body<ProductionInput>,
) -> Result<Json<DbProduction>, ServiceError> {
    state
        .with_db(|db| productions::update_production(db, id, input))
        .map(Json)
}

pub async fn delete(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbProduction>, ServiceError> {
    state
        .with_db(|db| productions::delete_production(db, id))
        .map(Json)
}
