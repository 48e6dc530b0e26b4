use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ArchivedQuery, Body, Params, PathParam, SharedState};
use crate::db::{DbPlay, PlayInput};
use crate::error::ServiceError;
use crate::services::plays;

pub async fn list(
    State(state): State<SharedState>,
    Params(q): Params<ArchivedQuery>,
) -> Result<Json<Vec<DbPlay>>, ServiceError> {
    state.with_db(|db| plays::list_plays(db, q.archived)).map(Json)
}

pub async fn create(
    State(state): State<SharedState>,
    Body(input): Body<PlayInput>,
) -> Result<(StatusCode, Json<DbPlay>), ServiceError> {
    let play = state.with_db(|db| plays::create_play(db, input))?;
    Ok((StatusCode::CREATED, Json(play)))
}

pub async fn show(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbPlay>, ServiceError> {
    state.with_db(|db| plays::get_play(db, id)).map(Json)
}

pub async fn update(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(input): Body<PlayInput>,
) -> Result<Json<DbPlay>, ServiceError> {
    state.with_db(|db| plays::update_play(db, id, input)).map(Json)
}

pub async fn delete(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbPlay>, ServiceError> {
    state.with_db(|db| plays::delete_play(db, id)).map(Json)
}
