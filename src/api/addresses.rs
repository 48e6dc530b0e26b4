//! Address routes.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{AddressLinkBody, Body, Params, PathParam, SharedState};
use crate::db::{AddressInput, DbAddress, DirectoryDb, LinkedAddress};
use crate::entity::AddressOwner;
use crate::error::ServiceError;
use crate::services::addresses;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteQuery {
    pub cascade: bool,
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<DbAddress>>, ServiceError> {
    state.with_db(addresses::list_addresses).map(Json)
}

pub async fn create(
    State(state): State<SharedState>,
    Body(input): Body<AddressInput>,
) -> Result<(StatusCode, Json<DbAddress>), ServiceError> {
    let address = state.with_db(|db| addresses::create_address(db, input))?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn show(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbAddress>, ServiceError> {
    state.with_db(|db| addresses::get_address(db, id)).map(Json)
}

/// PUT /api/addresses/:id (full replace)
pub async fn update(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(input): Body<AddressInput>,
) -> Result<Json<DbAddress>, ServiceError> {
    state
        .with_db(|db| addresses::update_address(db, id, input))
        .map(Json)
}

/// DELETE /api/addresses/:id[?cascade=true]
pub async fn delete(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Params(q): Params<DeleteQuery>,
) -> Result<Json<DbAddress>, ServiceError> {
    state
        .with_db(|db| addresses::delete_address(db, id, q.cascade))
        .map(Json)
}

/// Shared by the company and person `POST .../addresses` handlers.
pub(super) fn link(
    db: &DirectoryDb,
    owner: AddressOwner,
    body: AddressLinkBody,
) -> Result<LinkedAddress, ServiceError> {
    match body {
        AddressLinkBody::Existing {
            address_no,
            location,
        } => addresses::add_address(db, owner, address_no, location),
        AddressLinkBody::New { address, location } => {
            addresses::create_and_link_address(db, owner, address, location)
        }
    }
}
