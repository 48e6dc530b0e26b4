//! People routes. Same shape as the company routes, minus the type endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{
    AddressLinkBody, ArchiveBody, ArchivedQuery, Body, LinkUpdateBody, Params, PathParam,
    SearchQuery, SharedState,
};
use crate::db::{DbAddressLink, DbPerson, LinkedAddress, PersonInput};
use crate::entity::AddressOwner;
use crate::error::ServiceError;
use crate::services::{addresses, people};

pub async fn list(
    State(state): State<SharedState>,
    Params(q): Params<ArchivedQuery>,
) -> Result<Json<Vec<DbPerson>>, ServiceError> {
    state.with_db(|db| people::list_people(db, q.archived)).map(Json)
}

pub async fn search(
    State(state): State<SharedState>,
    Params(q): Params<SearchQuery>,
) -> Result<Json<Vec<DbPerson>>, ServiceError> {
    let limit = state.config.search_limit;
    state
        .with_db(|db| people::search_people(db, &q.query, limit))
        .map(Json)
}

pub async fn create(
    State(state): State<SharedState>,
    Body(input): Body<PersonInput>,
) -> Result<(StatusCode, Json<DbPerson>), ServiceError> {
    let person = state.with_db(|db| people::create_person(db, input))?;
    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn show(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbPerson>, ServiceError> {
    state.with_db(|db| people::get_person(db, id)).map(Json)
}

pub async fn update(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(input): Body<PersonInput>,
) -> Result<Json<DbPerson>, ServiceError> {
    state
        .with_db(|db| people::update_person(db, id, input))
        .map(Json)
}

pub async fn delete(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbPerson>, ServiceError> {
    state.with_db(|db| people::delete_person(db, id)).map(Json)
}

pub async fn archive(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(body): Body<ArchiveBody>,
) -> Result<Json<DbPerson>, ServiceError> {
    state
        .with_db(|db| people::archive_person(db, id, body.archived))
        .map(Json)
}

pub async fn list_addresses(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Params(q): Params<ArchivedQuery>,
) -> Result<Json<Vec<LinkedAddress>>, ServiceError> {
    state
        .with_db(|db| addresses::list_linked_addresses(db, AddressOwner::Person(id), q.archived))
        .map(Json)
}

pub async fn add_address(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(body): Body<AddressLinkBody>,
) -> Result<(StatusCode, Json<LinkedAddress>), ServiceError> {
    let linked = state.with_db(|db| super::addresses::link(db, AddressOwner::Person(id), body))?;
    Ok((StatusCode::CREATED, Json(linked)))
}

pub async fn update_address_link(
    State(state): State<SharedState>,
    PathParam((id, address_no)): PathParam<(i64, i64)>,
    Body(body): Body<LinkUpdateBody>,
) -> Result<Json<DbAddressLink>, ServiceError> {
    state
        .with_db(|db| {
            addresses::update_link(
                db,
                AddressOwner::Person(id),
                address_no,
                body.archived,
                body.location,
            )
        })
        .map(Json)
}

pub async fn remove_address(
    State(state): State<SharedState>,
    PathParam((id, address_no)): PathParam<(i64, i64)>,
) -> Result<StatusCode, ServiceError> {
    state.with_db(|db| addresses::remove_address(db, AddressOwner::Person(id), address_no))?;
    Ok(StatusCode::NO_CONTENT)
}
