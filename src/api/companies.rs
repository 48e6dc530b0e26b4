//! Company routes, including address links and the company-type endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{
    AddressLinkBody, ArchiveBody, ArchivedQuery, Body, LinkUpdateBody, Params, PathParam,
    SearchQuery, SharedState,
};
use crate::db::{CompanyExtension, CompanyInput, DbAddressLink, DbCompany, LinkedAddress};
use crate::entity::AddressOwner;
use crate::error::ServiceError;
use crate::services::company_types::TypeChange;
use crate::services::{addresses, companies, company_types};

/// GET /api/companies
pub async fn list(
    State(state): State<SharedState>,
    Params(q): Params<ArchivedQuery>,
) -> Result<Json<Vec<DbCompany>>, ServiceError> {
    state
        .with_db(|db| companies::list_companies(db, q.archived))
        .map(Json)
}

/// GET /api/companies/search?query=
pub async fn search(
    State(state): State<SharedState>,
    Params(q): Params<SearchQuery>,
) -> Result<Json<Vec<DbCompany>>, ServiceError> {
    let limit = state.config.search_limit;
    state
        .with_db(|db| companies::search_companies(db, &q.query, limit))
        .map(Json)
}

/// POST /api/companies
pub async fn create(
    State(state): State<SharedState>,
    Body(input): Body<CompanyInput>,
) -> Result<(StatusCode, Json<DbCompany>), ServiceError> {
    let company = state.with_db(|db| companies::create_company(db, input))?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn show(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbCompany>, ServiceError> {
    state.with_db(|db| companies::get_company(db, id)).map(Json)
}

pub async fn update(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(input): Body<CompanyInput>,
) -> Result<Json<DbCompany>, ServiceError> {
    state
        .with_db(|db| companies::update_company(db, id, input))
        .map(Json)
}

pub async fn delete(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbCompany>, ServiceError> {
    state
        .with_db(|db| companies::delete_company(db, id))
        .map(Json)
}

/// PUT /api/companies/:id/archive
pub async fn archive(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(body): Body<ArchiveBody>,
) -> Result<Json<DbCompany>, ServiceError> {
    state
        .with_db(|db| companies::archive_company(db, id, body.archived))
        .map(Json)
}

// =============================================================================
// Address links
// =============================================================================

pub async fn list_addresses(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Params(q): Params<ArchivedQuery>,
) -> Result<Json<Vec<LinkedAddress>>, ServiceError> {
    state
        .with_db(|db| addresses::list_linked_addresses(db, AddressOwner::Company(id), q.archived))
        .map(Json)
}

/// POST /api/companies/:id/addresses
pub async fn add_address(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(body): Body<AddressLinkBody>,
) -> Result<(StatusCode, Json<LinkedAddress>), ServiceError> {
    let linked = state.with_db(|db| super::addresses::link(db, AddressOwner::Company(id), body))?;
    Ok((StatusCode::CREATED, Json(linked)))
}

/// PUT /api/companies/:id/addresses/:address_no
pub async fn update_address_link(
    State(state): State<SharedState>,
    PathParam((id, address_no)): PathParam<(i64, i64)>,
    Body(body): Body<LinkUpdateBody>,
) -> Result<Json<DbAddressLink>, ServiceError> {
    state
        .with_db(|db| {
            addresses::update_link(
                db,
                AddressOwner::Company(id),
                address_no,
                body.archived,
                body.location,
            )
        })
        .map(Json)
}

/// DELETE /api/companies/:id/addresses/:address_no
pub async fn remove_address(
    State(state): State<SharedState>,
    PathParam((id, address_no)): PathParam<(i64, i64)>,
) -> Result<StatusCode, ServiceError> {
    state.with_db(|db| addresses::remove_address(db, AddressOwner::Company(id), address_no))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Company type
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChangeTypeBody {
    pub new_type: String,
    #[serde(default)]
    pub previous_type: Option<String>,
}

/// GET /api/companies/:id/type. `null` when the company has no type.
pub async fn active_type(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Option<CompanyExtension>>, ServiceError> {
    state
        .with_db(|db| company_types::active_type(db, id))
        .map(Json)
}

/// PUT /api/companies/:id/type
pub async fn change_type(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(body): Body<ChangeTypeBody>,
) -> Result<Json<TypeChange>, ServiceError> {
    state
        .with_db(|db| {
            company_types::change_type(db, id, &body.new_type, body.previous_type.as_deref())
        })
        .map(Json)
}

/// GET /api/companies/:id/type/history
pub async fn type_history(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Vec<CompanyExtension>>, ServiceError> {
    state
        .with_db(|db| company_types::type_history(db, id))
        .map(Json)
}
