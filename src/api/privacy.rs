//! Privacy-setting routes.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{Body, Params, PathParam, SharedState};
use crate::db::{DbPrivacySetting, PrivacyPatch, PrivacySettingInput};
use crate::entity::PrivacyEntityType;
use crate::error::ServiceError;
use crate::services::privacy;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    #[serde(alias = "entityType")]
    pub entity_type: Option<String>,
    #[serde(alias = "entityNo")]
    pub entity_no: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FieldsQuery {
    #[serde(rename = "entityType", alias = "entity_type")]
    pub entity_type: String,
}

#[derive(Debug, Serialize)]
pub struct FieldsResponse {
    pub entity_type: PrivacyEntityType,
    pub fields: &'static [&'static str],
}

/// PUT body: the id plus any subset of the setting's fields.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub id: i64,
    #[serde(flatten)]
    pub patch: PrivacyPatch,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateBody {
    pub ids: Vec<i64>,
    pub updates: PrivacyPatch,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
    pub ids: Vec<i64>,
}

/// GET /api/privacy-settings[?entity_type=&entity_no=]
pub async fn list(
    State(state): State<SharedState>,
    Params(q): Params<ListQuery>,
) -> Result<Json<Vec<DbPrivacySetting>>, ServiceError> {
    let entity_type = q
        .entity_type
        .as_deref()
        .map(privacy::parse_entity_type)
        .transpose()?;
    state
        .with_db(|db| privacy::list_settings(db, entity_type, q.entity_no))
        .map(Json)
}

pub async fn create(
    State(state): State<SharedState>,
    Body(input): Body<PrivacySettingInput>,
) -> Result<(StatusCode, Json<DbPrivacySetting>), ServiceError> {
    let setting = state.with_db(|db| privacy::create_setting(db, input))?;
    Ok((StatusCode::CREATED, Json(setting)))
}

pub async fn update(
    State(state): State<SharedState>,
    Body(body): Body<UpdateBody>,
) -> Result<Json<DbPrivacySetting>, ServiceError> {
    state
        .with_db(|db| privacy::update_setting(db, body.id, &body.patch))
        .map(Json)
}

/// DELETE /api/privacy-settings?id=
pub async fn delete(
    State(state): State<SharedState>,
    Params(q): Params<IdQuery>,
) -> Result<Json<DbPrivacySetting>, ServiceError> {
    state
        .with_db(|db| privacy::delete_setting(db, q.id))
        .map(Json)
}

pub async fn toggle_online(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbPrivacySetting>, ServiceError> {
    state.with_db(|db| privacy::toggle_online(db, id)).map(Json)
}

pub async fn toggle_publication(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DbPrivacySetting>, ServiceError> {
    state
        .with_db(|db| privacy::toggle_publication(db, id))
        .map(Json)
}

pub async fn bulk_update(
    State(state): State<SharedState>,
    Body(body): Body<BulkUpdateBody>,
) -> Result<Json<Vec<DbPrivacySetting>>, ServiceError> {
    state
        .with_db(|db| privacy::bulk_update(db, &body.ids, &body.updates))
        .map(Json)
}

pub async fn bulk_delete(
    State(state): State<SharedState>,
    Body(body): Body<BulkDeleteBody>,
) -> Result<Json<Vec<DbPrivacySetting>>, ServiceError> {
    state
        .with_db(|db| privacy::bulk_delete(db, &body.ids))
        .map(Json)
}

/// GET /api/privacy-settings/available-fields?entityType=
pub async fn available_fields(
    Params(q): Params<FieldsQuery>,
) -> Result<Json<FieldsResponse>, ServiceError> {
    let entity_type = privacy::parse_entity_type(&q.entity_type)?;
    Ok(Json(FieldsResponse {
        entity_type,
        fields: entity_type.available_fields(),
    }))
}
