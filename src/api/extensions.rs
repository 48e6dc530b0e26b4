//! Routes for the six company-type extension tables.
//!
//! One generic handler set serves every variant; `routes::<T>()` is nested
//! under the variant's path in `create_router`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::{ArchiveBody, ArchivedQuery, Body, Params, PathParam, SharedState};
use crate::db::ExtensionRecord;
use crate::error::ServiceError;
use crate::services::company_types;

pub fn routes<T: ExtensionRecord>() -> Router<SharedState> {
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route(
            "/:id",
            get(show::<T>).put(update::<T>).delete(delete::<T>),
        )
        .route("/:id/archive", put(archive::<T>))
}

async fn list<T: ExtensionRecord>(
    State(state): State<SharedState>,
    Params(q): Params<ArchivedQuery>,
) -> Result<Json<Vec<T>>, ServiceError> {
    state
        .with_db(|db| company_types::list_extensions::<T>(db, q.archived))
        .map(Json)
}

async fn create<T: ExtensionRecord>(
    State(state): State<SharedState>,
    Body(record): Body<T>,
) -> Result<(StatusCode, Json<T>), ServiceError> {
    let created = state.with_db(|db| company_types::create_extension(db, record))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn show<T: ExtensionRecord>(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<T>, ServiceError> {
    state
        .with_db(|db| company_types::get_extension::<T>(db, id))
        .map(Json)
}

async fn update<T: ExtensionRecord>(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(record): Body<T>,
) -> Result<Json<T>, ServiceError> {
    state
        .with_db(|db| company_types::update_extension(db, id, record))
        .map(Json)
}

async fn archive<T: ExtensionRecord>(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
    Body(body): Body<ArchiveBody>,
) -> Result<Json<T>, ServiceError> {
    state
        .with_db(|db| company_types::archive_extension::<T>(db, id, body.archived))
        .map(Json)
}

async fn delete<T: ExtensionRecord>(
    State(state): State<SharedState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<T>, ServiceError> {
    state
        .with_db(|db| company_types::delete_extension::<T>(db, id))
        .map(Json)
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{send, test_router};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_theater_record_lifecycle() {
        let app = test_router();
        let (_, company) =
            send(&app, Method::POST, "/api/companies", Some(json!({"name": "Roundabout"}))).await;
        let company_no = company["company_no"].as_i64().unwrap();

        let (status, theater) = send(
            &app,
            Method::POST,
            "/api/theaters",
            Some(json!({"company_no": company_no, "seating_capacity": 740})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = theater["theater_no"].as_i64().unwrap();
        assert_eq!(theater["seating_capacity"], 740);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/schools",
            Some(json!({"company_no": company_no})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/theaters/{id}"),
            Some(json!({"company_no": company_no, "seating_capacity": 750, "union_contract": "LORT B"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["union_contract"], "LORT B");

        let (status, archived) = send(
            &app,
            Method::PUT,
            &format!("/api/theaters/{id}/archive"),
            Some(json!({"archived": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(archived["archived"], true);

        let (_, active) = send(&app, Method::GET, "/api/theaters", None).await;
        assert!(active.as_array().unwrap().is_empty());
        let (_, all) = send(&app, Method::GET, "/api/theaters?archived=true", None).await;
        assert_eq!(all.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/theaters/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, &format!("/api/theaters/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
