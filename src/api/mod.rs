//! REST API.
//!
//! JSON in and out, snake_case fields, `{ "error": "..." }` on failure.
//! Every handler locks the database once through `AppState::with_db` and
//! delegates to exactly one service function.

pub mod addresses;
pub mod companies;
pub mod extensions;
pub mod people;
pub mod plays;
pub mod privacy;
pub mod productions;

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    routing::{get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::db::{Agency, CastingCompany, RentalSpace, RentalStudio, School, Theater};
use crate::error::ServiceError;
use crate::state::AppState;

pub type SharedState = Arc<AppState>;

/// Build the full router.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Addresses
        .route(
            "/api/addresses",
            get(addresses::list).post(addresses::create),
        )
        .route(
            "/api/addresses/:id",
            get(addresses::show)
                .put(addresses::update)
                .delete(addresses::delete),
        )
        // Companies
        .route(
            "/api/companies",
            get(companies::list).post(companies::create),
        )
        .route("/api/companies/search", get(companies::search))
        .route(
            "/api/companies/:id",
            get(companies::show)
                .put(companies::update)
                .delete(companies::delete),
        )
        .route("/api/companies/:id/archive", put(companies::archive))
        .route(
            "/api/companies/:id/addresses",
            get(companies::list_addresses).post(companies::add_address),
        )
        .route(
            "/api/companies/:id/addresses/:address_no",
            put(companies::update_address_link).delete(companies::remove_address),
        )
        .route(
            "/api/companies/:id/type",
            get(companies::active_type).put(companies::change_type),
        )
        .route("/api/companies/:id/type/history", get(companies::type_history))
        // People
        .route("/api/people", get(people::list).post(people::create))
        .route("/api/people/search", get(people::search))
        .route(
            "/api/people/:id",
            get(people::show).put(people::update).delete(people::delete),
        )
        .route("/api/people/:id/archive", put(people::archive))
        .route(
            "/api/people/:id/addresses",
            get(people::list_addresses).post(people::add_address),
        )
        .route(
            "/api/people/:id/addresses/:address_no",
            put(people::update_address_link).delete(people::remove_address),
        )
        // Company-type extension records
        .nest("/api/agencies", extensions::routes::<Agency>())
        .nest("/api/casting-companies", extensions::routes::<CastingCompany>())
        .nest("/api/theaters", extensions::routes::<Theater>())
        .nest("/api/schools", extensions::routes::<School>())
        .nest("/api/rental-studios", extensions::routes::<RentalStudio>())
        .nest("/api/rental-spaces", extensions::routes::<RentalSpace>())
        // Plays and productions
        .route("/api/plays", get(plays::list).post(plays::create))
        .route(
            "/api/plays/:id",
            get(plays::show).put(plays::update).delete(plays::delete),
        )
        .route(
            "/api/productions",
            get(productions::list).post(productions::create),
        )
        .route(
            "/api/productions/:id",
            get(productions::show)
                .put(productions::update)
                .delete(productions::delete),
        )
        // Privacy settings
        .route(
            "/api/privacy-settings",
            get(privacy::list)
                .post(privacy::create)
                .put(privacy::update)
                .delete(privacy::delete),
        )
        .route(
            "/api/privacy-settings/available-fields",
            get(privacy::available_fields),
        )
        .route("/api/privacy-settings/bulk-update", post(privacy::bulk_update))
        .route("/api/privacy-settings/bulk-delete", post(privacy::bulk_delete))
        .route(
            "/api/privacy-settings/:id/toggle-online",
            post(privacy::toggle_online),
        )
        .route(
            "/api/privacy-settings/:id/toggle-publication",
            post(privacy::toggle_publication),
        )
        .with_state(state)
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Shared extractors and payloads
// =============================================================================

/// JSON body whose rejection renders as a `{ "error": ... }` 400.
pub struct Body<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Body<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ServiceError::Validation(e.body_text()))?;
        Ok(Body(value))
    }
}

/// Query string whose rejection renders as a `{ "error": ... }` 400.
pub struct Params<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ServiceError::Validation(e.body_text()))?;
        Ok(Params(value))
    }
}

/// Path segments whose rejection renders as a `{ "error": ... }` 400.
pub struct PathParam<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ServiceError::Validation(e.body_text()))?;
        Ok(PathParam(value))
    }
}

/// `?archived=true` on list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArchivedQuery {
    pub archived: bool,
}

/// `?query=` on search endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub query: String,
}

/// Body of the `/archive` endpoints.
#[derive(Debug, Deserialize)]
pub struct ArchiveBody {
    pub archived: bool,
}

/// Body of `POST /:owner/:id/addresses`: link an existing address, or
/// create one and link it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddressLinkBody {
    Existing {
        address_no: i64,
        #[serde(default)]
        location: Option<String>,
    },
    New {
        address: crate::db::AddressInput,
        #[serde(default)]
        location: Option<String>,
    },
}

/// Body of `PUT /:owner/:id/addresses/:address_no`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkUpdateBody {
    pub archived: Option<bool>,
    pub location: Option<String>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body as HttpBody;
    use axum::http::{Method, Request as HttpRequest, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::db::test_utils::test_db;
    use crate::types::Config;

    pub fn test_router() -> Router {
        let state = Arc::new(AppState::with_database(Config::default(), test_db()));
        create_router(state)
    }

    /// Send one request and decode the JSON (or empty) response.
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = HttpRequest::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                HttpBody::from(json.to_string())
            }
            None => HttpBody::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}
