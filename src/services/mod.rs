// Service layer: validation and multi-step workflows over `DirectoryDb`.
// Handlers lock the database once and call exactly one function here;
// anything that touches more than one row runs inside `with_transaction`.

pub mod addresses;
pub mod companies;
pub mod company_types;
pub mod people;
pub mod plays;
pub mod privacy;
pub mod productions;

use crate::error::ServiceError;

/// Turn a missing row into `NotFound`.
pub(crate) fn found<T>(row: Option<T>, what: &str, id: i64) -> Result<T, ServiceError> {
    row.ok_or_else(|| ServiceError::not_found(what, id))
}

/// Require a non-blank text value, returning it trimmed.
pub(crate) fn required(value: &str, field: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
