// Company-type service.
//
// A company has at most one active extension row across the six extension
// tables. Changing type archives whatever is active and inserts a fresh row
// of the new type, all in one transaction, so the previous record stays
// queryable as history.

use serde::Serialize;

use crate::db::{CompanyExtension, DbError, DirectoryDb, ExtensionRecord};
use crate::entity::{CompanyType, PrivacyEntityType};
use crate::error::ServiceError;

use super::found;

/// Outcome of a type change.
#[derive(Debug, Clone, Serialize)]
pub struct TypeChange {
    pub company_no: i64,
    /// Type that was active before the change, if any.
    pub previous_type: Option<CompanyType>,
    /// Extension rows archived by the change.
    pub archived: Vec<ArchivedExtension>,
    /// The freshly inserted, now active extension.
    pub active: CompanyExtension,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedExtension {
    pub company_type: CompanyType,
    pub record_no: i64,
}

fn require_company(db: &DirectoryDb, company_no: i64) -> Result<(), ServiceError> {
    if !db.row_exists("companies", "company_no", company_no)? {
        return Err(ServiceError::not_found("Company", company_no));
    }
    Ok(())
}

fn parse_type(label: &str, field: &str) -> Result<CompanyType, ServiceError> {
    CompanyType::parse(label).ok_or_else(|| {
        ServiceError::validation(format!("{field} '{label}' is not a known company type"))
    })
}

/// Move a company to `new_type`.
///
/// `previous_type` is the caller's view of the current type. A mismatch is
/// logged and otherwise ignored: whatever is actually active gets archived.
pub fn change_type(
    db: &DirectoryDb,
    company_no: i64,
    new_type: &str,
    previous_type: Option<&str>,
) -> Result<TypeChange, ServiceError> {
    let new_type = parse_type(new_type, "new_type")?;
    let claimed = previous_type
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_type(s, "previous_type"))
        .transpose()?;
    require_company(db, company_no)?;

    let result: Result<TypeChange, ServiceError> = db.with_transaction(|tx| {
        let archived = tx
            .archive_active_extensions(company_no)
            .map_err(transition_failed)?;
        let actual = archived.first().map(|(kind, _)| *kind);
        if claimed.is_some() && claimed != actual {
            log::warn!(
                "Company {company_no}: client expected type {:?} but {:?} was active; archiving the actual one",
                claimed.map(|t| t.as_str()),
                actual.map(|t| t.as_str())
            );
        }

        let record_no = tx
            .insert_default_extension(new_type, company_no)
            .map_err(transition_failed)?;
        let active = tx
            .active_extensions(company_no)
            .map_err(transition_failed)?
            .into_iter()
            .find(|ext| ext.company_type() == new_type && ext.record_no() == record_no)
            .ok_or_else(|| {
                ServiceError::TypeTransition(format!(
                    "new {new_type} record {record_no} not visible after insert"
                ))
            })?;

        Ok(TypeChange {
            company_no,
            previous_type: actual,
            archived: archived
                .into_iter()
                .map(|(company_type, record_no)| ArchivedExtension {
                    company_type,
                    record_no,
                })
                .collect(),
            active,
        })
    });

    match result {
        Ok(change) => {
            log::info!(
                "Company {company_no} type changed {:?} -> {} (record {})",
                change.previous_type.map(|t| t.as_str()),
                new_type,
                change.active.record_no()
            );
            Ok(change)
        }
        // BEGIN/COMMIT failures arrive as plain database errors.
        Err(ServiceError::Database(e)) => Err(transition_failed(e)),
        Err(e) => Err(e),
    }
}

fn transition_failed(err: DbError) -> ServiceError {
    ServiceError::TypeTransition(err.to_string())
}

/// The company's active extension, probing tables in fixed order.
///
/// More than one active row means the data needs repair; the first match
/// is still returned so reads stay deterministic.
pub fn active_type(
    db: &DirectoryDb,
    company_no: i64,
) -> Result<Option<CompanyExtension>, ServiceError> {
    require_company(db, company_no)?;
    let active = db.active_extensions(company_no)?;
    if active.len() > 1 {
        let records: Vec<String> = active
            .iter()
            .map(|ext| format!("{}#{}", ext.company_type(), ext.record_no()))
            .collect();
        log::warn!(
            "Company {company_no} has {} active type records: {}",
            active.len(),
            records.join(", ")
        );
    }
    Ok(active.into_iter().next())
}

/// Every extension row the company has had, archived or not.
pub fn type_history(
    db: &DirectoryDb,
    company_no: i64,
) -> Result<Vec<CompanyExtension>, ServiceError> {
    require_company(db, company_no)?;
    Ok(db.extensions_for_company(company_no)?)
}

// =============================================================================
// Per-variant extension records
// =============================================================================

pub fn list_extensions<T: ExtensionRecord>(
    db: &DirectoryDb,
    include_archived: bool,
) -> Result<Vec<T>, ServiceError> {
    Ok(db.list_extensions::<T>(include_archived)?)
}

pub fn get_extension<T: ExtensionRecord>(db: &DirectoryDb, record_no: i64) -> Result<T, ServiceError> {
    found(db.get_extension::<T>(record_no)?, T::KIND.as_str(), record_no)
}

fn reject_if_active(
    db: &DirectoryDb,
    company_no: i64,
    except: Option<(CompanyType, i64)>,
) -> Result<(), ServiceError> {
    let other = db
        .active_extensions(company_no)?
        .into_iter()
        .find(|ext| Some((ext.company_type(), ext.record_no())) != except);
    if let Some(ext) = other {
        return Err(ServiceError::Conflict(format!(
            "Company {company_no} already has an active {} record ({}); change the company type instead",
            ext.company_type(),
            ext.record_no()
        )));
    }
    Ok(())
}

/// Insert an extension record directly. Refused when it would give the
/// company a second active extension.
pub fn create_extension<T: ExtensionRecord>(
    db: &DirectoryDb,
    record: T,
) -> Result<T, ServiceError> {
    let company_no = record.company_no();
    require_company(db, company_no)?;
    let record_no = db.with_transaction(|tx| {
        if !record.archived() {
            reject_if_active(tx, company_no, None)?;
        }
        Ok::<_, ServiceError>(tx.insert_extension(&record)?)
    })?;
    log::info!("Created {} record {record_no} for company {company_no}", T::KIND);
    get_extension::<T>(db, record_no)
}

/// Replace the type-specific attributes of a record.
pub fn update_extension<T: ExtensionRecord>(
    db: &DirectoryDb,
    record_no: i64,
    record: T,
) -> Result<T, ServiceError> {
    if db.update_extension(record_no, &record)? == 0 {
        return Err(ServiceError::not_found(T::KIND.as_str(), record_no));
    }
    get_extension::<T>(db, record_no)
}

/// Archive or restore a record. Restoring is refused while the company has
/// a different active extension.
pub fn archive_extension<T: ExtensionRecord>(
    db: &DirectoryDb,
    record_no: i64,
    archived: bool,
) -> Result<T, ServiceError> {
    db.with_transaction(|tx| {
        let existing = get_extension::<T>(tx, record_no)?;
        if !archived {
            reject_if_active(tx, existing.company_no(), Some((T::KIND, record_no)))?;
        }
        tx.set_extension_archived(T::KIND, record_no, archived)?;
        Ok::<_, ServiceError>(())
    })?;
    get_extension::<T>(db, record_no)
}

pub fn delete_extension<T: ExtensionRecord>(
    db: &DirectoryDb,
    record_no: i64,
) -> Result<T, ServiceError> {
    db.with_transaction(|tx| {
        let existing = get_extension::<T>(tx, record_no)?;
        if T::KIND == CompanyType::Agency {
            tx.delete_privacy_settings_for(PrivacyEntityType::Agency, record_no)?;
        }
        tx.delete_extension(T::KIND, record_no)?;
        Ok(existing)
    })
}
