// Privacy settings service.
//
// One setting per (entity_type, entity_no, field_name). Field names must come
// from the entity type's fixed list and the entity must exist. Bulk
// operations are all-or-nothing: a single unknown id aborts the whole batch.

use crate::db::{DbPrivacySetting, DirectoryDb, PrivacyPatch, PrivacySettingInput};
use crate::entity::PrivacyEntityType;
use crate::error::ServiceError;

use super::found;

/// Parse an entity type label from a query string.
pub fn parse_entity_type(label: &str) -> Result<PrivacyEntityType, ServiceError> {
    PrivacyEntityType::parse(label.trim()).ok_or_else(|| {
        ServiceError::validation(format!(
            "entity type '{label}' must be one of Company, People, Address, Agency"
        ))
    })
}

/// Field names that can be flagged for an entity type.
pub fn available_fields(entity_type: &str) -> Result<&'static [&'static str], ServiceError> {
    Ok(parse_entity_type(entity_type)?.available_fields())
}

fn validate_target(
    db: &DirectoryDb,
    entity_type: PrivacyEntityType,
    entity_no: i64,
    field_name: &str,
) -> Result<(), ServiceError> {
    if !entity_type.available_fields().contains(&field_name) {
        return Err(ServiceError::validation(format!(
            "'{field_name}' is not a privacy field for {}",
            entity_type.as_str()
        )));
    }
    let (table, key) = entity_type.target();
    if !db.row_exists(table, key, entity_no)? {
        return Err(ServiceError::validation(format!(
            "{} {entity_no} does not exist",
            entity_type.as_str()
        )));
    }
    Ok(())
}

fn duplicate(entity_type: PrivacyEntityType, entity_no: i64, field_name: &str) -> ServiceError {
    ServiceError::Conflict(format!(
        "A privacy setting for {} {entity_no} field '{field_name}' already exists",
        entity_type.as_str()
    ))
}

pub fn list_settings(
    db: &DirectoryDb,
    entity_type: Option<PrivacyEntityType>,
    entity_no: Option<i64>,
) -> Result<Vec<DbPrivacySetting>, ServiceError> {
    Ok(db.get_privacy_settings(entity_type, entity_no)?)
}

pub fn get_setting(db: &DirectoryDb, id: i64) -> Result<DbPrivacySetting, ServiceError> {
    found(db.get_privacy_setting(id)?, "Privacy setting", id)
}

pub fn create_setting(
    db: &DirectoryDb,
    input: PrivacySettingInput,
) -> Result<DbPrivacySetting, ServiceError> {
    let input = PrivacySettingInput {
        field_name: input.field_name.trim().to_string(),
        ..input
    };
    validate_target(db, input.entity_type, input.entity_no, &input.field_name)?;
    let id = db.insert_privacy_setting(&input).map_err(|e| {
        if e.is_unique_violation() {
            duplicate(input.entity_type, input.entity_no, &input.field_name)
        } else {
            e.into()
        }
    })?;
    get_setting(db, id)
}

/// Patch one setting. Absent fields keep their stored value.
pub fn update_setting(
    db: &DirectoryDb,
    id: i64,
    patch: &PrivacyPatch,
) -> Result<DbPrivacySetting, ServiceError> {
    let mut setting = get_setting(db, id)?;
    patch.apply_to(&mut setting);
    validate_target(db, setting.entity_type, setting.entity_no, &setting.field_name)?;
    db.update_privacy_setting(&setting).map_err(|e| {
        if e.is_unique_violation() {
            duplicate(setting.entity_type, setting.entity_no, &setting.field_name)
        } else {
            e.into()
        }
    })?;
    get_setting(db, id)
}

pub fn delete_setting(db: &DirectoryDb, id: i64) -> Result<DbPrivacySetting, ServiceError> {
    let setting = get_setting(db, id)?;
    db.delete_privacy_setting(id)?;
    Ok(setting)
}

pub fn toggle_online(db: &DirectoryDb, id: i64) -> Result<DbPrivacySetting, ServiceError> {
    if db.toggle_privacy_online(id)? == 0 {
        return Err(ServiceError::not_found("Privacy setting", id));
    }
    get_setting(db, id)
}

pub fn toggle_publication(db: &DirectoryDb, id: i64) -> Result<DbPrivacySetting, ServiceError> {
    if db.toggle_privacy_publication(id)? == 0 {
        return Err(ServiceError::not_found("Privacy setting", id));
    }
    get_setting(db, id)
}

/// Drop repeated ids, keeping first occurrence order. Empty lists are rejected.
fn unique_ids(ids: &[i64]) -> Result<Vec<i64>, ServiceError> {
    if ids.is_empty() {
        return Err(ServiceError::validation("ids must not be empty"));
    }
    let mut out: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    Ok(out)
}

/// Apply the same flag patch to every id and return the updated rows.
pub fn bulk_update(
    db: &DirectoryDb,
    ids: &[i64],
    patch: &PrivacyPatch,
) -> Result<Vec<DbPrivacySetting>, ServiceError> {
    let ids = unique_ids(ids)?;
    if !patch.is_flags_only() {
        return Err(ServiceError::validation(
            "bulk updates may only change is_private_online and is_private_publication",
        ));
    }
    if patch.is_private_online.is_none() && patch.is_private_publication.is_none() {
        return Err(ServiceError::validation("updates must set at least one flag"));
    }

    let updated = db.with_transaction(|tx| {
        let mut updated = Vec::with_capacity(ids.len());
        for &id in &ids {
            let mut setting = get_setting(tx, id)?;
            patch.apply_to(&mut setting);
            tx.update_privacy_setting(&setting)?;
            updated.push(setting);
        }
        Ok::<_, ServiceError>(updated)
    })?;
    log::info!("Bulk-updated {} privacy setting(s)", updated.len());
    Ok(updated)
}

/// Delete every id and return the removed rows.
pub fn bulk_delete(db: &DirectoryDb, ids: &[i64]) -> Result<Vec<DbPrivacySetting>, ServiceError> {
    let ids = unique_ids(ids)?;
    let deleted = db.with_transaction(|tx| {
        let mut deleted = Vec::with_capacity(ids.len());
        for &id in &ids {
            deleted.push(delete_setting(tx, id)?);
        }
        Ok::<_, ServiceError>(deleted)
    })?;
    log::info!("Bulk-deleted {} privacy setting(s)", deleted.len());
    Ok(deleted)
}
