// People service: validation and person CRUD. Address links go through
// `services::addresses` with `AddressOwner::Person`.

use crate::db::{DbPerson, DirectoryDb, PersonInput};
use crate::entity::PrivacyEntityType;
use crate::error::ServiceError;
use crate::helpers::clean_opt;

use super::found;

/// Trim names; at least one of first or last name must remain.
pub fn validate_person(input: PersonInput) -> Result<PersonInput, ServiceError> {
    let person = PersonInput {
        first_name: clean_opt(input.first_name),
        middle_name: clean_opt(input.middle_name),
        last_name: clean_opt(input.last_name),
        no_book: input.no_book,
        archived: input.archived,
    };
    if person.first_name.is_none() && person.last_name.is_none() {
        return Err(ServiceError::validation(
            "first_name or last_name is required",
        ));
    }
    Ok(person)
}

pub fn list_people(db: &DirectoryDb, include_archived: bool) -> Result<Vec<DbPerson>, ServiceError> {
    Ok(db.get_all_people(include_archived)?)
}

pub fn get_person(db: &DirectoryDb, people_no: i64) -> Result<DbPerson, ServiceError> {
    found(db.get_person(people_no)?, "Person", people_no)
}

pub fn create_person(db: &DirectoryDb, input: PersonInput) -> Result<DbPerson, ServiceError> {
    let input = validate_person(input)?;
    let people_no = db.insert_person(&input)?;
    log::info!("Created person {people_no}");
    get_person(db, people_no)
}

pub fn update_person(
    db: &DirectoryDb,
    people_no: i64,
    input: PersonInput,
) -> Result<DbPerson, ServiceError> {
    let input = validate_person(input)?;
    if db.update_person(people_no, &input)? == 0 {
        return Err(ServiceError::not_found("Person", people_no));
    }
    get_person(db, people_no)
}

pub fn archive_person(
    db: &DirectoryDb,
    people_no: i64,
    archived: bool,
) -> Result<DbPerson, ServiceError> {
    if db.archive_person(people_no, archived)? == 0 {
        return Err(ServiceError::not_found("Person", people_no));
    }
    get_person(db, people_no)
}

/// Delete a person and return the removed row. Links cascade.
pub fn delete_person(db: &DirectoryDb, people_no: i64) -> Result<DbPerson, ServiceError> {
    db.with_transaction(|tx| {
        let person = get_person(tx, people_no)?;
        let settings = tx.delete_privacy_settings_for(PrivacyEntityType::People, people_no)?;
        tx.delete_person(people_no)?;
        log::info!("Deleted person {people_no} and {settings} privacy setting(s)");
        Ok(person)
    })
}

pub fn search_people(
    db: &DirectoryDb,
    query: &str,
    limit: usize,
) -> Result<Vec<DbPerson>, ServiceError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(db.search_people(query, limit)?)
}
