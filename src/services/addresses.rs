// Address service: address CRUD plus the owner/address link workflows for
// both companies and people.

use crate::db::{AddressInput, DbAddress, DbAddressLink, DirectoryDb, LinkedAddress};
use crate::entity::{AddressOwner, PrivacyEntityType};
use crate::error::ServiceError;
use crate::helpers::{clean_opt, looks_like_email};

use super::{found, required};

/// Trim every field, require `line1`, `city`, `state` and `zip`, and
/// shape-check emails.
pub fn validate_address(input: AddressInput) -> Result<AddressInput, ServiceError> {
    let email1 = clean_opt(input.email1);
    let email2 = clean_opt(input.email2);
    for (field, email) in [("email1", &email1), ("email2", &email2)] {
        if let Some(value) = email {
            if !looks_like_email(value) {
                return Err(ServiceError::validation(format!(
                    "{field} '{value}' is not a valid email address"
                )));
            }
        }
    }

    Ok(AddressInput {
        line1: required(&input.line1, "line1")?,
        line2: clean_opt(input.line2),
        line3: clean_opt(input.line3),
        city: required(&input.city, "city")?,
        state: required(&input.state, "state")?,
        zip: required(&input.zip, "zip")?,
        country: clean_opt(input.country),
        phone1: clean_opt(input.phone1),
        phone2: clean_opt(input.phone2),
        phone3: clean_opt(input.phone3),
        email1,
        email2,
        website1: clean_opt(input.website1),
        website2: clean_opt(input.website2),
        fax: clean_opt(input.fax),
        verified: input.verified,
    })
}

// =============================================================================
// Address CRUD
// =============================================================================

pub fn list_addresses(db: &DirectoryDb) -> Result<Vec<DbAddress>, ServiceError> {
    Ok(db.get_all_addresses()?)
}

pub fn get_address(db: &DirectoryDb, address_no: i64) -> Result<DbAddress, ServiceError> {
    found(db.get_address(address_no)?, "Address", address_no)
}

pub fn create_address(db: &DirectoryDb, input: AddressInput) -> Result<DbAddress, ServiceError> {
    let input = validate_address(input)?;
    let address_no = db.insert_address(&input)?;
    get_address(db, address_no)
}

/// Full replace. Returns the stored row.
pub fn update_address(
    db: &DirectoryDb,
    address_no: i64,
    input: AddressInput,
) -> Result<DbAddress, ServiceError> {
    let input = validate_address(input)?;
    if db.update_address(address_no, &input)? == 0 {
        return Err(ServiceError::not_found("Address", address_no));
    }
    get_address(db, address_no)
}

/// Delete an address and return the removed row.
///
/// An address still linked to a company or person is refused with
/// `Conflict` unless `cascade` is set, in which case the links go too.
pub fn delete_address(
    db: &DirectoryDb,
    address_no: i64,
    cascade: bool,
) -> Result<DbAddress, ServiceError> {
    db.with_transaction(|tx| {
        let address = get_address(tx, address_no)?;
        let references = tx.count_address_references(address_no)?;
        if references > 0 {
            if !cascade {
                return Err(ServiceError::Conflict(format!(
                    "Address {address_no} is linked to {references} record(s); \
                     remove the links or pass cascade=true"
                )));
            }
            let removed = tx.delete_links_for_address(address_no)?;
            log::info!("Removed {removed} link(s) to address {address_no}");
        }
        tx.delete_privacy_settings_for(PrivacyEntityType::Address, address_no)?;
        tx.delete_address(address_no)?;
        Ok(address)
    })
}

// =============================================================================
// Owner links
// =============================================================================

fn require_owner(db: &DirectoryDb, owner: AddressOwner) -> Result<(), ServiceError> {
    let (table, key) = owner.owner_table();
    if !db.row_exists(table, key, owner.id())? {
        return Err(ServiceError::not_found(owner.label(), owner.id()));
    }
    Ok(())
}

fn require_link(
    db: &DirectoryDb,
    owner: AddressOwner,
    address_no: i64,
) -> Result<DbAddressLink, ServiceError> {
    db.get_address_link(owner, address_no)?.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "{} {} is not linked to address {address_no}",
            owner.label(),
            owner.id()
        ))
    })
}

fn duplicate_link(owner: AddressOwner, address_no: i64) -> ServiceError {
    ServiceError::Conflict(format!(
        "{} {} is already linked to address {address_no}",
        owner.label(),
        owner.id()
    ))
}

/// Addresses linked to an owner. Archived links only when asked.
pub fn list_linked_addresses(
    db: &DirectoryDb,
    owner: AddressOwner,
    include_archived: bool,
) -> Result<Vec<LinkedAddress>, ServiceError> {
    require_owner(db, owner)?;
    Ok(db.get_linked_addresses(owner, include_archived)?)
}

/// Link an existing address to an owner.
pub fn add_address(
    db: &DirectoryDb,
    owner: AddressOwner,
    address_no: i64,
    location: Option<String>,
) -> Result<LinkedAddress, ServiceError> {
    require_owner(db, owner)?;
    let address = get_address(db, address_no)?;
    if db.get_address_link(owner, address_no)?.is_some() {
        return Err(duplicate_link(owner, address_no));
    }
    let location = clean_opt(location);
    db.insert_address_link(owner, address_no, location.as_deref())
        .map_err(|e| {
            if e.is_unique_violation() {
                duplicate_link(owner, address_no)
            } else {
                e.into()
            }
        })?;
    Ok(LinkedAddress {
        address,
        location,
        relationship_archived: false,
    })
}

/// Create a new address and link it to the owner in one transaction.
pub fn create_and_link_address(
    db: &DirectoryDb,
    owner: AddressOwner,
    input: AddressInput,
    location: Option<String>,
) -> Result<LinkedAddress, ServiceError> {
    let input = validate_address(input)?;
    let location = clean_opt(location);
    require_owner(db, owner)?;
    let address_no = db.with_transaction(|tx| {
        let address_no = tx.insert_address(&input)?;
        tx.insert_address_link(owner, address_no, location.as_deref())?;
        Ok::<_, ServiceError>(address_no)
    })?;
    log::info!(
        "Created address {address_no} for {} {}",
        owner.label(),
        owner.id()
    );
    Ok(LinkedAddress {
        address: get_address(db, address_no)?,
        location,
        relationship_archived: false,
    })
}

/// Remove the link only. The address and owner rows stay.
pub fn remove_address(
    db: &DirectoryDb,
    owner: AddressOwner,
    address_no: i64,
) -> Result<(), ServiceError> {
    if db.delete_address_link(owner, address_no)? == 0 {
        require_link(db, owner, address_no)?;
    }
    Ok(())
}

/// Archive or restore one link.
pub fn archive_address(
    db: &DirectoryDb,
    owner: AddressOwner,
    address_no: i64,
    archived: bool,
) -> Result<DbAddressLink, ServiceError> {
    if db.set_address_link_archived(owner, address_no, archived)? == 0 {
        require_link(db, owner, address_no)?;
    }
    require_link(db, owner, address_no)
}

/// Relabel one link. A blank label clears it.
pub fn update_location(
    db: &DirectoryDb,
    owner: AddressOwner,
    address_no: i64,
    location: Option<String>,
) -> Result<DbAddressLink, ServiceError> {
    let location = clean_opt(location);
    if db.set_address_link_location(owner, address_no, location.as_deref())? == 0 {
        require_link(db, owner, address_no)?;
    }
    require_link(db, owner, address_no)
}

/// Apply an archive flag and/or a new label to one link atomically.
pub fn update_link(
    db: &DirectoryDb,
    owner: AddressOwner,
    address_no: i64,
    archived: Option<bool>,
    location: Option<String>,
) -> Result<DbAddressLink, ServiceError> {
    if archived.is_none() && location.is_none() {
        return Err(ServiceError::validation(
            "Provide archived and/or location",
        ));
    }
    db.with_transaction(|tx| {
        if let Some(flag) = archived {
            archive_address(tx, owner, address_no, flag)?;
        }
        match location {
            Some(label) => update_location(tx, owner, address_no, Some(label)),
            None => require_link(tx, owner, address_no),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{sample_address, seed_address, seed_company, seed_person, test_db};

    #[test]
    fn test_validation_rules() {
        let missing_zip = AddressInput {
            zip: " ".to_string(),
            ..sample_address("1 Main St")
        };
        assert!(matches!(
            validate_address(missing_zip),
            Err(ServiceError::Validation(_))
        ));

        let missing_city = AddressInput {
            city: String::new(),
            ..sample_address("1 Main St")
        };
        match validate_address(missing_city) {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, "city is required"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let missing_state = AddressInput {
            state: "  ".to_string(),
            ..sample_address("1 Main St")
        };
        match validate_address(missing_state) {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, "state is required"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let bad_email = AddressInput {
            email1: Some("not-an-email".to_string()),
            ..sample_address("1 Main St")
        };
        assert!(matches!(
            validate_address(bad_email),
            Err(ServiceError::Validation(_))
        ));

        let blank_email = AddressInput {
            email2: Some("  ".to_string()),
            ..sample_address("1 Main St")
        };
        assert_eq!(validate_address(blank_email).unwrap().email2, None);
    }

    #[test]
    fn test_put_then_get_returns_submitted_values() {
        let db = test_db();
        let id = seed_address(&db, "1 Main St");
        let submitted = AddressInput {
            line1: "630 Ninth Ave".to_string(),
            line2: Some("Floor 4".to_string()),
            city: "New York".to_string(),
            state: "NY".to_string(),
            zip: "10036".to_string(),
            country: Some("USA".to_string()),
            phone1: Some("212-555-0199".to_string()),
            email1: Some("front@studio.com".to_string()),
            website1: Some("studio.com".to_string()),
            verified: true,
            ..Default::default()
        };
        let updated = update_address(&db, id, submitted.clone()).unwrap();
        let fetched = get_address(&db, id).unwrap();
        assert_eq!(updated, fetched);
        assert_eq!(fetched.line1, submitted.line1);
        assert_eq!(fetched.line2, submitted.line2);
        assert_eq!(fetched.phone1, submitted.phone1);
        assert_eq!(fetched.email1, submitted.email1);
        assert_eq!(fetched.website1, submitted.website1);
        assert!(fetched.verified);
    }

    #[test]
    fn test_link_archive_cycle() {
        let db = test_db();
        let owner = AddressOwner::Company(seed_company(&db, "Acme"));
        let address = seed_address(&db, "1 Main St");

        add_address(&db, owner, address, Some("box office".to_string())).unwrap();
        assert_eq!(list_linked_addresses(&db, owner, false).unwrap().len(), 1);

        archive_address(&db, owner, address, true).unwrap();
        assert!(list_linked_addresses(&db, owner, false).unwrap().is_empty());

        let link = archive_address(&db, owner, address, false).unwrap();
        assert!(!link.relationship_archived);
        let listed = list_linked_addresses(&db, owner, false).unwrap();
        assert_eq!(listed[0].location.as_deref(), Some("box office"));
    }

    #[test]
    fn test_duplicate_link_conflicts() {
        let db = test_db();
        let owner = AddressOwner::Person(seed_person(&db, "Uta", "Hagen"));
        let address = seed_address(&db, "1 Main St");
        add_address(&db, owner, address, None).unwrap();
        assert!(matches!(
            add_address(&db, owner, address, None),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn test_add_requires_owner_and_address() {
        let db = test_db();
        let address = seed_address(&db, "1 Main St");
        assert!(matches!(
            add_address(&db, AddressOwner::Company(404), address, None),
            Err(ServiceError::NotFound(_))
        ));
        let owner = AddressOwner::Company(seed_company(&db, "Acme"));
        assert!(matches!(
            add_address(&db, owner, address + 1, None),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_missing_link_leaves_rows() {
        let db = test_db();
        let company = seed_company(&db, "Acme");
        let owner = AddressOwner::Company(company);
        let address = seed_address(&db, "1 Main St");

        let err = remove_address(&db, owner, address).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(db.get_address(address).unwrap().is_some());
        assert!(db.get_company(company).unwrap().is_some());
    }

    #[test]
    fn test_create_and_link_is_atomic() {
        let db = test_db();
        let owner = AddressOwner::Person(seed_person(&db, "Uta", "Hagen"));
        let linked = create_and_link_address(
            &db,
            owner,
            sample_address("27 Bank St"),
            Some("home".to_string()),
        )
        .unwrap();
        assert_eq!(linked.location.as_deref(), Some("home"));
        assert_eq!(list_linked_addresses(&db, owner, false).unwrap().len(), 1);

        let before = db.get_all_addresses().unwrap().len();
        let err = create_and_link_address(
            &db,
            AddressOwner::Person(999),
            sample_address("Nowhere"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(db.get_all_addresses().unwrap().len(), before);
    }

    #[test]
    fn test_delete_linked_address_needs_cascade() {
        let db = test_db();
        let person = seed_person(&db, "Uta", "Hagen");
        let owner = AddressOwner::Person(person);
        let address = seed_address(&db, "27 Bank St");
        add_address(&db, owner, address, None).unwrap();

        let err = delete_address(&db, address, false).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(db.get_address(address).unwrap().is_some());
        assert_eq!(db.count_address_references(address).unwrap(), 1);

        let removed = delete_address(&db, address, true).unwrap();
        assert_eq!(removed.address_no, address);
        assert!(db.get_address(address).unwrap().is_none());
        assert!(db.get_person(person).unwrap().is_some());
        assert!(list_linked_addresses(&db, owner, true).unwrap().is_empty());
    }

    #[test]
    fn test_update_link_relabels_and_archives() {
        let db = test_db();
        let owner = AddressOwner::Company(seed_company(&db, "Acme"));
        let address = seed_address(&db, "1 Main St");
        add_address(&db, owner, address, Some("office".to_string())).unwrap();

        let link = update_link(&db, owner, address, Some(true), Some("warehouse".to_string()))
            .unwrap();
        assert!(link.relationship_archived);
        assert_eq!(link.location.as_deref(), Some("warehouse"));

        assert!(matches!(
            update_link(&db, owner, address, None, None),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            update_link(&db, owner, address + 1, Some(false), None),
            Err(ServiceError::NotFound(_))
        ));
    }
}
