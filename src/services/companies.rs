// Company service: validation and base-row CRUD. Type extensions live in
// `company_types`.

use crate::db::{CompanyInput, DbCompany, DirectoryDb};
use crate::entity::PrivacyEntityType;
use crate::error::ServiceError;
use crate::helpers::clean_opt;

use super::{found, required};

/// Trim fields and reject a blank name.
pub fn validate_company(input: CompanyInput) -> Result<CompanyInput, ServiceError> {
    Ok(CompanyInput {
        name: required(&input.name, "name")?,
        description: clean_opt(input.description),
        fka: clean_opt(input.fka),
        acronym: clean_opt(input.acronym),
        verified: input.verified,
        archived: input.archived,
    })
}

pub fn list_companies(db: &DirectoryDb, include_archived: bool) -> Result<Vec<DbCompany>, ServiceError> {
    Ok(db.get_all_companies(include_archived)?)
}

pub fn get_company(db: &DirectoryDb, company_no: i64) -> Result<DbCompany, ServiceError> {
    found(db.get_company(company_no)?, "Company", company_no)
}

pub fn create_company(db: &DirectoryDb, input: CompanyInput) -> Result<DbCompany, ServiceError> {
    let input = validate_company(input)?;
    let company_no = db.insert_company(&input)?;
    log::info!("Created company {company_no} ({})", input.name);
    get_company(db, company_no)
}

/// Full replace of the base row. Extensions are untouched.
pub fn update_company(
    db: &DirectoryDb,
    company_no: i64,
    input: CompanyInput,
) -> Result<DbCompany, ServiceError> {
    let input = validate_company(input)?;
    if db.update_company(company_no, &input)? == 0 {
        return Err(ServiceError::not_found("Company", company_no));
    }
    get_company(db, company_no)
}

pub fn archive_company(
    db: &DirectoryDb,
    company_no: i64,
    archived: bool,
) -> Result<DbCompany, ServiceError> {
    if db.archive_company(company_no, archived)? == 0 {
        return Err(ServiceError::not_found("Company", company_no));
    }
    get_company(db, company_no)
}

/// Delete a company and return the removed row. Extensions and address
/// links cascade; productions keep their row with the company cleared.
pub fn delete_company(db: &DirectoryDb, company_no: i64) -> Result<DbCompany, ServiceError> {
    db.with_transaction(|tx| {
        let company = get_company(tx, company_no)?;
        let settings = tx.delete_agency_privacy_settings_for_company(company_no)?
            + tx.delete_privacy_settings_for(PrivacyEntityType::Company, company_no)?;
        tx.delete_company(company_no)?;
        log::info!(
            "Deleted company {company_no} ({}) and {settings} privacy setting(s)",
            company.name
        );
        Ok(company)
    })
}

/// Name/fka/acronym search. A blank query matches nothing.
pub fn search_companies(
    db: &DirectoryDb,
    query: &str,
    limit: usize,
) -> Result<Vec<DbCompany>, ServiceError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(db.search_companies(query, limit)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[test]
    fn test_create_trims_and_requires_name() {
        let db = test_db();
        let err = create_company(
            &db,
            CompanyInput {
                name: "   ".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let company = create_company(
            &db,
            CompanyInput {
                name: "  Acme Talent ".to_string(),
                acronym: Some(" ".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(company.name, "Acme Talent");
        assert_eq!(company.acronym, None);
    }

    #[test]
    fn test_missing_company_is_not_found() {
        let db = test_db();
        assert!(matches!(
            get_company(&db, 99),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            archive_company(&db, 99, true),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            delete_company(&db, 99),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_blank_search_returns_nothing() {
        let db = test_db();
        create_company(
            &db,
            CompanyInput {
                name: "Acme".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(search_companies(&db, "  ", 10).unwrap().is_empty());
        assert_eq!(search_companies(&db, "acm", 10).unwrap().len(), 1);
    }
}
