// Production service. Every rule is checked before any write; the schema
// CHECK constraints only back this up.

use crate::db::{DbProduction, DirectoryDb, ProductionFilter, ProductionInput};
use crate::error::ServiceError;
use crate::helpers::clean_opt;

use super::found;

const MAX_SEASON_CHARS: usize = 10;
const MAX_FESTIVAL_CHARS: usize = 30;

fn check_length(value: &Option<String>, field: &str, max: usize) -> Result<(), ServiceError> {
    if let Some(v) = value {
        let chars = v.chars().count();
        if chars > max {
            return Err(ServiceError::validation(format!(
                "{field} must be at most {max} characters (got {chars})"
            )));
        }
    }
    Ok(())
}

/// Validate a production. On create both references are required; on
/// update they may be cleared. Any reference given must exist.
pub fn validate_production(
    db: &DirectoryDb,
    input: ProductionInput,
    creating: bool,
) -> Result<ProductionInput, ServiceError> {
    let input = ProductionInput {
        season: clean_opt(input.season),
        festival: clean_opt(input.festival),
        ..input
    };

    if creating {
        if input.play_no.is_none() {
            return Err(ServiceError::validation("play_no is required"));
        }
        if input.company_no.is_none() {
            return Err(ServiceError::validation("company_no is required"));
        }
    }
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(ServiceError::validation(format!(
                "end_date {end} is before start_date {start}"
            )));
        }
    }
    check_length(&input.season, "season", MAX_SEASON_CHARS)?;
    check_length(&input.festival, "festival", MAX_FESTIVAL_CHARS)?;

    if let Some(play_no) = input.play_no {
        if !db.row_exists("plays", "play_no", play_no)? {
            return Err(ServiceError::validation(format!("Play {play_no} does not exist")));
        }
    }
    if let Some(company_no) = input.company_no {
        if !db.row_exists("companies", "company_no", company_no)? {
            return Err(ServiceError::validation(format!(
                "Company {company_no} does not exist"
            )));
        }
    }
    Ok(input)
}

pub fn list_productions(
    db: &DirectoryDb,
    filter: &ProductionFilter,
) -> Result<Vec<DbProduction>, ServiceError> {
    Ok(db.get_productions(filter)?)
}

pub fn get_production(db: &DirectoryDb, production_no: i64) -> Result<DbProduction, ServiceError> {
    found(db.get_production(production_no)?, "Production", production_no)
}

pub fn create_production(
    db: &DirectoryDb,
    input: ProductionInput,
) -> Result<DbProduction, ServiceError> {
    let input = validate_production(db, input, true)?;
    let production_no = db.insert_production(&input)?;
    get_production(db, production_no)
}

pub fn update_production(
    db: &DirectoryDb,
    production_no: i64,
    input: ProductionInput,
) -> Result<DbProduction, ServiceError> {
    get_production(db, production_no)?;
    let input = validate_production(db, input, false)?;
    db.update_production(production_no, &input)?;
    get_production(db, production_no)
}

pub fn delete_production(
    db: &DirectoryDb,
    production_no: i64,
) -> Result<DbProduction, ServiceError> {
    let production = get_production(db, production_no)?;
    db.delete_production(production_no)?;
    Ok(production)
}
