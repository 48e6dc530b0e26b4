//! Shared type definitions for the database layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::PrivacyEntityType;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

impl DbError {
    /// True when SQLite refused the write because of a UNIQUE or PRIMARY KEY
    /// constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.extended_code,
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            ),
            _ => false,
        }
    }
}

// =============================================================================
// Companies
// =============================================================================

/// A row from the `companies` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbCompany {
    pub company_no: i64,
    pub name: String,
    pub description: Option<String>,
    pub fka: Option<String>,
    pub acronym: Option<String>,
    pub verified: bool,
    pub archived: bool,
}

/// Payload for creating or fully replacing a company.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyInput {
    pub name: String,
    pub description: Option<String>,
    pub fka: Option<String>,
    pub acronym: Option<String>,
    pub verified: bool,
    pub archived: bool,
}

// =============================================================================
// Addresses
// =============================================================================

/// A row from the `addresses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbAddress {
    pub address_no: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone1: Option<String>,
    pub phone2: Option<String>,
    pub phone3: Option<String>,
    pub email1: Option<String>,
    pub email2: Option<String>,
    pub website1: Option<String>,
    pub website2: Option<String>,
    pub fax: Option<String>,
    pub verified: bool,
}

/// Payload for creating or fully replacing an address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressInput {
    pub line1: String,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: Option<String>,
    pub phone1: Option<String>,
    pub phone2: Option<String>,
    pub phone3: Option<String>,
    pub email1: Option<String>,
    pub email2: Option<String>,
    pub website1: Option<String>,
    pub website2: Option<String>,
    pub fax: Option<String>,
    pub verified: bool,
}

/// An address as seen through one owner's link row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedAddress {
    #[serde(flatten)]
    pub address: DbAddress,
    pub location: Option<String>,
    pub relationship_archived: bool,
}

/// A row from `company_addresses` / `people_addresses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbAddressLink {
    pub owner_no: i64,
    pub address_no: i64,
    pub location: Option<String>,
    pub relationship_archived: bool,
}

// =============================================================================
// People
// =============================================================================

/// A row from the `people` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbPerson {
    pub people_no: i64,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub no_book: bool,
    pub archived: bool,
}

/// Payload for creating or fully replacing a person.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonInput {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub no_book: bool,
    pub archived: bool,
}

// =============================================================================
// Plays and productions
// =============================================================================

/// A row from the `plays` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbPlay {
    pub play_no: i64,
    pub title: String,
    pub playwright: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayInput {
    pub title: String,
    pub playwright: Option<String>,
    pub archived: bool,
}

/// A row from the `play_productions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbProduction {
    pub production_no: i64,
    pub play_no: Option<i64>,
    pub company_no: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub season: Option<String>,
    pub festival: Option<String>,
    pub canceled: bool,
    pub archived: bool,
}

/// Payload for creating or fully replacing a production.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductionInput {
    pub play_no: Option<i64>,
    pub company_no: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub season: Option<String>,
    pub festival: Option<String>,
    pub canceled: bool,
    pub archived: bool,
}

/// Filters for listing productions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductionFilter {
    pub play_no: Option<i64>,
    pub company_no: Option<i64>,
    pub archived: bool,
}

// =============================================================================
// Privacy settings
// =============================================================================

/// A row from the `privacy_settings` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbPrivacySetting {
    pub id: i64,
    pub entity_type: PrivacyEntityType,
    pub entity_no: i64,
    pub field_name: String,
    pub is_private_online: bool,
    pub is_private_publication: bool,
}

/// Payload for creating a privacy setting.
#[derive(Debug, Clone, Deserialize)]
pub struct PrivacySettingInput {
    pub entity_type: PrivacyEntityType,
    pub entity_no: i64,
    pub field_name: String,
    #[serde(default)]
    pub is_private_online: bool,
    #[serde(default)]
    pub is_private_publication: bool,
}

/// Partial update for a privacy setting. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrivacyPatch {
    pub entity_type: Option<PrivacyEntityType>,
    pub entity_no: Option<i64>,
    pub field_name: Option<String>,
    pub is_private_online: Option<bool>,
    pub is_private_publication: Option<bool>,
}

impl PrivacyPatch {
    /// Apply the patch over an existing row.
    pub fn apply_to(&self, setting: &mut DbPrivacySetting) {
        if let Some(entity_type) = self.entity_type {
            setting.entity_type = entity_type;
        }
        if let Some(entity_no) = self.entity_no {
            setting.entity_no = entity_no;
        }
        if let Some(ref field_name) = self.field_name {
            setting.field_name = field_name.trim().to_string();
        }
        if let Some(flag) = self.is_private_online {
            setting.is_private_online = flag;
        }
        if let Some(flag) = self.is_private_publication {
            setting.is_private_publication = flag;
        }
    }

    /// True when only the two flags are set (the shape bulk updates accept).
    pub fn is_flags_only(&self) -> bool {
        self.entity_type.is_none() && self.entity_no.is_none() && self.field_name.is_none()
    }
}
