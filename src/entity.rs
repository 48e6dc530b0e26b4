//! Entity kinds shared by the store, the services and the HTTP layer.
//!
//! A company carries no type column. Its type is whichever extension table
//! holds its single active (`archived = 0`) row; `CompanyType` names those
//! tables and fixes the order in which they are probed.

use serde::{Deserialize, Serialize};

/// The six company-type extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyType {
    Agency,
    Casting,
    Theater,
    School,
    RentalStudio,
    RentalSpace,
}

impl CompanyType {
    /// Probe order for active-type lookup. Earlier entries win when a
    /// company has more than one active extension.
    pub const PROBE_ORDER: [CompanyType; 6] = [
        CompanyType::Agency,
        CompanyType::Casting,
        CompanyType::Theater,
        CompanyType::School,
        CompanyType::RentalStudio,
        CompanyType::RentalSpace,
    ];

    /// Wire label, also used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyType::Agency => "Agency",
            CompanyType::Casting => "Casting",
            CompanyType::Theater => "Theater",
            CompanyType::School => "School",
            CompanyType::RentalStudio => "RentalStudio",
            CompanyType::RentalSpace => "RentalSpace",
        }
    }

    /// Parse a wire label. Case-insensitive, tolerates `_`/`-`/space
    /// separators ("rental-studio", "Rental Studio"). Unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let key = crate::helpers::normalize_key(s);
        CompanyType::PROBE_ORDER
            .into_iter()
            .find(|t| crate::helpers::normalize_key(t.as_str()) == key)
    }

    /// Extension table name.
    pub fn table(&self) -> &'static str {
        match self {
            CompanyType::Agency => "agencies",
            CompanyType::Casting => "casting_companies",
            CompanyType::Theater => "theaters",
            CompanyType::School => "schools",
            CompanyType::RentalStudio => "rental_studios",
            CompanyType::RentalSpace => "rental_spaces",
        }
    }

    /// Surrogate key column of the extension table.
    pub fn id_column(&self) -> &'static str {
        match self {
            CompanyType::Agency => "agency_no",
            CompanyType::Casting => "casting_company_no",
            CompanyType::Theater => "theater_no",
            CompanyType::School => "school_no",
            CompanyType::RentalStudio => "studio_no",
            CompanyType::RentalSpace => "space_no",
        }
    }

    /// Type-specific attribute columns, in storage order.
    pub fn attribute_columns(&self) -> &'static [&'static str] {
        match self {
            CompanyType::Agency => &["union_franchised", "represents", "submission_policy"],
            CompanyType::Casting => &["casting_for", "accepts_unsolicited"],
            CompanyType::Theater => &["seating_capacity", "union_contract"],
            CompanyType::School => &["programs", "accredited"],
            CompanyType::RentalStudio => &["room_count", "hourly_rate"],
            CompanyType::RentalSpace => &["capacity", "space_kind"],
        }
    }
}

impl std::fmt::Display for CompanyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity kinds that can carry privacy settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrivacyEntityType {
    Company,
    People,
    Address,
    Agency,
}

impl PrivacyEntityType {
    /// String label for SQL storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyEntityType::Company => "Company",
            PrivacyEntityType::People => "People",
            PrivacyEntityType::Address => "Address",
            PrivacyEntityType::Agency => "Agency",
        }
    }

    /// Parse from a query-string or SQL label. Exact match only.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Company" => Some(PrivacyEntityType::Company),
            "People" => Some(PrivacyEntityType::People),
            "Address" => Some(PrivacyEntityType::Address),
            "Agency" => Some(PrivacyEntityType::Agency),
            _ => None,
        }
    }

    /// Table and key column holding the referenced rows.
    pub fn target(&self) -> (&'static str, &'static str) {
        match self {
            PrivacyEntityType::Company => ("companies", "company_no"),
            PrivacyEntityType::People => ("people", "people_no"),
            PrivacyEntityType::Address => ("addresses", "address_no"),
            PrivacyEntityType::Agency => ("agencies", "agency_no"),
        }
    }

    /// Field names eligible for privacy flagging.
    pub fn available_fields(&self) -> &'static [&'static str] {
        match self {
            PrivacyEntityType::Company => &["name", "description", "fka", "acronym"],
            PrivacyEntityType::People => &["first_name", "middle_name", "last_name"],
            PrivacyEntityType::Address => &[
                "line1", "line2", "line3", "city", "state", "zip", "country", "phone1", "phone2",
                "phone3", "email1", "email2", "website1", "website2", "fax",
            ],
            PrivacyEntityType::Agency => &["represents", "submission_policy"],
        }
    }
}

/// The owning side of an address link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressOwner {
    Company(i64),
    Person(i64),
}

impl AddressOwner {
    pub fn id(&self) -> i64 {
        match self {
            AddressOwner::Company(id) | AddressOwner::Person(id) => *id,
        }
    }

    /// Link table name.
    pub fn link_table(&self) -> &'static str {
        match self {
            AddressOwner::Company(_) => "company_addresses",
            AddressOwner::Person(_) => "people_addresses",
        }
    }

    /// Owner table and key column (also the key column in the link table).
    pub fn owner_table(&self) -> (&'static str, &'static str) {
        match self {
            AddressOwner::Company(_) => ("companies", "company_no"),
            AddressOwner::Person(_) => ("people", "people_no"),
        }
    }

    /// Noun used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            AddressOwner::Company(_) => "Company",
            AddressOwner::Person(_) => "Person",
        }
    }
}
