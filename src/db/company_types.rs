use super::*;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row};
use serde::de::DeserializeOwned;

use crate::entity::CompanyType;

// =============================================================================
// Extension records
// =============================================================================

/// A row type stored in one of the company-type extension tables.
///
/// Every extension table has the layout
/// `(<id_column>, company_no, <attribute_columns...>, archived)`;
/// `CompanyType` supplies the names, this trait supplies the values.
pub trait ExtensionRecord:
    Sized + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: CompanyType;

    fn record_no(&self) -> i64;
    fn company_no(&self) -> i64;
    fn archived(&self) -> bool;

    /// Attribute values in `CompanyType::attribute_columns` order.
    fn attribute_values(&self) -> Vec<Value>;

    /// Build from a row selected by `extension_select`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn into_extension(self) -> CompanyExtension;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    #[serde(default)]
    pub agency_no: i64,
    pub company_no: i64,
    #[serde(default)]
    pub union_franchised: bool,
    #[serde(default)]
    pub represents: Option<String>,
    #[serde(default)]
    pub submission_policy: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl ExtensionRecord for Agency {
    const KIND: CompanyType = CompanyType::Agency;

    fn record_no(&self) -> i64 {
        self.agency_no
    }
    fn company_no(&self) -> i64 {
        self.company_no
    }
    fn archived(&self) -> bool {
        self.archived
    }
    fn attribute_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.union_franchised),
            Value::from(self.represents.clone()),
            Value::from(self.submission_policy.clone()),
        ]
    }
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Agency {
            agency_no: row.get(0)?,
            company_no: row.get(1)?,
            union_franchised: get_flag(row, 2)?,
            represents: row.get(3)?,
            submission_policy: row.get(4)?,
            archived: get_flag(row, 5)?,
        })
    }
    fn into_extension(self) -> CompanyExtension {
        CompanyExtension::Agency(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastingCompany {
    #[serde(default)]
    pub casting_company_no: i64,
    pub company_no: i64,
    /// Media the office casts for, e.g. "film, tv, theater".
    #[serde(default)]
    pub casting_for: Option<String>,
    #[serde(default)]
    pub accepts_unsolicited: bool,
    #[serde(default)]
    pub archived: bool,
}

impl ExtensionRecord for CastingCompany {
    const KIND: CompanyType = CompanyType::Casting;

    fn record_no(&self) -> i64 {
        self.casting_company_no
    }
    fn company_no(&self) -> i64 {
        self.company_no
    }
    fn archived(&self) -> bool {
        self.archived
    }
    fn attribute_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.casting_for.clone()),
            Value::from(self.accepts_unsolicited),
        ]
    }
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CastingCompany {
            casting_company_no: row.get(0)?,
            company_no: row.get(1)?,
            casting_for: row.get(2)?,
            accepts_unsolicited: get_flag(row, 3)?,
            archived: get_flag(row, 4)?,
        })
    }
    fn into_extension(self) -> CompanyExtension {
        CompanyExtension::Casting(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theater {
    #[serde(default)]
    pub theater_no: i64,
    pub company_no: i64,
    #[serde(default)]
    pub seating_capacity: Option<i64>,
    #[serde(default)]
    pub union_contract: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl ExtensionRecord for Theater {
    const KIND: CompanyType = CompanyType::Theater;

    fn record_no(&self) -> i64 {
        self.theater_no
    }
    fn company_no(&self) -> i64 {
        self.company_no
    }
    fn archived(&self) -> bool {
        self.archived
    }
    fn attribute_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.seating_capacity),
            Value::from(self.union_contract.clone()),
        ]
    }
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Theater {
            theater_no: row.get(0)?,
            company_no: row.get(1)?,
            seating_capacity: row.get(2)?,
            union_contract: row.get(3)?,
            archived: get_flag(row, 4)?,
        })
    }
    fn into_extension(self) -> CompanyExtension {
        CompanyExtension::Theater(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    #[serde(default)]
    pub school_no: i64,
    pub company_no: i64,
    #[serde(default)]
    pub programs: Option<String>,
    #[serde(default)]
    pub accredited: bool,
    #[serde(default)]
    pub archived: bool,
}

impl ExtensionRecord for School {
    const KIND: CompanyType = CompanyType::School;

    fn record_no(&self) -> i64 {
        self.school_no
    }
    fn company_no(&self) -> i64 {
        self.company_no
    }
    fn archived(&self) -> bool {
        self.archived
    }
    fn attribute_values(&self) -> Vec<Value> {
        vec![Value::from(self.programs.clone()), Value::from(self.accredited)]
    }
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(School {
            school_no: row.get(0)?,
            company_no: row.get(1)?,
            programs: row.get(2)?,
            accredited: get_flag(row, 3)?,
            archived: get_flag(row, 4)?,
        })
    }
    fn into_extension(self) -> CompanyExtension {
        CompanyExtension::School(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalStudio {
    #[serde(default)]
    pub studio_no: i64,
    pub company_no: i64,
    #[serde(default)]
    pub room_count: Option<i64>,
    #[serde(default)]
    pub hourly_rate: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl ExtensionRecord for RentalStudio {
    const KIND: CompanyType = CompanyType::RentalStudio;

    fn record_no(&self) -> i64 {
        self.studio_no
    }
    fn company_no(&self) -> i64 {
        self.company_no
    }
    fn archived(&self) -> bool {
        self.archived
    }
    fn attribute_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.room_count),
            Value::from(self.hourly_rate.clone()),
        ]
    }
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RentalStudio {
            studio_no: row.get(0)?,
            company_no: row.get(1)?,
            room_count: row.get(2)?,
            hourly_rate: row.get(3)?,
            archived: get_flag(row, 4)?,
        })
    }
    fn into_extension(self) -> CompanyExtension {
        CompanyExtension::RentalStudio(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalSpace {
    #[serde(default)]
    pub space_no: i64,
    pub company_no: i64,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub space_kind: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl ExtensionRecord for RentalSpace {
    const KIND: CompanyType = CompanyType::RentalSpace;

    fn record_no(&self) -> i64 {
        self.space_no
    }
    fn company_no(&self) -> i64 {
        self.company_no
    }
    fn archived(&self) -> bool {
        self.archived
    }
    fn attribute_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.capacity),
            Value::from(self.space_kind.clone()),
        ]
    }
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RentalSpace {
            space_no: row.get(0)?,
            company_no: row.get(1)?,
            capacity: row.get(2)?,
            space_kind: row.get(3)?,
            archived: get_flag(row, 4)?,
        })
    }
    fn into_extension(self) -> CompanyExtension {
        CompanyExtension::RentalSpace(self)
    }
}

/// One extension row of any variant, tagged with its type on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CompanyExtension {
    Agency(Agency),
    Casting(CastingCompany),
    Theater(Theater),
    School(School),
    RentalStudio(RentalStudio),
    RentalSpace(RentalSpace),
}

impl CompanyExtension {
    pub fn company_type(&self) -> CompanyType {
        match self {
            CompanyExtension::Agency(_) => CompanyType::Agency,
            CompanyExtension::Casting(_) => CompanyType::Casting,
            CompanyExtension::Theater(_) => CompanyType::Theater,
            CompanyExtension::School(_) => CompanyType::School,
            CompanyExtension::RentalStudio(_) => CompanyType::RentalStudio,
            CompanyExtension::RentalSpace(_) => CompanyType::RentalSpace,
        }
    }

    pub fn record_no(&self) -> i64 {
        match self {
            CompanyExtension::Agency(r) => r.record_no(),
            CompanyExtension::Casting(r) => r.record_no(),
            CompanyExtension::Theater(r) => r.record_no(),
            CompanyExtension::School(r) => r.record_no(),
            CompanyExtension::RentalStudio(r) => r.record_no(),
            CompanyExtension::RentalSpace(r) => r.record_no(),
        }
    }

    pub fn archived(&self) -> bool {
        match self {
            CompanyExtension::Agency(r) => r.archived(),
            CompanyExtension::Casting(r) => r.archived(),
            CompanyExtension::Theater(r) => r.archived(),
            CompanyExtension::School(r) => r.archived(),
            CompanyExtension::RentalStudio(r) => r.archived(),
            CompanyExtension::RentalSpace(r) => r.archived(),
        }
    }

    /// Decode a row of the given variant's table.
    fn from_row(kind: CompanyType, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(match kind {
            CompanyType::Agency => Agency::from_row(row)?.into_extension(),
            CompanyType::Casting => CastingCompany::from_row(row)?.into_extension(),
            CompanyType::Theater => Theater::from_row(row)?.into_extension(),
            CompanyType::School => School::from_row(row)?.into_extension(),
            CompanyType::RentalStudio => RentalStudio::from_row(row)?.into_extension(),
            CompanyType::RentalSpace => RentalSpace::from_row(row)?.into_extension(),
        })
    }
}

/// `SELECT <id>, company_no, <attrs...>, archived FROM <table>`
fn extension_select(kind: CompanyType) -> String {
    let mut cols = vec![kind.id_column(), "company_no"];
    cols.extend_from_slice(kind.attribute_columns());
    cols.push("archived");
    format!("SELECT {} FROM {}", cols.join(", "), kind.table())
}

impl DirectoryDb {
    // =========================================================================
    // Company-type extensions
    // =========================================================================

    /// List every row of one extension table, active rows only unless
    /// `include_archived`.
    pub fn list_extensions<T: ExtensionRecord>(
        &self,
        include_archived: bool,
    ) -> Result<Vec<T>, DbError> {
        let kind = T::KIND;
        let sql = format!(
            "{} WHERE (?1 = 1 OR archived = 0) ORDER BY {}",
            extension_select(kind),
            kind.id_column()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![include_archived as i32], T::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Fetch one extension row by its surrogate id.
    pub fn get_extension<T: ExtensionRecord>(&self, record_no: i64) -> Result<Option<T>, DbError> {
        let kind = T::KIND;
        let sql = format!("{} WHERE {} = ?1", extension_select(kind), kind.id_column());
        Ok(self
            .conn
            .query_row(&sql, params![record_no], T::from_row)
            .optional()?)
    }

    /// Insert an extension row, returning its new surrogate id.
    pub fn insert_extension<T: ExtensionRecord>(&self, record: &T) -> Result<i64, DbError> {
        let kind = T::KIND;
        let attrs = kind.attribute_columns();
        let mut cols = vec!["company_no"];
        cols.extend_from_slice(attrs);
        cols.push("archived");
        let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            kind.table(),
            cols.join(", "),
            placeholders.join(", ")
        );

        let mut values = vec![Value::from(record.company_no())];
        values.extend(record.attribute_values());
        values.push(Value::from(record.archived()));

        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert an extension row with default attribute values.
    pub fn insert_default_extension(
        &self,
        kind: CompanyType,
        company_no: i64,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            &format!("INSERT INTO {} (company_no) VALUES (?1)", kind.table()),
            params![company_no],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace the type-specific attributes of an extension row. The owning
    /// company and archive flag are left alone. Returns rows changed.
    pub fn update_extension<T: ExtensionRecord>(
        &self,
        record_no: i64,
        record: &T,
    ) -> Result<usize, DbError> {
        let kind = T::KIND;
        let attrs = kind.attribute_columns();
        let assignments: Vec<String> = attrs
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ?{}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            kind.table(),
            assignments.join(", "),
            kind.id_column(),
            attrs.len() + 1
        );

        let mut values = record.attribute_values();
        values.push(Value::from(record_no));
        Ok(self.conn.execute(&sql, params_from_iter(values))?)
    }

    /// Set the archive flag on one extension row. Returns rows changed.
    pub fn set_extension_archived(
        &self,
        kind: CompanyType,
        record_no: i64,
        archived: bool,
    ) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            &format!(
                "UPDATE {} SET archived = ?1 WHERE {} = ?2",
                kind.table(),
                kind.id_column()
            ),
            params![archived as i32, record_no],
        )?)
    }

    /// Hard-delete one extension row. Returns rows changed.
    pub fn delete_extension(&self, kind: CompanyType, record_no: i64) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1", kind.table(), kind.id_column()),
            params![record_no],
        )?)
    }

    /// Every extension row of a company, archived or not, in probe order and
    /// ascending surrogate id within a table.
    pub fn extensions_for_company(&self, company_no: i64) -> Result<Vec<CompanyExtension>, DbError> {
        self.collect_extensions(company_no, true)
    }

    /// Active extension rows of a company, in probe order. A healthy company
    /// has zero or one.
    pub fn active_extensions(&self, company_no: i64) -> Result<Vec<CompanyExtension>, DbError> {
        self.collect_extensions(company_no, false)
    }

    fn collect_extensions(
        &self,
        company_no: i64,
        include_archived: bool,
    ) -> Result<Vec<CompanyExtension>, DbError> {
        let mut out = Vec::new();
        for kind in CompanyType::PROBE_ORDER {
            let sql = format!(
                "{} WHERE company_no = ?1 AND (?2 = 1 OR archived = 0) ORDER BY {}",
                extension_select(kind),
                kind.id_column()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params![company_no, include_archived as i32], |row| {
                CompanyExtension::from_row(kind, row)
            })?;
            for row in rows {
                out.push(row?);
            }
        }
        Ok(out)
    }

    /// Archive every active extension row of a company. Returns the
    /// `(type, surrogate id)` pairs that were archived.
    pub fn archive_active_extensions(
        &self,
        company_no: i64,
    ) -> Result<Vec<(CompanyType, i64)>, DbError> {
        let active = self.active_extensions(company_no)?;
        let mut archived = Vec::with_capacity(active.len());
        for ext in active {
            let kind = ext.company_type();
            self.set_extension_archived(kind, ext.record_no(), true)?;
            archived.push((kind, ext.record_no()));
        }
        Ok(archived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{seed_company, test_db};

    #[test]
    fn test_insert_and_get_extension_round_trip() {
        let db = test_db();
        let company_no = seed_company(&db, "Acme Talent");
        let agency = Agency {
            agency_no: 0,
            company_no,
            union_franchised: true,
            represents: Some("actors, voice".to_string()),
            submission_policy: None,
            archived: false,
        };
        let id = db.insert_extension(&agency).unwrap();
        let fetched: Agency = db.get_extension(id).unwrap().expect("row exists");
        assert_eq!(fetched.agency_no, id);
        assert_eq!(fetched.company_no, company_no);
        assert!(fetched.union_franchised);
        assert_eq!(fetched.represents.as_deref(), Some("actors, voice"));
    }

    #[test]
    fn test_default_extension_has_default_values() {
        let db = test_db();
        let company_no = seed_company(&db, "Black Box");
        let id = db
            .insert_default_extension(CompanyType::Theater, company_no)
            .unwrap();
        let theater: Theater = db.get_extension(id).unwrap().unwrap();
        assert_eq!(theater.seating_capacity, None);
        assert_eq!(theater.union_contract, None);
        assert!(!theater.archived);
    }

    #[test]
    fn test_update_extension_leaves_archive_flag() {
        let db = test_db();
        let company_no = seed_company(&db, "Studio 9");
        let id = db
            .insert_default_extension(CompanyType::RentalStudio, company_no)
            .unwrap();
        db.set_extension_archived(CompanyType::RentalStudio, id, true)
            .unwrap();

        let patch = RentalStudio {
            studio_no: 0,
            company_no,
            room_count: Some(4),
            hourly_rate: Some("$40".to_string()),
            archived: false,
        };
        assert_eq!(db.update_extension(id, &patch).unwrap(), 1);

        let studio: RentalStudio = db.get_extension(id).unwrap().unwrap();
        assert_eq!(studio.room_count, Some(4));
        assert!(studio.archived, "attribute update must not touch archived");
    }

    #[test]
    fn test_active_extensions_follow_probe_order() {
        let db = test_db();
        let company_no = seed_company(&db, "Muddle Co");
        db.insert_default_extension(CompanyType::School, company_no)
            .unwrap();
        db.insert_default_extension(CompanyType::Agency, company_no)
            .unwrap();

        let active = db.active_extensions(company_no).unwrap();
        let kinds: Vec<CompanyType> = active.iter().map(|e| e.company_type()).collect();
        assert_eq!(kinds, vec![CompanyType::Agency, CompanyType::School]);
    }

    #[test]
    fn test_archive_active_extensions_keeps_history() {
        let db = test_db();
        let company_no = seed_company(&db, "Old Co");
        let id = db
            .insert_default_extension(CompanyType::Casting, company_no)
            .unwrap();

        let archived = db.archive_active_extensions(company_no).unwrap();
        assert_eq!(archived, vec![(CompanyType::Casting, id)]);
        assert!(db.active_extensions(company_no).unwrap().is_empty());

        let history = db.extensions_for_company(company_no).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].archived());
    }

    #[test]
    fn test_list_extensions_filters_archived() {
        let db = test_db();
        let a = seed_company(&db, "A");
        let b = seed_company(&db, "B");
        let first = db.insert_default_extension(CompanyType::School, a).unwrap();
        db.insert_default_extension(CompanyType::School, b).unwrap();
        db.set_extension_archived(CompanyType::School, first, true)
            .unwrap();

        assert_eq!(db.list_extensions::<School>(false).unwrap().len(), 1);
        assert_eq!(db.list_extensions::<School>(true).unwrap().len(), 2);
    }

    #[test]
    fn test_extension_serializes_with_type_tag() {
        let ext = CompanyExtension::Theater(Theater {
            theater_no: 7,
            company_no: 3,
            seating_capacity: Some(99),
            union_contract: None,
            archived: false,
        });
        let json = serde_json::to_value(&ext).unwrap();
        assert_eq!(json["type"], "Theater");
        assert_eq!(json["theater_no"], 7);
        assert_eq!(json["seating_capacity"], 99);
    }
}
