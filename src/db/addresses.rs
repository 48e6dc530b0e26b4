use super::*;

pub(crate) const ADDRESS_COLUMNS: &str = "address_no, line1, line2, line3, city, state, zip, country,
     phone1, phone2, phone3, email1, email2, website1, website2, fax, verified";

impl DirectoryDb {
    // =========================================================================
    // Addresses
    // =========================================================================

    /// Insert an address, returning its new `address_no`. A missing or blank
    /// country is stored as "USA".
    pub fn insert_address(&self, address: &AddressInput) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO addresses (
                line1, line2, line3, city, state, zip, country,
                phone1, phone2, phone3, email1, email2, website1, website2, fax, verified
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                address.line1,
                address.line2,
                address.line3,
                address.city,
                address.state,
                address.zip,
                country_or_default(address.country.as_deref()),
                address.phone1,
                address.phone2,
                address.phone3,
                address.email1,
                address.email2,
                address.website1,
                address.website2,
                address.fax,
                address.verified as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch an address by `address_no`.
    pub fn get_address(&self, address_no: i64) -> Result<Option<DbAddress>, DbError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE address_no = ?1"),
                params![address_no],
                Self::map_address_row,
            )
            .optional()?)
    }

    /// All addresses ordered by `address_no`.
    pub fn get_all_addresses(&self) -> Result<Vec<DbAddress>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY address_no"
        ))?;
        let rows = stmt.query_map([], Self::map_address_row)?;
        let mut addresses = Vec::new();
        for row in rows {
            addresses.push(row?);
        }
        Ok(addresses)
    }

    /// Full replace of every address field. Returns rows changed.
    pub fn update_address(&self, address_no: i64, address: &AddressInput) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE addresses SET
                line1 = ?1, line2 = ?2, line3 = ?3, city = ?4, state = ?5, zip = ?6, country = ?7,
                phone1 = ?8, phone2 = ?9, phone3 = ?10, email1 = ?11, email2 = ?12,
                website1 = ?13, website2 = ?14, fax = ?15, verified = ?16
             WHERE address_no = ?17",
            params![
                address.line1,
                address.line2,
                address.line3,
                address.city,
                address.state,
                address.zip,
                country_or_default(address.country.as_deref()),
                address.phone1,
                address.phone2,
                address.phone3,
                address.email1,
                address.email2,
                address.website1,
                address.website2,
                address.fax,
                address.verified as i32,
                address_no,
            ],
        )?)
    }

    /// Number of link rows (company and person, archived or not) that point
    /// at an address.
    pub fn count_address_references(&self, address_no: i64) -> Result<i64, DbError> {
        Ok(self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM company_addresses WHERE address_no = ?1)
                  + (SELECT COUNT(*) FROM people_addresses WHERE address_no = ?1)",
            params![address_no],
            |row| row.get(0),
        )?)
    }

    /// Hard-delete an address row. Link rows cascade at the schema level;
    /// callers decide beforehand whether that is allowed.
    pub fn delete_address(&self, address_no: i64) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "DELETE FROM addresses WHERE address_no = ?1",
            params![address_no],
        )?)
    }

    /// Helper: map a row to `DbAddress`.
    pub(crate) fn map_address_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbAddress> {
        Ok(DbAddress {
            address_no: row.get(0)?,
            line1: row.get(1)?,
            line2: row.get(2)?,
            line3: row.get(3)?,
            city: row.get(4)?,
            state: row.get(5)?,
            zip: row.get(6)?,
            country: row.get(7)?,
            phone1: row.get(8)?,
            phone2: row.get(9)?,
            phone3: row.get(10)?,
            email1: row.get(11)?,
            email2: row.get(12)?,
            website1: row.get(13)?,
            website2: row.get(14)?,
            fax: row.get(15)?,
            verified: get_flag(row, 16)?,
        })
    }
}

fn country_or_default(country: Option<&str>) -> &str {
    match country.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => "USA",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{sample_address, seed_address, test_db};

    #[test]
    fn test_insert_defaults_country() {
        let db = test_db();
        let mut input = sample_address("1 Times Sq");
        input.country = None;
        let id = db.insert_address(&input).unwrap();
        assert_eq!(db.get_address(id).unwrap().unwrap().country, "USA");

        input.country = Some("  ".to_string());
        let id = db.insert_address(&input).unwrap();
        assert_eq!(db.get_address(id).unwrap().unwrap().country, "USA");
    }

    #[test]
    fn test_update_replaces_every_field() {
        let db = test_db();
        let id = db
            .insert_address(&AddressInput {
                phone1: Some("212-555-0100".to_string()),
                ..sample_address("1 Times Sq")
            })
            .unwrap();

        let replacement = AddressInput {
            line1: "250 W 57th St".to_string(),
            line2: Some("Suite 1200".to_string()),
            city: "New York".to_string(),
            state: "NY".to_string(),
            zip: "10107".to_string(),
            country: Some("USA".to_string()),
            email1: Some("desk@acme.com".to_string()),
            verified: true,
            ..Default::default()
        };
        assert_eq!(db.update_address(id, &replacement).unwrap(), 1);

        let stored = db.get_address(id).unwrap().unwrap();
        assert_eq!(stored.line1, "250 W 57th St");
        assert_eq!(stored.line2.as_deref(), Some("Suite 1200"));
        assert_eq!(stored.phone1, None, "full replace clears omitted fields");
        assert_eq!(stored.email1.as_deref(), Some("desk@acme.com"));
        assert!(stored.verified);
    }

    #[test]
    fn test_missing_address_is_none() {
        let db = test_db();
        assert!(db.get_address(42).unwrap().is_none());
        assert_eq!(db.update_address(42, &sample_address("x")).unwrap(), 0);
        assert_eq!(db.delete_address(42).unwrap(), 0);
    }

    #[test]
    fn test_get_all_addresses_in_key_order() {
        let db = test_db();
        let a = seed_address(&db, "A St");
        let b = seed_address(&db, "B St");
        let all = db.get_all_addresses().unwrap();
        let ids: Vec<i64> = all.iter().map(|r| r.address_no).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
