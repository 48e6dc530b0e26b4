use super::*;

use crate::entity::AddressOwner;

impl DirectoryDb {
    // =========================================================================
    // Address links (company_addresses / people_addresses)
    // =========================================================================

    /// Insert a link row. A duplicate `(owner, address)` pair surfaces as a
    /// UNIQUE/PRIMARY KEY violation.
    pub fn insert_address_link(
        &self,
        owner: AddressOwner,
        address_no: i64,
        location: Option<&str>,
    ) -> Result<(), DbError> {
        let (_, key) = owner.owner_table();
        self.conn.execute(
            &format!(
                "INSERT INTO {} ({key}, address_no, location, relationship_archived)
                 VALUES (?1, ?2, ?3, 0)",
                owner.link_table()
            ),
            params![owner.id(), address_no, location],
        )?;
        Ok(())
    }

    /// Fetch one link row.
    pub fn get_address_link(
        &self,
        owner: AddressOwner,
        address_no: i64,
    ) -> Result<Option<DbAddressLink>, DbError> {
        let (_, key) = owner.owner_table();
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {key}, address_no, location, relationship_archived
                     FROM {} WHERE {key} = ?1 AND address_no = ?2",
                    owner.link_table()
                ),
                params![owner.id(), address_no],
                |row| {
                    Ok(DbAddressLink {
                        owner_no: row.get(0)?,
                        address_no: row.get(1)?,
                        location: row.get(2)?,
                        relationship_archived: get_flag(row, 3)?,
                    })
                },
            )
            .optional()?)
    }

    /// Delete one link row. Returns rows changed.
    pub fn delete_address_link(&self, owner: AddressOwner, address_no: i64) -> Result<usize, DbError> {
        let (_, key) = owner.owner_table();
        Ok(self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE {key} = ?1 AND address_no = ?2",
                owner.link_table()
            ),
            params![owner.id(), address_no],
        )?)
    }

    /// Flip `relationship_archived` on one link. Returns rows changed.
    pub fn set_address_link_archived(
        &self,
        owner: AddressOwner,
        address_no: i64,
        archived: bool,
    ) -> Result<usize, DbError> {
        let (_, key) = owner.owner_table();
        Ok(self.conn.execute(
            &format!(
                "UPDATE {} SET relationship_archived = ?1 WHERE {key} = ?2 AND address_no = ?3",
                owner.link_table()
            ),
            params![archived as i32, owner.id(), address_no],
        )?)
    }

    /// Relabel one link. Returns rows changed.
    pub fn set_address_link_location(
        &self,
        owner: AddressOwner,
        address_no: i64,
        location: Option<&str>,
    ) -> Result<usize, DbError> {
        let (_, key) = owner.owner_table();
        Ok(self.conn.execute(
            &format!(
                "UPDATE {} SET location = ?1 WHERE {key} = ?2 AND address_no = ?3",
                owner.link_table()
            ),
            params![location, owner.id(), address_no],
        )?)
    }

    /// Addresses linked to an owner, joined with the link metadata.
    /// Archived links are skipped unless `include_archived`.
    pub fn get_linked_addresses(
        &self,
        owner: AddressOwner,
        include_archived: bool,
    ) -> Result<Vec<LinkedAddress>, DbError> {
        let (_, key) = owner.owner_table();
        let columns: Vec<String> = super::addresses::ADDRESS_COLUMNS
            .split(',')
            .map(|c| format!("a.{}", c.trim()))
            .collect();
        let sql = format!(
            "SELECT {}, l.location, l.relationship_archived
             FROM {} l
             JOIN addresses a ON a.address_no = l.address_no
             WHERE l.{key} = ?1 AND (?2 = 1 OR l.relationship_archived = 0)
             ORDER BY l.relationship_archived, a.address_no",
            columns.join(", "),
            owner.link_table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner.id(), include_archived as i32], |row| {
            Ok(LinkedAddress {
                address: Self::map_address_row(row)?,
                location: row.get(17)?,
                relationship_archived: get_flag(row, 18)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Remove every link (company and person) pointing at an address.
    /// Returns rows removed.
    pub fn delete_links_for_address(&self, address_no: i64) -> Result<usize, DbError> {
        let companies = self.conn.execute(
            "DELETE FROM company_addresses WHERE address_no = ?1",
            params![address_no],
        )?;
        let people = self.conn.execute(
            "DELETE FROM people_addresses WHERE address_no = ?1",
            params![address_no],
        )?;
        Ok(companies + people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{seed_address, seed_company, seed_person, test_db};

    #[test]
    fn test_link_and_list() {
        let db = test_db();
        let company = seed_company(&db, "Acme");
        let address = seed_address(&db, "1 Main St");
        let owner = AddressOwner::Company(company);

        db.insert_address_link(owner, address, Some("headquarters"))
            .unwrap();
        let linked = db.get_linked_addresses(owner, false).unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].address.line1, "1 Main St");
        assert_eq!(linked[0].location.as_deref(), Some("headquarters"));
        assert!(!linked[0].relationship_archived);
    }

    #[test]
    fn test_duplicate_link_is_unique_violation() {
        let db = test_db();
        let person = seed_person(&db, "Ada", "Lovelace");
        let address = seed_address(&db, "2 Main St");
        let owner = AddressOwner::Person(person);

        db.insert_address_link(owner, address, None).unwrap();
        let err = db.insert_address_link(owner, address, None).unwrap_err();
        assert!(err.is_unique_violation(), "got {err}");
    }

    #[test]
    fn test_archived_link_hidden_by_default() {
        let db = test_db();
        let company = seed_company(&db, "Acme");
        let address = seed_address(&db, "3 Main St");
        let owner = AddressOwner::Company(company);
        db.insert_address_link(owner, address, None).unwrap();

        assert_eq!(db.set_address_link_archived(owner, address, true).unwrap(), 1);
        assert!(db.get_linked_addresses(owner, false).unwrap().is_empty());
        let all = db.get_linked_addresses(owner, true).unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].relationship_archived);
    }

    #[test]
    fn test_archiving_one_link_leaves_other_owners_alone() {
        let db = test_db();
        let a = AddressOwner::Company(seed_company(&db, "A"));
        let b = AddressOwner::Company(seed_company(&db, "B"));
        let address = seed_address(&db, "Shared St");
        db.insert_address_link(a, address, None).unwrap();
        db.insert_address_link(b, address, None).unwrap();

        db.set_address_link_archived(a, address, true).unwrap();
        assert_eq!(db.get_linked_addresses(b, false).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_link_keeps_address() {
        let db = test_db();
        let owner = AddressOwner::Person(seed_person(&db, "Ada", "Lovelace"));
        let address = seed_address(&db, "4 Main St");
        db.insert_address_link(owner, address, None).unwrap();

        assert_eq!(db.delete_address_link(owner, address).unwrap(), 1);
        assert_eq!(db.delete_address_link(owner, address).unwrap(), 0);
        assert!(db.get_address(address).unwrap().is_some());
    }

    #[test]
    fn test_reference_count_spans_both_link_tables() {
        let db = test_db();
        let address = seed_address(&db, "5 Main St");
        db.insert_address_link(AddressOwner::Company(seed_company(&db, "C")), address, None)
            .unwrap();
        db.insert_address_link(
            AddressOwner::Person(seed_person(&db, "P", "Q")),
            address,
            None,
        )
        .unwrap();
        assert_eq!(db.count_address_references(address).unwrap(), 2);
        assert_eq!(db.delete_links_for_address(address).unwrap(), 2);
        assert_eq!(db.count_address_references(address).unwrap(), 0);
    }
}
