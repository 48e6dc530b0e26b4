use super::*;

const PERSON_COLUMNS: &str = "people_no, first_name, middle_name, last_name, no_book, archived";

impl DirectoryDb {
    // =========================================================================
    // People
    // =========================================================================

    /// Insert a person, returning the new `people_no`.
    pub fn insert_person(&self, person: &PersonInput) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO people (first_name, middle_name, last_name, no_book, archived)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                person.first_name,
                person.middle_name,
                person.last_name,
                person.no_book as i32,
                person.archived as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_person(&self, people_no: i64) -> Result<Option<DbPerson>, DbError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM people WHERE people_no = ?1"),
                params![people_no],
                Self::map_person_row,
            )
            .optional()?)
    }

    /// All people ordered by last then first name.
    pub fn get_all_people(&self, include_archived: bool) -> Result<Vec<DbPerson>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM people
             WHERE (?1 = 1 OR archived = 0)
             ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE, people_no"
        ))?;
        let rows = stmt.query_map(params![include_archived as i32], Self::map_person_row)?;
        let mut people = Vec::new();
        for row in rows {
            people.push(row?);
        }
        Ok(people)
    }

    /// Substring search over first, middle and last name. Active people only.
    pub fn search_people(&self, query: &str, limit: usize) -> Result<Vec<DbPerson>, DbError> {
        let pattern = crate::helpers::like_pattern(query);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM people
             WHERE archived = 0
               AND (first_name LIKE ?1 ESCAPE '\\'
                    OR middle_name LIKE ?1 ESCAPE '\\'
                    OR last_name LIKE ?1 ESCAPE '\\'
                    OR (COALESCE(first_name, '') || ' ' || COALESCE(last_name, '')) LIKE ?1 ESCAPE '\\')
             ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE
             LIMIT ?2"
        ))?;
        // SQLite reads a negative LIMIT as unbounded.
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![pattern, limit], Self::map_person_row)?;
        let mut people = Vec::new();
        for row in rows {
            people.push(row?);
        }
        Ok(people)
    }

    /// Full replace of a person's fields. Returns rows changed.
    pub fn update_person(&self, people_no: i64, person: &PersonInput) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE people
             SET first_name = ?1, middle_name = ?2, last_name = ?3, no_book = ?4, archived = ?5
             WHERE people_no = ?6",
            params![
                person.first_name,
                person.middle_name,
                person.last_name,
                person.no_book as i32,
                person.archived as i32,
                people_no,
            ],
        )?)
    }

    /// Archive or unarchive a person.
    pub fn archive_person(&self, people_no: i64, archived: bool) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE people SET archived = ?1 WHERE people_no = ?2",
            params![archived as i32, people_no],
        )?)
    }

    /// Hard-delete a person. Address links cascade; addresses stay.
    pub fn delete_person(&self, people_no: i64) -> Result<usize, DbError> {
        Ok(self
            .conn
            .execute("DELETE FROM people WHERE people_no = ?1", params![people_no])?)
    }

    /// Helper: map a row to `DbPerson`.
    pub(crate) fn map_person_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbPerson> {
        Ok(DbPerson {
            people_no: row.get(0)?,
            first_name: row.get(1)?,
            middle_name: row.get(2)?,
            last_name: row.get(3)?,
            no_book: get_flag(row, 4)?,
            archived: get_flag(row, 5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{seed_address, seed_person, test_db};
    use crate::entity::AddressOwner;

    #[test]
    fn test_insert_and_get_person() {
        let db = test_db();
        let id = db
            .insert_person(&PersonInput {
                first_name: Some("Uta".to_string()),
                last_name: Some("Hagen".to_string()),
                no_book: true,
                ..Default::default()
            })
            .unwrap();
        let person = db.get_person(id).unwrap().unwrap();
        assert_eq!(person.first_name.as_deref(), Some("Uta"));
        assert!(person.no_book);
        assert!(!person.archived);
    }

    #[test]
    fn test_archive_hides_from_default_list() {
        let db = test_db();
        let id = seed_person(&db, "Stella", "Adler");
        seed_person(&db, "Sanford", "Meisner");
        db.archive_person(id, true).unwrap();
        let active = db.get_all_people(false).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].last_name.as_deref(), Some("Meisner"));
        assert_eq!(db.get_all_people(true).unwrap().len(), 2);
    }

    #[test]
    fn test_search_people_full_name() {
        let db = test_db();
        seed_person(&db, "Stella", "Adler");
        seed_person(&db, "Lee", "Strasberg");
        assert_eq!(db.search_people("stella adl", 10).unwrap().len(), 1);
        assert_eq!(db.search_people("st", 10).unwrap().len(), 2);
        assert_eq!(db.search_people("st", usize::MAX).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_person_keeps_addresses() {
        let db = test_db();
        let id = seed_person(&db, "Stella", "Adler");
        let address = seed_address(&db, "1 Studio Ln");
        db.insert_address_link(AddressOwner::Person(id), address, None)
            .unwrap();

        assert_eq!(db.delete_person(id).unwrap(), 1);
        assert!(db.get_address(address).unwrap().is_some());
        assert_eq!(db.count_address_references(address).unwrap(), 0);
    }
}
