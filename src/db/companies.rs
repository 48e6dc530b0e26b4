use super::*;

const COMPANY_COLUMNS: &str = "company_no, name, description, fka, acronym, verified, archived";

impl DirectoryDb {
    // =========================================================================
    // Companies
    // =========================================================================

    /// Insert a company, returning its new `company_no`.
    pub fn insert_company(&self, company: &CompanyInput) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO companies (name, description, fka, acronym, verified, archived)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                company.name,
                company.description,
                company.fka,
                company.acronym,
                company.verified as i32,
                company.archived as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch a company by `company_no`.
    pub fn get_company(&self, company_no: i64) -> Result<Option<DbCompany>, DbError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE company_no = ?1"),
                params![company_no],
                Self::map_company_row,
            )
            .optional()?)
    }

    /// All companies ordered by name; archived rows only when asked.
    pub fn get_all_companies(&self, include_archived: bool) -> Result<Vec<DbCompany>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies
             WHERE (?1 = 1 OR archived = 0)
             ORDER BY name COLLATE NOCASE, company_no"
        ))?;
        let rows = stmt.query_map(params![include_archived as i32], Self::map_company_row)?;
        let mut companies = Vec::new();
        for row in rows {
            companies.push(row?);
        }
        Ok(companies)
    }

    /// Case-insensitive substring search over name, former name and acronym.
    /// Active companies only, name matches first.
    pub fn search_companies(&self, query: &str, limit: usize) -> Result<Vec<DbCompany>, DbError> {
        let pattern = crate::helpers::like_pattern(query);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies
             WHERE archived = 0
               AND (name LIKE ?1 ESCAPE '\\'
                    OR fka LIKE ?1 ESCAPE '\\'
                    OR acronym LIKE ?1 ESCAPE '\\')
             ORDER BY CASE WHEN name LIKE ?1 ESCAPE '\\' THEN 0 ELSE 1 END,
                      name COLLATE NOCASE
             LIMIT ?2"
        ))?;
        // SQLite reads a negative LIMIT as unbounded.
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![pattern, limit], Self::map_company_row)?;
        let mut companies = Vec::new();
        for row in rows {
            companies.push(row?);
        }
        Ok(companies)
    }

    /// Full replace of a company's fields. Returns rows changed.
    pub fn update_company(&self, company_no: i64, company: &CompanyInput) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE companies
             SET name = ?1, description = ?2, fka = ?3, acronym = ?4, verified = ?5, archived = ?6
             WHERE company_no = ?7",
            params![
                company.name,
                company.description,
                company.fka,
                company.acronym,
                company.verified as i32,
                company.archived as i32,
                company_no,
            ],
        )?)
    }

    /// Archive or unarchive a company. Extensions and links keep their own flags.
    pub fn archive_company(&self, company_no: i64, archived: bool) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE companies SET archived = ?1 WHERE company_no = ?2",
            params![archived as i32, company_no],
        )?)
    }

    /// Hard-delete a company. Extensions and address links go with it
    /// (ON DELETE CASCADE); productions keep their row with `company_no` nulled.
    pub fn delete_company(&self, company_no: i64) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "DELETE FROM companies WHERE company_no = ?1",
            params![company_no],
        )?)
    }

    /// Helper: map a row to `DbCompany`.
    pub(crate) fn map_company_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbCompany> {
        Ok(DbCompany {
            company_no: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            fka: row.get(3)?,
            acronym: row.get(4)?,
            verified: get_flag(row, 5)?,
            archived: get_flag(row, 6)?,
        })
    }
}
