use super::*;

const PRODUCTION_COLUMNS: &str = "production_no, play_no, company_no, start_date, end_date,
     season, festival, canceled, archived";

impl DirectoryDb {
    // =========================================================================
    // Play productions
    // =========================================================================

    /// Insert a production, returning the new `production_no`. Callers
    /// validate first; the schema CHECKs are a backstop.
    pub fn insert_production(&self, production: &ProductionInput) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO play_productions (
                play_no, company_no, start_date, end_date, season, festival, canceled, archived
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                production.play_no,
                production.company_no,
                production.start_date,
                production.end_date,
                production.season,
                production.festival,
                production.canceled as i32,
                production.archived as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_production(&self, production_no: i64) -> Result<Option<DbProduction>, DbError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {PRODUCTION_COLUMNS} FROM play_productions WHERE production_no = ?1"
                ),
                params![production_no],
                Self::map_production_row,
            )
            .optional()?)
    }

    /// Productions matching the filter, newest start date first (undated last).
    pub fn get_productions(&self, filter: &ProductionFilter) -> Result<Vec<DbProduction>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PRODUCTION_COLUMNS} FROM play_productions
             WHERE (?1 IS NULL OR play_no = ?1)
               AND (?2 IS NULL OR company_no = ?2)
               AND (?3 = 1 OR archived = 0)
             ORDER BY start_date IS NULL, start_date DESC, production_no"
        ))?;
        let rows = stmt.query_map(
            params![filter.play_no, filter.company_no, filter.archived as i32],
            Self::map_production_row,
        )?;
        let mut productions = Vec::new();
        for row in rows {
            productions.push(row?);
        }
        Ok(productions)
    }

    /// Full replace of a production. Returns rows changed.
    pub fn update_production(
        &self,
        production_no: i64,
        production: &ProductionInput,
    ) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE play_productions SET
                play_no = ?1, company_no = ?2, start_date = ?3, end_date = ?4,
                season = ?5, festival = ?6, canceled = ?7, archived = ?8
             WHERE production_no = ?9",
            params![
                production.play_no,
                production.company_no,
                production.start_date,
                production.end_date,
                production.season,
                production.festival,
                production.canceled as i32,
                production.archived as i32,
                production_no,
            ],
        )?)
    }

    pub fn delete_production(&self, production_no: i64) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "DELETE FROM play_productions WHERE production_no = ?1",
            params![production_no],
        )?)
    }

    fn map_production_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbProduction> {
        Ok(DbProduction {
            production_no: row.get(0)?,
            play_no: row.get(1)?,
            company_no: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            season: row.get(5)?,
            festival: row.get(6)?,
            canceled: get_flag(row, 7)?,
            archived: get_flag(row, 8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{seed_company, test_db};
    use chrono::NaiveDate;

    fn seed_play(db: &DirectoryDb) -> i64 {
        db.insert_play(&PlayInput {
            title: "Hamlet".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_production_round_trip_with_dates() {
        let db = test_db();
        let play = seed_play(&db);
        let company = seed_company(&db, "Globe Rep");
        let id = db
            .insert_production(&ProductionInput {
                play_no: Some(play),
                company_no: Some(company),
                start_date: date(2024, 3, 1),
                end_date: date(2024, 4, 15),
                season: Some("2023-24".to_string()),
                ..Default::default()
            })
            .unwrap();
        let stored = db.get_production(id).unwrap().unwrap();
        assert_eq!(stored.start_date, date(2024, 3, 1));
        assert_eq!(stored.end_date, date(2024, 4, 15));
        assert_eq!(stored.season.as_deref(), Some("2023-24"));
    }

    #[test]
    fn test_schema_rejects_inverted_dates() {
        let db = test_db();
        let result = db.insert_production(&ProductionInput {
            start_date: date(2024, 1, 1),
            end_date: date(2023, 12, 31),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_by_play_and_archived() {
        let db = test_db();
        let hamlet = seed_play(&db);
        let other = seed_play(&db);
        db.insert_production(&ProductionInput {
            play_no: Some(hamlet),
            ..Default::default()
        })
        .unwrap();
        db.insert_production(&ProductionInput {
            play_no: Some(hamlet),
            archived: true,
            ..Default::default()
        })
        .unwrap();
        db.insert_production(&ProductionInput {
            play_no: Some(other),
            ..Default::default()
        })
        .unwrap();

        let filter = ProductionFilter {
            play_no: Some(hamlet),
            ..Default::default()
        };
        assert_eq!(db.get_productions(&filter).unwrap().len(), 1);
        let filter = ProductionFilter {
            play_no: Some(hamlet),
            archived: true,
            ..Default::default()
        };
        assert_eq!(db.get_productions(&filter).unwrap().len(), 2);
        assert_eq!(db.get_productions(&ProductionFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_deleting_company_nulls_reference() {
        let db = test_db();
        let company = seed_company(&db, "Short Lived");
        let id = db
            .insert_production(&ProductionInput {
                company_no: Some(company),
                ..Default::default()
            })
            .unwrap();
        db.delete_company(company).unwrap();
        let stored = db.get_production(id).unwrap().expect("production survives");
        assert_eq!(stored.company_no, None);
    }
}
