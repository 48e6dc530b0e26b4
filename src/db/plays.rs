use super::*;

impl DirectoryDb {
    // =========================================================================
    // Plays
    // =========================================================================

    pub fn insert_play(&self, play: &PlayInput) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO plays (title, playwright, archived) VALUES (?1, ?2, ?3)",
            params![play.title, play.playwright, play.archived as i32],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_play(&self, play_no: i64) -> Result<Option<DbPlay>, DbError> {
        Ok(self
            .conn
            .query_row(
                "SELECT play_no, title, playwright, archived FROM plays WHERE play_no = ?1",
                params![play_no],
                Self::map_play_row,
            )
            .optional()?)
    }

    /// All plays ordered by title.
    pub fn get_all_plays(&self, include_archived: bool) -> Result<Vec<DbPlay>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT play_no, title, playwright, archived FROM plays
             WHERE (?1 = 1 OR archived = 0)
             ORDER BY title COLLATE NOCASE, play_no",
        )?;
        let rows = stmt.query_map(params![include_archived as i32], Self::map_play_row)?;
        let mut plays = Vec::new();
        for row in rows {
            plays.push(row?);
        }
        Ok(plays)
    }

    pub fn update_play(&self, play_no: i64, play: &PlayInput) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE plays SET title = ?1, playwright = ?2, archived = ?3 WHERE play_no = ?4",
            params![play.title, play.playwright, play.archived as i32, play_no],
        )?)
    }

    /// Hard-delete a play. Productions keep their row with `play_no` nulled.
    pub fn delete_play(&self, play_no: i64) -> Result<usize, DbError> {
        Ok(self
            .conn
            .execute("DELETE FROM plays WHERE play_no = ?1", params![play_no])?)
    }

    fn map_play_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbPlay> {
        Ok(DbPlay {
            play_no: row.get(0)?,
            title: row.get(1)?,
            playwright: row.get(2)?,
            archived: get_flag(row, 3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[test]
    fn test_play_crud() {
        let db = test_db();
        let id = db
            .insert_play(&PlayInput {
                title: "Our Town".to_string(),
                playwright: Some("Thornton Wilder".to_string()),
                archived: false,
            })
            .unwrap();
        assert_eq!(db.get_play(id).unwrap().unwrap().title, "Our Town");

        db.update_play(
            id,
            &PlayInput {
                title: "Our Town".to_string(),
                playwright: None,
                archived: true,
            },
        )
        .unwrap();
        assert!(db.get_all_plays(false).unwrap().is_empty());
        assert_eq!(db.get_all_plays(true).unwrap().len(), 1);

        assert_eq!(db.delete_play(id).unwrap(), 1);
        assert!(db.get_play(id).unwrap().is_none());
    }
}
