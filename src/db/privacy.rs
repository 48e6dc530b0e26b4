use super::*;

use rusqlite::types::Type;

use crate::entity::PrivacyEntityType;

const PRIVACY_COLUMNS: &str =
    "id, entity_type, entity_no, field_name, is_private_online, is_private_publication";

impl DirectoryDb {
    // =========================================================================
    // Privacy settings
    // =========================================================================

    /// Insert a setting. A second row for the same
    /// `(entity_type, entity_no, field_name)` is a unique violation.
    pub fn insert_privacy_setting(&self, setting: &PrivacySettingInput) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO privacy_settings (
                entity_type, entity_no, field_name, is_private_online, is_private_publication
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                setting.entity_type.as_str(),
                setting.entity_no,
                setting.field_name,
                setting.is_private_online as i32,
                setting.is_private_publication as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_privacy_setting(&self, id: i64) -> Result<Option<DbPrivacySetting>, DbError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PRIVACY_COLUMNS} FROM privacy_settings WHERE id = ?1"),
                params![id],
                Self::map_privacy_row,
            )
            .optional()?)
    }

    /// Settings, optionally narrowed to one entity type and/or one entity.
    pub fn get_privacy_settings(
        &self,
        entity_type: Option<PrivacyEntityType>,
        entity_no: Option<i64>,
    ) -> Result<Vec<DbPrivacySetting>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PRIVACY_COLUMNS} FROM privacy_settings
             WHERE (?1 IS NULL OR entity_type = ?1)
               AND (?2 IS NULL OR entity_no = ?2)
             ORDER BY entity_type, entity_no, field_name"
        ))?;
        let rows = stmt.query_map(
            params![entity_type.map(|t| t.as_str()), entity_no],
            Self::map_privacy_row,
        )?;
        let mut settings = Vec::new();
        for row in rows {
            settings.push(row?);
        }
        Ok(settings)
    }

    /// Write every column of an existing row. Returns rows changed.
    pub fn update_privacy_setting(&self, setting: &DbPrivacySetting) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE privacy_settings SET
                entity_type = ?1, entity_no = ?2, field_name = ?3,
                is_private_online = ?4, is_private_publication = ?5
             WHERE id = ?6",
            params![
                setting.entity_type.as_str(),
                setting.entity_no,
                setting.field_name,
                setting.is_private_online as i32,
                setting.is_private_publication as i32,
                setting.id,
            ],
        )?)
    }

    pub fn delete_privacy_setting(&self, id: i64) -> Result<usize, DbError> {
        Ok(self
            .conn
            .execute("DELETE FROM privacy_settings WHERE id = ?1", params![id])?)
    }

    /// Remove every setting attached to one entity. Returns rows removed.
    pub fn delete_privacy_settings_for(
        &self,
        entity_type: PrivacyEntityType,
        entity_no: i64,
    ) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "DELETE FROM privacy_settings WHERE entity_type = ?1 AND entity_no = ?2",
            params![entity_type.as_str(), entity_no],
        )?)
    }

    /// Remove the settings of every agency record belonging to a company.
    /// Must run before the company row goes, while the agencies still exist.
    pub fn delete_agency_privacy_settings_for_company(
        &self,
        company_no: i64,
    ) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "DELETE FROM privacy_settings
             WHERE entity_type = 'Agency'
               AND entity_no IN (SELECT agency_no FROM agencies WHERE company_no = ?1)",
            params![company_no],
        )?)
    }

    /// Flip `is_private_online` in a single statement. Returns rows changed.
    pub fn toggle_privacy_online(&self, id: i64) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE privacy_settings SET is_private_online = 1 - is_private_online WHERE id = ?1",
            params![id],
        )?)
    }

    /// Flip `is_private_publication` in a single statement. Returns rows changed.
    pub fn toggle_privacy_publication(&self, id: i64) -> Result<usize, DbError> {
        Ok(self.conn.execute(
            "UPDATE privacy_settings
             SET is_private_publication = 1 - is_private_publication WHERE id = ?1",
            params![id],
        )?)
    }

    fn map_privacy_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbPrivacySetting> {
        let label: String = row.get(1)?;
        let entity_type = PrivacyEntityType::parse(&label).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Text,
                format!("unknown privacy entity type '{label}'").into(),
            )
        })?;
        Ok(DbPrivacySetting {
            id: row.get(0)?,
            entity_type,
            entity_no: row.get(2)?,
            field_name: row.get(3)?,
            is_private_online: get_flag(row, 4)?,
            is_private_publication: get_flag(row, 5)?,
        })
    }
}
