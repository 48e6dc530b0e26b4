use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::db::{DbError, DirectoryDb};
use crate::error::ServiceError;
use crate::types::Config;

/// Application state shared by every request handler.
pub struct AppState {
    pub config: Config,
    db: Mutex<DirectoryDb>,
}

impl AppState {
    /// Open the configured database and wrap it for sharing.
    pub fn open(config: Config) -> Result<Self, DbError> {
        let path = resolved_db_path(&config)?;
        let db = DirectoryDb::open_at(path)?;
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: Config, db: DirectoryDb) -> Self {
        Self {
            config,
            db: Mutex::new(db),
        }
    }

    /// Run `f` with exclusive access to the database.
    pub fn with_db<T>(
        &self,
        f: impl FnOnce(&DirectoryDb) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let guard = self
            .db
            .lock()
            .map_err(|_| ServiceError::Internal("Database lock poisoned".to_string()))?;
        f(&*guard)
    }
}

/// Get the canonical config file path (~/.talentdir/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".talentdir").join("config.json"))
}

/// Load config from `path`, or from the canonical location when `None`.
///
/// A missing file yields the defaults; an unreadable or malformed one is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    if !config_path.exists() {
        log::info!(
            "No config at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(&config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    if config.search_limit == 0 {
        return Err("search_limit must be at least 1".to_string());
    }

    Ok(config)
}

/// Database path from config, falling back to `~/.talentdir/talentdir.db`.
pub fn resolved_db_path(config: &Config) -> Result<PathBuf, DbError> {
    match &config.database_path {
        Some(path) => Ok(path.clone()),
        None => DirectoryDb::default_path(),
    }
}
