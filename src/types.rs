use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Service configuration, read from `~/.talentdir/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Database file; `None` means `~/.talentdir/talentdir.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Upper bound on rows returned by the search endpoints.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_path: None,
            search_limit: default_search_limit(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_search_limit() -> usize {
    25
}
