use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::storage::SqliteStore;
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PerfreviewConfig {
    pub database: Option<String>,
    pub foreign_keys: Option<bool>,
}

impl PerfreviewConfig {
    /// `PRAGMA foreign_keys` setting; enforced unless explicitly disabled
    pub fn foreign_keys(&self) -> bool {
        self.foreign_keys.unwrap_or(true)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("perfreview.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".perfreview").join("perfreview.db")
}

/// Pick the database path: explicit flag, then config file, then default.
pub fn resolve_database_path(flag: Option<&Path>, config: Option<&PerfreviewConfig>, base: &Path) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    config
        .and_then(|c| c.database.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(|| default_database_path_in(base))
}

pub fn load_config(path: Option<&Path>) -> Result<Option<PerfreviewConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PerfreviewConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PerfreviewConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the config, then open the database and create its tables.
///
/// A config that already exists without `force` fails before the database
/// file is touched.
pub fn init_database(config_path: &Path, db_path: &Path, foreign_keys: bool, force: bool) -> Result<SqliteStore> {
    let config = PerfreviewConfig {
        database: Some(db_path.to_string_lossy().to_string()),
        foreign_keys: Some(foreign_keys),
    };
    write_config(config_path, &config, force)?;

    ensure_db_dir(db_path)?;
    let store = SqliteStore::open(db_path)?.with_foreign_keys(foreign_keys)?;
    store.create_all_tables()?;
    Ok(store)
}
