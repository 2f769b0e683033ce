use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk configuration (`foodshare.toml`). Every field is optional; CLI
/// flags win over file values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FoodshareConfig {
    pub database: Option<String>,
    pub data_dir: Option<String>,
}

/// Resolved locations used by the seed loader and the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub data_dir: PathBuf,
}

impl Settings {
    pub fn new(database: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Merge CLI overrides on top of an optional config file.
    pub fn resolve(
        config: Option<&FoodshareConfig>,
        database: Option<PathBuf>,
        data_dir: Option<PathBuf>,
    ) -> Self {
        let database = database
            .or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
            .unwrap_or_else(default_database_path);
        let data_dir = data_dir
            .or_else(|| config.and_then(|c| c.data_dir.as_ref()).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        Self { database, data_dir }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(default_database_path(), default_data_dir())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("foodshare.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("food_waste.db")
}

pub fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<FoodshareConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: FoodshareConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &FoodshareConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
