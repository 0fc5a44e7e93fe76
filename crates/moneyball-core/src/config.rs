// Configuration loading and parsing (dashboard.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::splits::MetricKind;

/// Name of the single config file, looked up under `config/`.
pub const CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// dashboard.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub data: DataPaths,
    pub scouting: ScoutingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    /// Table holding one row per pitch. Interpolated into SQL, so it is
    /// validated as a plain identifier.
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "data22".to_string()
}

/// Locations of the pre-computed files the pages read.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub query_results: String,
    pub saved_figs: String,
    pub quotes: String,
    pub team_colors: String,
    pub templates_dir: String,
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoutingConfig {
    pub default_player: String,
    pub default_metric: String,
    pub default_palette: Vec<String>,
}

impl ScoutingConfig {
    /// The configured fallback metric. Validation guarantees the string
    /// parses, so the wOBA default below only covers hand-built configs.
    pub fn default_metric(&self) -> MetricKind {
        MetricKind::parse(&self.default_metric).unwrap_or(MetricKind::Woba)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/dashboard.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Seed `config/dashboard.toml` from `defaults/` on first run.
///
/// Returns the path written, or `None` when a config file is already in
/// place. An existing file is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no config/{CONFIG_FILE} and no defaults/{CONFIG_FILE} under {}",
                base_dir.display()
            ),
        });
    }

    let copy_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to seed {}: {e}", target.display()),
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(copy_err)?;
    }
    std::fs::copy(&source, &target).map_err(copy_err)?;
    info!("Seeded {} from {}", target.display(), source.display());

    Ok(Some(target))
}

/// Load config relative to `base_dir`, seeding it from `defaults/` first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// True for `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_sql_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.port".into(),
            message: "must be greater than 0".into(),
        });
    }

    if !is_sql_identifier(&config.database.table) {
        return Err(ConfigError::ValidationError {
            field: "database.table".into(),
            message: format!(
                "must be a plain SQL identifier, got {:?}",
                config.database.table
            ),
        });
    }

    if config.scouting.default_player.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "scouting.default_player".into(),
            message: "must not be empty".into(),
        });
    }

    if MetricKind::parse(&config.scouting.default_metric).is_none() {
        return Err(ConfigError::ValidationError {
            field: "scouting.default_metric".into(),
            message: format!(
                "unknown metric {:?}, expected one of {}",
                config.scouting.default_metric,
                MetricKind::ALL
                    .iter()
                    .map(|m| m.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        });
    }

    let palette_len = config.scouting.default_palette.len();
    if palette_len < 2 {
        return Err(ConfigError::ValidationError {
            field: "scouting.default_palette".into(),
            message: format!("needs at least 2 colors, got {palette_len}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
