//! Configuration for the creature database.
//!
//! Maps directly to `creaturedb.toml`. Every field has a default, so an empty
//! file (or no file at all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatureDbConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Where and how the database asset is persisted.
    #[serde(default)]
    pub asset: AssetConfig,
    /// Values given to newly created creatures.
    #[serde(default)]
    pub defaults: CreatureDefaults,
}

impl CreatureDbConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CreatureDbError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::CreatureDbError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    ///
    /// The library never installs a subscriber; the host reads this through
    /// [`GeneralConfig::level`] when it sets its own up.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl GeneralConfig {
    /// Parse `log_level` into a `tracing` level.
    ///
    /// # Errors
    /// Returns `CreatureDbError::Config` for an unrecognised level name.
    pub fn level(&self) -> crate::error::Result<tracing::Level> {
        self.log_level.parse().map_err(|_| {
            crate::CreatureDbError::Config(format!("unknown log level: {}", self.log_level))
        })
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Storage backend for the database asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetBackend {
    /// A single JSON document on disk.
    #[default]
    Json,
    /// The same document stored as one row of an SQLite database.
    Sqlite,
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Backend: "json" or "sqlite".
    #[serde(default)]
    pub backend: AssetBackend,
    /// File holding the asset (JSON document or SQLite database).
    #[serde(default = "default_asset_path")]
    pub path: PathBuf,
    /// Logical asset name; the row key for the SQLite backend.
    #[serde(default = "default_asset_name")]
    pub asset_name: String,
    /// Pretty-print JSON so the asset diffs well under version control.
    #[serde(default = "default_true")]
    pub pretty: bool,
    /// Use WAL mode (SQLite backend only).
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Detect asset corruption via checksums (SQLite backend only).
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            backend: AssetBackend::default(),
            path: default_asset_path(),
            asset_name: default_asset_name(),
            pretty: true,
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

/// Field values for a freshly created creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureDefaults {
    /// Placeholder display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Starting health.
    #[serde(default = "default_health")]
    pub health: f32,
    /// Starting walk speed.
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,
    /// Starting sprint multiplier.
    #[serde(default = "default_sprint_multiplier")]
    pub sprint_multiplier: f32,
}

impl Default for CreatureDefaults {
    fn default() -> Self {
        Self {
            name: default_name(),
            health: default_health(),
            base_speed: default_base_speed(),
            sprint_multiplier: default_sprint_multiplier(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_asset_path() -> PathBuf { PathBuf::from("Assets/Resources/Databases/Creature Database.json") }
fn default_asset_name() -> String { "Creature Database".to_string() }
fn default_name() -> String { "New creature".to_string() }
fn default_health() -> f32 { 100.0 }
fn default_base_speed() -> f32 { 5.0 }
fn default_sprint_multiplier() -> f32 { 1.5 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = CreatureDbConfig::from_toml("").expect("parse");
        assert_eq!(config.asset.backend, AssetBackend::Json);
        assert_eq!(config.defaults, CreatureDefaults::default());
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = CreatureDbConfig::from_toml(
            r#"
            [asset]
            backend = "sqlite"
            path = "db/creatures.db"

            [defaults]
            health = 250.0
            "#,
        )
        .expect("parse");
        assert_eq!(config.asset.backend, AssetBackend::Sqlite);
        assert_eq!(config.asset.path, PathBuf::from("db/creatures.db"));
        assert!(config.asset.checksum_enabled);
        assert!((config.defaults.health - 250.0).abs() < f32::EPSILON);
        assert_eq!(config.defaults.name, "New creature");
    }

    #[test]
    fn log_level_parses_to_tracing_level() {
        let config = CreatureDbConfig::from_toml("[general]\nlog_level = \"debug\"").expect("parse");
        assert_eq!(config.general.level().expect("level"), tracing::Level::DEBUG);
        assert_eq!(GeneralConfig::default().level().expect("level"), tracing::Level::INFO);

        let noisy = GeneralConfig {
            log_level: "chatty".to_string(),
        };
        assert!(matches!(noisy.level(), Err(crate::CreatureDbError::Config(_))));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = CreatureDbConfig::from_toml("[asset\nbackend = 3").expect_err("should fail");
        assert!(matches!(err, crate::CreatureDbError::Config(_)));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = CreatureDbConfig::from_toml("[asset]\nbackend = \"yaml\"").expect_err("should fail");
        assert!(matches!(err, crate::CreatureDbError::Config(_)));
    }
}
