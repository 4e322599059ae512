//! Persistence backends for the creature database asset.
//!
//! The whole ordered collection is stored as one versioned JSON document:
//!
//! ```json
//! { "version": 1, "creatures": [ { "id": "...", "name": "Wolf", ... } ] }
//! ```
//!
//! Three backends implement [`AssetStorage`]:
//! - [`JsonFileAsset`] writes the document to a single file, via a temporary
//!   file and a rename so a failed save never truncates the previous asset.
//! - [`SqliteAsset`] keeps the document in one BLOB row of an SQLite
//!   database, alongside an `updated_at` stamp and an optional CRC-32.
//! - [`MemoryAsset`] keeps the encoded document in memory (tests, tools).
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS creature_assets (
//!     asset_name TEXT PRIMARY KEY,
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{AssetBackend, AssetConfig};
use crate::creature::Creature;
use crate::error::{CreatureDbError, Result};

/// Current revision of the asset document layout.
pub const ASSET_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Storage seam
// ---------------------------------------------------------------------------

/// Whole-collection load/save of the creature database asset.
pub trait AssetStorage: Send {
    /// Read the persisted collection. `Ok(None)` means no asset exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset exists but cannot be read or decoded.
    fn load(&self) -> Result<Option<Vec<Creature>>>;

    /// Replace the persisted collection with `creatures`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset cannot be encoded or written.
    fn save(&self, creatures: &[Creature]) -> Result<()>;

    /// Human-readable location of the asset, for log messages.
    fn location(&self) -> String;
}

/// Open the backend selected by `config`.
///
/// # Errors
///
/// Returns [`CreatureDbError::Database`] if the SQLite backend cannot be
/// opened, or [`CreatureDbError::Io`] if its parent directory cannot be
/// created.
pub fn open_storage(config: &AssetConfig) -> Result<Box<dyn AssetStorage>> {
    match config.backend {
        AssetBackend::Json => Ok(Box::new(JsonFileAsset::new(&config.path, config.pretty))),
        AssetBackend::Sqlite => Ok(Box::new(SqliteAsset::open(&config.path, config)?)),
    }
}

// ---------------------------------------------------------------------------
// Document encoding
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AssetDocumentRef<'a> {
    version: u32,
    creatures: &'a [Creature],
}

#[derive(Deserialize)]
struct AssetDocument {
    version: u32,
    #[serde(default)]
    creatures: Vec<Creature>,
}

/// Encode a collection as a versioned asset document.
///
/// # Errors
///
/// Returns [`CreatureDbError::Serialization`] if JSON encoding fails.
pub fn encode_document(creatures: &[Creature], pretty: bool) -> Result<Vec<u8>> {
    let doc = AssetDocumentRef {
        version: ASSET_VERSION,
        creatures,
    };
    let bytes = if pretty {
        serde_json::to_vec_pretty(&doc)
    } else {
        serde_json::to_vec(&doc)
    };
    bytes.map_err(|e| CreatureDbError::Serialization(e.to_string()))
}

/// Decode an asset document back into an ordered collection.
///
/// # Errors
///
/// Returns [`CreatureDbError::Serialization`] on malformed JSON, or
/// [`CreatureDbError::UnsupportedVersion`] for documents from a newer format.
pub fn decode_document(bytes: &[u8]) -> Result<Vec<Creature>> {
    let doc: AssetDocument =
        serde_json::from_slice(bytes).map_err(|e| CreatureDbError::Serialization(e.to_string()))?;
    if doc.version > ASSET_VERSION {
        return Err(CreatureDbError::UnsupportedVersion {
            found: doc.version,
            supported: ASSET_VERSION,
        });
    }
    Ok(doc.creatures)
}

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 of `data` as a lowercase hex string.
fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

/// Basic CRC-32 (ISO 3309 / ITU-T V.42) computation.
fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// JsonFileAsset
// ---------------------------------------------------------------------------

/// The asset as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileAsset {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileAsset {
    /// Point at `path`. Nothing is touched on disk until the first save.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P, pretty: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty,
        }
    }

    /// Path of the asset file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl AssetStorage for JsonFileAsset {
    fn load(&self) -> Result<Option<Vec<Creature>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let start = Instant::now();
        let bytes = std::fs::read(&self.path)?;
        let creatures = decode_document(&bytes)?;
        debug!(
            path = %self.path.display(),
            creatures = creatures.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Loaded creature asset"
        );
        Ok(Some(creatures))
    }

    fn save(&self, creatures: &[Creature]) -> Result<()> {
        let start = Instant::now();
        let bytes = encode_document(creatures, self.pretty)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.temp_path();
        if let Err(e) = std::fs::write(&tmp, &bytes).and_then(|()| std::fs::rename(&tmp, &self.path)) {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                debug!(path = %tmp.display(), error = %cleanup, "Temp asset not removed");
            }
            return Err(e.into());
        }

        debug!(
            path = %self.path.display(),
            creatures = creatures.len(),
            bytes = bytes.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Saved creature asset"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// SqliteAsset
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS creature_assets (
    asset_name TEXT PRIMARY KEY,
    data       BLOB NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

/// The asset as one row of an SQLite database.
///
/// # Usage
///
/// ```no_run
/// # use creaturedb_core::persistence::{AssetStorage, SqliteAsset};
/// # use creaturedb_core::config::AssetConfig;
/// # use creaturedb_core::Creature;
/// let asset = SqliteAsset::open("creatures.db", &AssetConfig::default())?;
/// asset.save(&[Creature::default()])?;
/// let loaded = asset.load()?;
/// # Ok::<(), creaturedb_core::error::CreatureDbError>(())
/// ```
pub struct SqliteAsset {
    conn: Connection,
    asset_name: String,
    checksum_enabled: bool,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAsset")
            .field("db_path", &self.db_path)
            .field("asset_name", &self.asset_name)
            .field("checksum_enabled", &self.checksum_enabled)
            .finish_non_exhaustive()
    }
}

impl SqliteAsset {
    /// Open (or create) an SQLite database at `path`.
    ///
    /// The parent directory and the schema are created if missing.
    /// WAL mode is enabled when `config.wal_mode` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureDbError::Database`] on SQLite failures, or
    /// [`CreatureDbError::Io`] if the parent directory cannot be created.
    pub fn open<P: AsRef<Path>>(path: P, config: &AssetConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            asset = %config.asset_name,
            wal = config.wal_mode,
            "Creature asset database opened"
        );

        Ok(Self {
            conn,
            asset_name: config.asset_name.clone(),
            checksum_enabled: config.checksum_enabled,
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`CreatureDbError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &AssetConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            asset_name: config.asset_name.clone(),
            checksum_enabled: config.checksum_enabled,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// When the asset row was last written, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureDbError::Database`] on SQLite failures.
    pub fn last_saved(&self) -> Result<Option<DateTime<Utc>>> {
        let stamp: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM creature_assets WHERE asset_name = ?1",
                params![self.asset_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(stamp
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Copy the database to `dest_path` using SQLite's online-backup API.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureDbError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let start = Instant::now();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dest)?;
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;

        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Creature asset backup completed"
        );
        Ok(())
    }

    /// Run `PRAGMA integrity_check`; `Ok(false)` means corruption.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureDbError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl AssetStorage for SqliteAsset {
    fn load(&self) -> Result<Option<Vec<Creature>>> {
        let start = Instant::now();
        let mut stmt = self
            .conn
            .prepare_cached("SELECT data, checksum FROM creature_assets WHERE asset_name = ?1")?;

        let row: Option<(Vec<u8>, Option<String>)> = stmt
            .query_row(params![self.asset_name], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((data, stored_checksum)) = row else {
            return Ok(None);
        };

        if self.checksum_enabled {
            if let Some(ref expected) = stored_checksum {
                let actual = crc32_hex(&data);
                if *expected != actual {
                    warn!(
                        asset = %self.asset_name,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch — possible asset corruption"
                    );
                }
            }
        }

        let creatures = decode_document(&data)?;
        debug!(
            asset = %self.asset_name,
            creatures = creatures.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Loaded creature asset"
        );
        Ok(Some(creatures))
    }

    fn save(&self, creatures: &[Creature]) -> Result<()> {
        let start = Instant::now();
        let data = encode_document(creatures, false)?;
        let checksum = self.checksum_enabled.then(|| crc32_hex(&data));
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO creature_assets (asset_name, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(asset_name) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![self.asset_name, data, now, checksum],
        )?;

        debug!(
            asset = %self.asset_name,
            creatures = creatures.len(),
            bytes = data.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Saved creature asset"
        );
        Ok(())
    }

    fn location(&self) -> String {
        format!("{}#{}", self.db_path.display(), self.asset_name)
    }
}

// ---------------------------------------------------------------------------
// MemoryAsset
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryAssetState {
    document: Option<Vec<u8>>,
    saves: usize,
    fail_saves: bool,
}

/// In-memory asset. Clones share the same document, so dropping a store and
/// loading a new one from a clone behaves like a process restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryAsset {
    state: Arc<Mutex<MemoryAssetState>>,
}

impl MemoryAsset {
    /// Create an empty (absent) asset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.state.lock().saves
    }

    /// Whether a document has been written.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.state.lock().document.is_some()
    }

    /// Make subsequent saves fail with an I/O error until reset.
    pub fn set_fail_saves(&self, fail: bool) {
        self.state.lock().fail_saves = fail;
    }
}

impl AssetStorage for MemoryAsset {
    fn load(&self) -> Result<Option<Vec<Creature>>> {
        let state = self.state.lock();
        state.document.as_deref().map(decode_document).transpose()
    }

    fn save(&self, creatures: &[Creature]) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_saves {
            return Err(CreatureDbError::Io(std::io::Error::other(
                "memory asset is read-only",
            )));
        }
        state.document = Some(encode_document(creatures, false)?);
        state.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
