//! Settings persistence for playdeck
//!
//! Stored as YAML in `config.yml`. Loaded once at startup and shared as
//! `Arc<Settings>`; nothing mutates it afterwards.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
pub const DEFAULT_CHEAT_INDEX_URL: &str = "https://cheats.unclejun.vip";

/// Filesystem locations on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Game tracker SQLite log
    pub game_tracker_db: PathBuf,
    pub rom_directory: PathBuf,
    pub archive_directory: PathBuf,
    /// Folder of `<Name>.txt` collection lists
    pub collection_directory: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            game_tracker_db: PathBuf::from("/mnt/SDCARD/.userdata/shared/game_logs.sqlite"),
            rom_directory: PathBuf::from("/mnt/SDCARD/Roms"),
            archive_directory: PathBuf::from("/mnt/SDCARD/Roms/.Archive"),
            collection_directory: PathBuf::from("/mnt/SDCARD/Collections"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_level: String,

    /// Include titles whose ROM only exists in an archive folder
    pub play_history_show_archives: bool,

    /// Tag game list entries with the collections containing them
    pub play_history_show_collections: bool,

    /// Fetch the remote cheat index in the background at startup
    pub prefetch_cheats: bool,

    pub cheat_index_url: String,

    pub paths: Paths,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            play_history_show_archives: false,
            play_history_show_collections: true,
            prefetch_cheats: true,
            cheat_index_url: DEFAULT_CHEAT_INDEX_URL.to_string(),
            paths: Paths::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CoreError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            message: source.to_string(),
            source,
        })
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let write_err = |source| CoreError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = serde_yaml::to_string(self).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            message: source.to_string(),
            source,
        })?;
        std::fs::write(path, content).map_err(write_err)?;

        info!(path = %path.display(), "Settings saved");
        Ok(())
    }
}
