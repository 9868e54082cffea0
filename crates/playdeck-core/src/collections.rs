//! Game collections
//!
//! A collection is a `<Name>.txt` file listing one ROM path per line. Lookup is
//! by tag-stripped game name, the same key the play maps group on.

use crate::error::CoreError;
use crate::names::{clean_name, strip_tags};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub file: PathBuf,
    /// ROM paths as listed in the file
    pub entries: Vec<String>,
}

impl Collection {
    pub fn read(file: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(file).map_err(|source| CoreError::DirectoryRead {
            path: file.to_path_buf(),
            source,
        })?;

        let name = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            name,
            file: file.to_path_buf(),
            entries,
        })
    }

    /// Every `.txt` collection directly under `dir`, by name. A missing folder has none.
    pub fn load_all(dir: &Path) -> Result<Vec<Self>, CoreError> {
        if !dir.exists() {
            debug!(path = %dir.display(), "No collection folder");
            return Ok(Vec::new());
        }
        if !dir.is_dir() {
            return Err(CoreError::DirectoryRead {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a folder"),
            });
        }

        let mut collections = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable collection entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "txt") {
                continue;
            }
            match Self::read(path) {
                Ok(collection) => collections.push(collection),
                Err(e) => warn!(error = %e, "Skipping unreadable collection"),
            }
        }

        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }
}

/// Game name → names of the collections listing it
#[derive(Debug, Clone, Default)]
pub struct CollectionIndex {
    by_game: HashMap<String, Vec<String>>,
}

impl CollectionIndex {
    pub fn build(collections: &[Collection]) -> Self {
        let mut by_game: HashMap<String, Vec<String>> = HashMap::new();
        for collection in collections {
            for entry in &collection.entries {
                let file = Path::new(entry)
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let names = by_game.entry(clean_name(&file)).or_default();
                if !names.contains(&collection.name) {
                    names.push(collection.name.clone());
                }
            }
        }
        Self { by_game }
    }

    /// Load and index the collection folder; unreadable folders index nothing.
    pub fn load(dir: &Path) -> Self {
        match Collection::load_all(dir) {
            Ok(collections) => Self::build(&collections),
            Err(e) => {
                warn!(error = %e, "Collections unavailable");
                Self::default()
            }
        }
    }

    pub fn collections_for(&self, game_name: &str) -> &[String] {
        self.by_game
            .get(&strip_tags(game_name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `[AB] ` from the first letters of the collections holding the game.
    pub fn tag(&self, game_name: &str) -> String {
        let letters: String = self
            .collections_for(game_name)
            .iter()
            .filter_map(|name| name.chars().next())
            .collect();
        if letters.is_empty() {
            String::new()
        } else {
            format!("[{letters}] ")
        }
    }
}
