//! ROM tree access and the play-log-aware file operations
//!
//! Paths handed around the crate are relative to the ROM root
//! (`<Console Dir>/<file>`), the same form the play log stores. Archives mirror
//! that layout one level down: `<archive root>/<Archive Name>/<Console Dir>/<file>`.
//! Box art lives next to the ROMs in `<Console Dir>/.media/<stem>.<ext>`.

use crate::cache::AggregationCache;
use crate::error::CoreError;
use crate::models::{RomHome, RomId};
use crate::store::PlayLogStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const MEDIA_DIR: &str = ".media";

/// Resolves play-log paths against the ROM tree and its archives
#[derive(Debug, Clone)]
pub struct RomLocator {
    rom_root: PathBuf,
    archive_root: Option<PathBuf>,
}

impl RomLocator {
    pub fn new(rom_root: impl Into<PathBuf>, archive_root: Option<PathBuf>) -> Self {
        Self {
            rom_root: rom_root.into(),
            archive_root,
        }
    }

    pub fn rom_root(&self) -> &Path {
        &self.rom_root
    }

    pub fn archive_root(&self) -> Option<&Path> {
        self.archive_root.as_deref()
    }

    pub fn absolute(&self, rel_path: &str) -> PathBuf {
        self.rom_root.join(rel_path.trim_start_matches('/'))
    }

    /// Archive folder names, sorted. Hidden folders are skipped.
    pub fn archives(&self) -> Vec<String> {
        let Some(root) = &self.archive_root else {
            return Vec::new();
        };

        let mut names: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        names
    }

    /// Where the ROM recorded at `rel_path` lives now.
    pub fn locate(&self, rel_path: &str) -> RomHome {
        if self.absolute(rel_path).is_file() {
            return RomHome::Present;
        }

        let rel = rel_path.trim_start_matches('/');
        if let Some(root) = &self.archive_root {
            for archive in self.archives() {
                if root.join(&archive).join(rel).is_file() {
                    return RomHome::Archived(archive);
                }
            }
        }

        RomHome::Missing
    }
}

/// Art file next to a ROM, matched on file stem.
pub fn find_art(console_dir: &Path, rom_file: &str) -> Option<PathBuf> {
    let stem = Path::new(rom_file).file_stem()?.to_string_lossy().into_owned();
    let media = console_dir.join(MEDIA_DIR);

    WalkDir::new(&media)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            entry
                .path()
                .file_stem()
                .is_some_and(|s| s.to_string_lossy() == stem)
        })
        .map(|entry| entry.into_path())
}

/// Move a file, creating the destination directory. Refuses to overwrite.
pub fn move_file(from: &Path, to: &Path) -> Result<(), CoreError> {
    let io_err = |source| CoreError::FileMove {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if to.exists() {
        return Err(io_err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "destination exists",
        )));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::rename(from, to).map_err(io_err)?;

    debug!(from = %from.display(), to = %to.display(), "File moved");
    Ok(())
}

/// File operations that keep the play log in step with the ROM tree
pub struct Library {
    store: Arc<dyn PlayLogStore>,
    locator: RomLocator,
    cache: Option<Arc<AggregationCache>>,
}

impl Library {
    pub fn new(store: Arc<dyn PlayLogStore>, locator: RomLocator) -> Self {
        Self {
            store,
            locator,
            cache: None,
        }
    }

    /// Invalidate `cache` after every successful mutation.
    pub fn with_cache(mut self, cache: Arc<AggregationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn locator(&self) -> &RomLocator {
        &self.locator
    }

    fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
    }

    fn resolve_id(&self, rel_path: &str) -> Result<RomId, CoreError> {
        self.store
            .find_id(rel_path)?
            .ok_or_else(|| CoreError::TitleNotFound {
                path: rel_path.to_string(),
            })
    }

    /// Rename a ROM (and its art) and point its play log entry at the new path.
    ///
    /// Two steps, at most once each: the file is moved first, then the log is
    /// updated. If the log update fails the move is not undone and the error is
    /// [`CoreError::LogUpdateAfterMove`]. A title with no log entry is refused
    /// before anything is touched, as is a name that is empty, `.`/`..`, or
    /// contains a path separator.
    ///
    /// Returns the new ROM-root-relative path.
    pub fn rename_title(&self, rel_path: &str, new_name: &str) -> Result<String, CoreError> {
        if !is_plain_file_name(new_name) {
            return Err(CoreError::InvalidName {
                name: new_name.to_string(),
            });
        }
        let id = self.resolve_id(rel_path)?;

        let old_abs = self.locator.absolute(rel_path);
        if !old_abs.is_file() {
            return Err(CoreError::RomNotFound { path: old_abs });
        }

        let rel = Path::new(rel_path.trim_start_matches('/'));
        let console_rel = rel.parent().unwrap_or(Path::new(""));
        let new_file = match rel.extension() {
            Some(ext) => format!("{new_name}.{}", ext.to_string_lossy()),
            None => new_name.to_string(),
        };
        let new_rel = console_rel.join(&new_file).to_string_lossy().into_owned();
        let new_abs = self.locator.absolute(&new_rel);

        move_file(&old_abs, &new_abs)?;

        let console_dir = self.locator.absolute(&console_rel.to_string_lossy());
        let old_file = rel
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(art) = find_art(&console_dir, &old_file) {
            let art_name = match art.extension() {
                Some(ext) => format!("{new_name}.{}", ext.to_string_lossy()),
                None => new_name.to_string(),
            };
            let target = console_dir.join(MEDIA_DIR).join(art_name);
            if let Err(e) = move_file(&art, &target) {
                warn!(error = %e, art = %art.display(), "Art not renamed");
            }
        }

        if let Err(e) = self.store.update_path(id, new_name, &new_rel) {
            warn!(error = %e, id, path = %new_abs.display(), "ROM moved but play log not updated");
            self.invalidate();
            return Err(CoreError::LogUpdateAfterMove {
                path: new_abs,
                source: Box::new(e),
            });
        }

        self.invalidate();
        info!(from = rel_path, to = %new_rel, "Title renamed");
        Ok(new_rel)
    }

    /// Delete all play history for the title recorded at `rel_path`.
    pub fn clear_history(&self, rel_path: &str) -> Result<(), CoreError> {
        let id = self.resolve_id(rel_path)?;
        self.clear_ids(&[id])
    }

    /// Delete all play history for every id of a game in one transaction.
    ///
    /// On failure no id is removed.
    pub fn clear_ids(&self, ids: &[RomId]) -> Result<(), CoreError> {
        self.store.delete_titles(ids)?;
        self.invalidate();
        info!(ids = ?ids, "Play history cleared");
        Ok(())
    }

    /// Move a ROM (and its art) into an archive folder.
    pub fn archive_rom(&self, rel_path: &str, archive: &str) -> Result<PathBuf, CoreError> {
        let archive_root = self
            .locator
            .archive_root()
            .ok_or(CoreError::ArchiveUnconfigured)?;

        let old_abs = self.locator.absolute(rel_path);
        if !old_abs.is_file() {
            return Err(CoreError::RomNotFound { path: old_abs });
        }

        let rel = Path::new(rel_path.trim_start_matches('/'));
        let archive_dir = archive_root.join(archive);
        let new_abs = archive_dir.join(rel);
        move_file(&old_abs, &new_abs)?;

        let console_rel = rel.parent().unwrap_or(Path::new(""));
        let console_dir = self.locator.absolute(&console_rel.to_string_lossy());
        let file = rel
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(art) = find_art(&console_dir, &file) {
            if let Some(art_name) = art.file_name() {
                let target = archive_dir.join(console_rel).join(MEDIA_DIR).join(art_name);
                if let Err(e) = move_file(&art, &target) {
                    warn!(error = %e, art = %art.display(), "Art not archived");
                }
            }
        }

        self.invalidate();
        info!(path = rel_path, archive, "ROM archived");
        Ok(new_abs)
    }
}

/// A single path component that stays inside its folder.
fn is_plain_file_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !name.contains(['/', '\\', '\0'])
}
