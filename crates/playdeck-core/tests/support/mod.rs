//! Shared fixture: a throwaway game-tracker database and ROM tree

#![allow(dead_code)]

use playdeck_core::{AggregationCache, RomLocator, SqlitePlayLog};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const SCHEMA: &str = r#"
    CREATE TABLE rom (
        id INTEGER PRIMARY KEY,
        type TEXT,
        name TEXT,
        file_path TEXT,
        created_at INTEGER,
        updated_at INTEGER
    );
    CREATE TABLE play_activity (
        rom_id INTEGER,
        play_time INTEGER,
        created_at INTEGER,
        updated_at INTEGER
    );
"#;

pub struct Fixture {
    pub dir: TempDir,
    pub db: PathBuf,
    pub rom_root: PathBuf,
    pub archive_root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("game_logs.sqlite");
        let rom_root = dir.path().join("Roms");
        let archive_root = dir.path().join("Roms/.Archive");
        std::fs::create_dir_all(&archive_root).unwrap();

        Connection::open(&db).unwrap().execute_batch(SCHEMA).unwrap();

        Self {
            dir,
            db,
            rom_root,
            archive_root,
        }
    }

    fn conn(&self) -> Connection {
        Connection::open(&self.db).unwrap()
    }

    pub fn add_rom(&self, id: i64, name: &str, rel_path: &str) -> &Self {
        self.conn()
            .execute(
                "INSERT INTO rom (id, name, file_path) VALUES (?, ?, ?)",
                params![id, name, rel_path],
            )
            .unwrap();
        self
    }

    pub fn add_session(&self, rom_id: i64, start: i64, duration: i64) -> &Self {
        self.conn()
            .execute(
                "INSERT INTO play_activity (rom_id, play_time, created_at, updated_at) \
                 VALUES (?, ?, ?, ?)",
                params![rom_id, duration, start, start + duration],
            )
            .unwrap();
        self
    }

    /// Make any delete of rom `id` abort, as a locked or corrupt row would.
    pub fn block_deletes_of(&self, id: i64) -> &Self {
        self.conn()
            .execute_batch(&format!(
                "CREATE TRIGGER block_delete_{id} BEFORE DELETE ON rom WHEN old.id = {id} \
                 BEGIN SELECT RAISE(ABORT, 'row locked'); END;"
            ))
            .unwrap();
        self
    }

    /// Create the ROM file at `rel_path` under the ROM root.
    pub fn place_rom(&self, rel_path: &str) -> &Self {
        write_file(&self.rom_root.join(rel_path));
        self
    }

    /// Create the ROM file inside an archive folder.
    pub fn place_archived(&self, archive: &str, rel_path: &str) -> &Self {
        write_file(&self.archive_root.join(archive).join(rel_path));
        self
    }

    pub fn session_count(&self) -> i64 {
        self.conn()
            .query_row("SELECT COUNT(*) FROM play_activity", [], |row| row.get(0))
            .unwrap()
    }

    pub fn store(&self) -> Arc<SqlitePlayLog> {
        Arc::new(SqlitePlayLog::new(&self.db))
    }

    pub fn locator(&self) -> RomLocator {
        RomLocator::new(&self.rom_root, Some(self.archive_root.clone()))
    }

    pub fn cache(&self) -> Arc<AggregationCache> {
        Arc::new(AggregationCache::new(self.store()))
    }

    pub fn cache_with_archives(&self, show_archives: bool) -> Arc<AggregationCache> {
        Arc::new(AggregationCache::new(self.store()).with_locator(self.locator(), show_archives))
    }
}

fn write_file(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"rom").unwrap();
}
