//! Play log store over the device's game-tracker SQLite database
//!
//! Schema (owned by the device, never created here):
//! - `rom(id, name, file_path, ...)`: one row per tracked title; `file_path` is
//!   relative to the ROM root (`<Console Dir>/<file>`)
//! - `play_activity(rom_id, play_time, created_at, updated_at, ...)`: one row per session
//!
//! Every operation opens its own connection, so a missing or locked database
//! surfaces as [`CoreError::StoreUnavailable`] on that call only. Mutations run
//! in a transaction and roll back on any failure.

use crate::error::CoreError;
use crate::filters::Predicate;
use crate::models::{PlaySession, RomId, RomRecord};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read/write access to the play log
pub trait PlayLogStore: Send + Sync {
    /// Id of the title recorded at `path` (ROM-root relative).
    fn find_id(&self, path: &str) -> Result<Option<RomId>, CoreError>;

    /// Current id → name/path mapping.
    fn list_roms(&self) -> Result<Vec<RomRecord>, CoreError>;

    /// Every session of the given titles.
    fn list_sessions(&self, ids: &[RomId]) -> Result<Vec<PlaySession>, CoreError> {
        self.list_sessions_matching(ids, &Predicate::All)
    }

    /// Sessions of the given titles that satisfy `predicate`, newest first.
    fn list_sessions_matching(
        &self,
        ids: &[RomId],
        predicate: &Predicate,
    ) -> Result<Vec<PlaySession>, CoreError>;

    /// Point a title at a new name and path.
    fn update_path(&self, id: RomId, new_name: &str, new_path: &str) -> Result<(), CoreError>;

    /// Remove a title and all of its sessions.
    fn delete_title(&self, id: RomId) -> Result<(), CoreError> {
        self.delete_titles(&[id])
    }

    /// Remove several ids and all of their sessions, all or nothing.
    fn delete_titles(&self, ids: &[RomId]) -> Result<(), CoreError>;
}

/// [`PlayLogStore`] backed by the game-tracker SQLite file
pub struct SqlitePlayLog {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl SqlitePlayLog {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, CoreError> {
        // No SQLITE_OPEN_CREATE: a missing log is "unavailable", not an empty new file
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| CoreError::StoreUnavailable {
            path: self.db_path.clone(),
            source,
        })?;

        conn.busy_timeout(self.busy_timeout)
            .map_err(|source| CoreError::StoreUnavailable {
                path: self.db_path.clone(),
                source,
            })?;

        Ok(conn)
    }
}

fn query_err(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> CoreError {
    move |source| CoreError::StoreQuery { operation, source }
}

impl PlayLogStore for SqlitePlayLog {
    fn find_id(&self, path: &str) -> Result<Option<RomId>, CoreError> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT id FROM rom WHERE file_path = ?",
            params![path],
            |row| row.get(0),
        )
        .optional()
        .map_err(query_err("find rom id"))
    }

    fn list_roms(&self) -> Result<Vec<RomRecord>, CoreError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT id, name, file_path FROM rom")
            .map_err(query_err("prepare rom listing"))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RomRecord {
                    id: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    file_path: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })
            .map_err(query_err("list roms"))?;

        let mut roms = Vec::new();
        for row in rows {
            roms.push(row.map_err(query_err("read rom row"))?);
        }

        debug!(count = roms.len(), "Roms listed");
        Ok(roms)
    }

    fn list_sessions_matching(
        &self,
        ids: &[RomId],
        predicate: &Predicate,
    ) -> Result<Vec<PlaySession>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let scope = Predicate::RomIn(ids.to_vec()).and(predicate.clone());
        let sql = format!(
            "SELECT rom_id, COALESCE(created_at, 0), COALESCE(play_time, 0), \
             COALESCE(updated_at, created_at, 0) \
             FROM play_activity WHERE {} ORDER BY created_at DESC",
            scope.to_sql()
        );

        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(query_err("prepare session listing"))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(PlaySession {
                    rom_id: row.get(0)?,
                    start_time: row.get(1)?,
                    duration: row.get(2)?,
                    update_time: row.get(3)?,
                })
            })
            .map_err(query_err("list sessions"))?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row.map_err(query_err("read session row"))?);
        }

        debug!(ids = ids.len(), count = sessions.len(), "Sessions listed");
        Ok(sessions)
    }

    fn update_path(&self, id: RomId, new_name: &str, new_path: &str) -> Result<(), CoreError> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(query_err("begin rename transaction"))?;

        let exists: Option<RomId> = tx
            .query_row("SELECT id FROM rom WHERE id = ?", params![id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(query_err("find rom for rename"))?;

        if exists.is_none() {
            warn!(id, "No rom row to rename");
            return Err(CoreError::IdNotFound { id });
        }

        tx.execute(
            "UPDATE rom SET name = ?, file_path = ? WHERE id = ?",
            params![new_name, new_path, id],
        )
        .map_err(query_err("update rom path"))?;

        tx.commit().map_err(query_err("commit rename"))?;

        info!(id, new_name, new_path, "Play log entry renamed");
        Ok(())
    }

    fn delete_titles(&self, ids: &[RomId]) -> Result<(), CoreError> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(query_err("begin delete transaction"))?;

        let mut sessions = 0;
        for &id in ids {
            let exists: Option<RomId> = tx
                .query_row("SELECT id FROM rom WHERE id = ?", params![id], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(query_err("find rom for delete"))?;

            if exists.is_none() {
                warn!(id, "No rom row to delete");
                return Err(CoreError::IdNotFound { id });
            }

            sessions += tx
                .execute("DELETE FROM play_activity WHERE rom_id = ?", params![id])
                .map_err(query_err("delete play activity"))?;
            tx.execute("DELETE FROM rom WHERE id = ?", params![id])
                .map_err(query_err("delete rom"))?;
        }

        // Dropping the transaction on any early return rolls every id back
        tx.commit().map_err(query_err("commit delete"))?;

        info!(ids = ?ids, sessions, "Play log entries deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCHEMA: &str = r#"
        CREATE TABLE rom (id INTEGER PRIMARY KEY, type TEXT, name TEXT, file_path TEXT);
        CREATE TABLE play_activity (
            rom_id INTEGER, play_time INTEGER, created_at INTEGER, updated_at INTEGER
        );
    "#;

    fn seeded(dir: &Path) -> SqlitePlayLog {
        let path = dir.join("game_logs.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO rom (id, name, file_path) VALUES
                (1, 'Tetris', 'Game Boy (GB)/Tetris.gb'),
                (2, 'Metroid', 'Game Boy Advance (GBA)/Metroid.gba');
            INSERT INTO play_activity VALUES
                (1, 600, 1000, 1600),
                (1, 1200, 5000, 6200),
                (2, 3600, 3000, 6600);
            "#,
        )
        .unwrap();
        SqlitePlayLog::new(path)
    }

    #[test]
    fn test_missing_db_is_unavailable() {
        let dir = tempdir().unwrap();
        let store = SqlitePlayLog::new(dir.path().join("nope.sqlite"));

        let err = store.list_roms().unwrap_err();
        assert!(matches!(err, CoreError::StoreUnavailable { .. }));
        assert!(!dir.path().join("nope.sqlite").exists());
    }

    #[test]
    fn test_find_id_and_list() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        assert_eq!(store.find_id("Game Boy (GB)/Tetris.gb").unwrap(), Some(1));
        assert_eq!(store.find_id("Game Boy (GB)/Zelda.gb").unwrap(), None);
        assert_eq!(store.list_roms().unwrap().len(), 2);

        let sessions = store.list_sessions(&[1]).unwrap();
        assert_eq!(sessions.len(), 2);
        // Newest first
        assert_eq!(sessions[0].start_time, 5000);
        assert!(store.list_sessions(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_list_sessions_matching_applies_predicate() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        let long = store
            .list_sessions_matching(&[1, 2], &Predicate::DurationAtLeast(1000))
            .unwrap();
        let ids: Vec<_> = long.iter().map(|s| s.rom_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(long.iter().all(|s| s.duration >= 1000));
    }

    #[test]
    fn test_update_path() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        store
            .update_path(1, "Tetris DX", "Game Boy (GB)/Tetris DX.gb")
            .unwrap();
        assert_eq!(store.find_id("Game Boy (GB)/Tetris DX.gb").unwrap(), Some(1));
        assert_eq!(store.find_id("Game Boy (GB)/Tetris.gb").unwrap(), None);

        let err = store.update_path(99, "x", "y").unwrap_err();
        assert!(matches!(err, CoreError::IdNotFound { id: 99 }));
    }

    #[test]
    fn test_delete_title_removes_sessions() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        store.delete_title(1).unwrap();
        assert_eq!(store.find_id("Game Boy (GB)/Tetris.gb").unwrap(), None);
        assert!(store.list_sessions(&[1]).unwrap().is_empty());
        assert_eq!(store.list_sessions(&[2]).unwrap().len(), 1);

        assert!(matches!(
            store.delete_title(1),
            Err(CoreError::IdNotFound { id: 1 })
        ));
    }

    #[test]
    fn test_delete_titles_is_all_or_nothing() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());
        Connection::open(store.path())
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER keep_metroid BEFORE DELETE ON rom WHEN old.id = 2 \
                 BEGIN SELECT RAISE(ABORT, 'locked'); END;",
            )
            .unwrap();

        let err = store.delete_titles(&[1, 2]).unwrap_err();

        assert!(matches!(err, CoreError::StoreQuery { .. }));
        assert_eq!(store.find_id("Game Boy (GB)/Tetris.gb").unwrap(), Some(1));
        assert_eq!(store.list_sessions(&[1]).unwrap().len(), 2);
        assert_eq!(store.list_sessions(&[2]).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_titles_unknown_id_rolls_back() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        let err = store.delete_titles(&[1, 99]).unwrap_err();

        assert!(matches!(err, CoreError::IdNotFound { id: 99 }));
        assert_eq!(store.list_sessions(&[1]).unwrap().len(), 2);

        store.delete_titles(&[1, 2]).unwrap();
        assert!(store.list_roms().unwrap().is_empty());
    }
}
