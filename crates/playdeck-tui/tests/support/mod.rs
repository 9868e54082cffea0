//! Shared fixture: a throwaway play log plus a toolkit that replays scripted answers

#![allow(dead_code)]

use anyhow::{anyhow, bail};
use playdeck_core::{
    AggregationCache, CheatIndex, CollectionIndex, FilterClock, FilterEngine, Library, RomLocator,
    Settings, SqlitePlayLog,
};
use playdeck_tui::nav::Cursor;
use playdeck_tui::toolkit::{
    DetailChoice, DetailView, ListChoice, ListResponse, ListView, Toolkit,
};
use playdeck_tui::AppState;
use rusqlite::{params, Connection};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const T0: i64 = 1_710_583_200; // 2024-03-16 10:00 UTC
pub const HOUR: i64 = 3_600;
pub const DAY: i64 = 86_400;

const SCHEMA: &str = r#"
    CREATE TABLE rom (id INTEGER PRIMARY KEY, name TEXT, file_path TEXT);
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
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("game_logs.sqlite");
        Connection::open(&db).unwrap().execute_batch(SCHEMA).unwrap();
        Self { dir, db }
    }

    /// Two Game Boy titles and one Genesis title
    ///
    /// Foo: 1h + 30m, Bar: 2h, Sonic: 10m; 3h 40m in total.
    pub fn library() -> Self {
        let fx = Self::new();
        fx.add_rom(1, "Foo", "Game Boy (GB)/Foo.gb")
            .add_rom(2, "Bar", "Game Boy (GB)/Bar.gb")
            .add_rom(3, "Sonic", "Sega Genesis (MD)/Sonic.md")
            .add_session(1, T0, HOUR)
            .add_session(1, T0 + 5 * HOUR, HOUR / 2)
            .add_session(2, T0 + DAY, 2 * HOUR)
            .add_session(3, T0 + 2 * DAY, 600);
        fx
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

    pub fn session_count(&self) -> i64 {
        self.conn()
            .query_row("SELECT COUNT(*) FROM play_activity", [], |row| row.get(0))
            .unwrap()
    }

    /// Write `<name>.txt` into the fixture's collection folder
    pub fn add_collection(&self, name: &str, rom_paths: &[&str]) -> &Self {
        let dir = self.collection_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{name}.txt")), rom_paths.join("\n")).unwrap();
        self
    }

    pub fn collection_dir(&self) -> PathBuf {
        self.dir.path().join("Collections")
    }

    pub fn app(&self) -> AppState {
        self.app_with(Settings::default(), CollectionIndex::default())
    }

    pub fn app_with(&self, settings: Settings, collections: CollectionIndex) -> AppState {
        let store = Arc::new(SqlitePlayLog::new(&self.db));
        let cache = Arc::new(AggregationCache::new(store.clone()));
        let locator = RomLocator::new(self.dir.path().join("Roms"), None);
        let library = Library::new(store, locator).with_cache(cache.clone());
        let engine =
            FilterEngine::new(cache.clone()).with_clock(FilterClock::fixed(T0 + 10 * DAY, 0));

        AppState::new(
            Arc::new(settings),
            cache,
            library,
            collections,
            Arc::new(CheatIndex::disabled()),
        )
        .with_engine(engine)
    }
}

/// One scripted user answer
pub enum Answer {
    Select(usize),
    /// Select the first item starting with this text
    SelectItem(&'static str),
    Action,
    Back,
    Details(DetailChoice),
    Confirm(bool),
}

/// Toolkit that records every view and answers from a script
#[derive(Default)]
pub struct FakeToolkit {
    answers: VecDeque<Answer>,
    pub lists: Vec<ListView>,
    pub details: Vec<DetailView>,
    pub confirms: Vec<String>,
    pub messages: Vec<String>,
    /// `messages.len()` at each flush
    pub flushed_at: Vec<usize>,
}

impl FakeToolkit {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn list_titles(&self) -> Vec<&str> {
        self.lists.iter().map(|v| v.title.as_str()).collect()
    }

    fn next(&mut self) -> anyhow::Result<Answer> {
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("answer script exhausted"))
    }
}

impl Toolkit for FakeToolkit {
    fn list(&mut self, view: &ListView) -> anyhow::Result<ListResponse> {
        self.lists.push(view.clone());
        let choice = match self.next()? {
            Answer::Select(index) => ListChoice::Selected(index),
            Answer::SelectItem(prefix) => {
                let index = view
                    .items
                    .iter()
                    .position(|item| item.starts_with(prefix))
                    .ok_or_else(|| anyhow!("no item starting with {prefix:?} in {:?}", view.items))?;
                ListChoice::Selected(index)
            }
            Answer::Action => ListChoice::Action,
            Answer::Back => ListChoice::Cancelled,
            _ => bail!("list drawn, another answer expected"),
        };
        let cursor = match choice {
            ListChoice::Selected(index) => Cursor::new(index, 0),
            _ => view.cursor,
        };
        Ok(ListResponse { choice, cursor })
    }

    fn details(&mut self, view: &DetailView) -> anyhow::Result<DetailChoice> {
        self.details.push(view.clone());
        match self.next()? {
            Answer::Details(choice) => Ok(choice),
            Answer::Back => Ok(DetailChoice::Back),
            _ => bail!("details drawn, another answer expected"),
        }
    }

    fn confirm(&mut self, _title: &str, message: &str) -> anyhow::Result<bool> {
        self.confirms.push(message.to_string());
        match self.next()? {
            Answer::Confirm(yes) => Ok(yes),
            _ => bail!("confirm drawn, another answer expected"),
        }
    }

    fn show_message(&mut self, message: &str, _duration: Duration) {
        self.messages.push(message.to_string());
    }

    fn flush_messages(&mut self) -> anyhow::Result<()> {
        self.flushed_at.push(self.messages.len());
        Ok(())
    }
}

/// Value of a labelled row on a details view
pub fn row<'a>(view: &'a DetailView, label: &str) -> &'a str {
    view.rows
        .iter()
        .find(|(l, _)| l == label)
        .map(|(_, v)| v.as_str())
        .unwrap_or_else(|| panic!("no row {label}"))
}
