//! playdeck - Play-history browser and ROM library tools for handheld devices

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playdeck_core::config::DEFAULT_CONFIG_FILE;
use playdeck_core::{
    AggregationCache, CheatIndex, CollectionIndex, Library, PlayLogStore, RomLocator, Settings,
    SqlitePlayLog,
};
use playdeck_tui::AppState;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "playdeck",
    version,
    about = "Play-history browser and ROM library tools for handheld devices",
    long_about = "Browse how long you have played each game, per console, narrowed by\n\
                  date, session length and more. Also renames, archives and clears the\n\
                  history of titles without leaving the play log out of sync.\n\
                  \n\
                  Examples:\n\
                    playdeck                                   # Run TUI (default)\n\
                    playdeck stats                             # Print per-console totals\n\
                    playdeck filters --console \"Game Boy (GB)\" # List candidate filters\n\
                    playdeck rename \"Game Boy (GB)/foo.gb\" Foo   # Rename a ROM and its history\n\
                    playdeck config init                       # Write a default config.yml\n\
                  \n\
                  Environment Variables:\n\
                    PLAYDECK_CONFIG                            # Config file path\n\
                    PLAYDECK_DB                                # Play log database path\n\
                    RUST_LOG                                   # Log filter (overrides log_level)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Path to the settings file
    #[arg(long, env = "PLAYDECK_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Play log database (overrides paths.game_tracker_db)
    #[arg(long, env = "PLAYDECK_DB")]
    db: Option<PathBuf>,

    /// Log file; the TUI owns the terminal so logs never go to stdout
    #[arg(long, default_value = "playdeck.log")]
    log_file: PathBuf,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the play-history TUI (default)
    Tui,
    /// Print play time per console and exit
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the filters offered at the root of the filter picker
    Filters {
        /// Only consider titles of this console
        #[arg(long)]
        console: Option<String>,
    },
    /// Rename a ROM, its art and its play log entry
    Rename {
        /// ROM path relative to the ROM directory
        path: String,
        /// New title, without extension
        name: String,
    },
    /// Delete all play history of a ROM
    ClearHistory {
        /// ROM path relative to the ROM directory
        path: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Move a ROM and its art into an archive folder
    Archive {
        /// ROM path relative to the ROM directory
        path: String,
        /// Archive folder name
        archive: String,
    },
    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(Mode::Config {
        action: ConfigAction::Init { force },
    }) = &cli.mode
    {
        cli::init_config(&cli.config, *force)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    if let Some(db) = cli.db {
        settings.paths.game_tracker_db = db;
    }

    init_logging(&cli.log_file, &settings.log_level)?;
    info!(
        config = %cli.config.display(),
        db = %settings.paths.game_tracker_db.display(),
        "playdeck starting"
    );

    let services = Services::new(settings);

    match cli.mode.unwrap_or(Mode::Tui) {
        Mode::Tui => return run_tui(services, &cli.log_file).await,
        Mode::Stats { json } => cli::print_stats(&services.cache, json)?,
        Mode::Filters { console } => cli::print_filters(&services.cache, console.as_deref())?,
        Mode::Rename { path, name } => cli::rename(&services.library, &path, &name)?,
        Mode::ClearHistory { path, yes } => cli::clear_history(&services.library, &path, yes)?,
        Mode::Archive { path, archive } => cli::archive(&services.library, &path, &archive)?,
        Mode::Config { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// Append structured logs to `path`, filtered by `RUST_LOG` or `default_level`.
fn init_logging(path: &Path, default_level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Play log, cache and library wired from settings
struct Services {
    settings: Arc<Settings>,
    cache: Arc<AggregationCache>,
    library: Library,
}

impl Services {
    fn new(settings: Settings) -> Self {
        let paths = &settings.paths;
        let store: Arc<dyn PlayLogStore> =
            Arc::new(SqlitePlayLog::new(paths.game_tracker_db.clone()));
        let locator = RomLocator::new(
            paths.rom_directory.clone(),
            Some(paths.archive_directory.clone()),
        );
        let cache = Arc::new(
            AggregationCache::new(Arc::clone(&store))
                .with_locator(locator.clone(), settings.play_history_show_archives),
        );
        let library = Library::new(store, locator).with_cache(Arc::clone(&cache));

        Self {
            settings: Arc::new(settings),
            cache,
            library,
        }
    }
}

/// Run the TUI; a failed screen is reported in one line, with details in the log file.
async fn run_tui(services: Services, log_file: &Path) -> Result<ExitCode> {
    let Services {
        settings,
        cache,
        library,
    } = services;

    let collections = CollectionIndex::load(&settings.paths.collection_directory);

    let cheats = if settings.prefetch_cheats {
        let cheats = Arc::new(CheatIndex::new());
        let consoles: Vec<String> = cache.get().maps.games.keys().cloned().collect();
        // Detached: the index fills in while the user browses
        let _ = cheats.spawn_prefetch(settings.cheat_index_url.clone(), consoles);
        cheats
    } else {
        Arc::new(CheatIndex::disabled())
    };

    let app = AppState::new(settings, cache, library, collections, cheats);

    let result = tokio::task::spawn_blocking(move || playdeck_tui::run(&app))
        .await
        .context("TUI task panicked")?;

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!(error = ?e, "TUI exited with an error");
            eprintln!("playdeck closed after an error, see {}", log_file.display());
            Ok(ExitCode::FAILURE)
        }
    }
}
