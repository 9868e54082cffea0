//! Non-interactive commands
//!
//! Each command drives the same core services as the TUI and prints a
//! comfy-table (or JSON) summary.

use anyhow::{bail, Context, Result};
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use playdeck_core::models::PlayMaps;
use playdeck_core::names::{format_duration, format_hours, format_percent};
use playdeck_core::{
    AggregationCache, DegradedState, FilterCriterion, FilterEngine, Library, Predicate, Settings,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

/// Print play time per console, most played first.
pub fn print_stats(cache: &Arc<AggregationCache>, json: bool) -> Result<()> {
    let snapshot = cache.get();
    report_degraded(&cache.degraded_state());
    println!("{}", format_stats(&snapshot.maps, json)?);
    Ok(())
}

/// Print the root filter candidates, optionally for one console.
pub fn print_filters(cache: &Arc<AggregationCache>, console: Option<&str>) -> Result<()> {
    let maps = cache.get().maps.clone();
    report_degraded(&cache.degraded_state());

    if let Some(console) = console {
        if maps.games_for(console).is_empty() {
            bail!("No play records for console '{console}'");
        }
    }

    let engine = FilterEngine::new(Arc::clone(cache));
    let criteria = engine.generate(&maps.ids(console), &Predicate::All, None);
    println!("{}", format_filters(&criteria));
    Ok(())
}

pub fn rename(library: &Library, path: &str, name: &str) -> Result<()> {
    let new_path = library
        .rename_title(path, name)
        .with_context(|| format!("Failed to rename {path}"))?;
    println!("Renamed {path} -> {new_path}");
    Ok(())
}

pub fn clear_history(library: &Library, path: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete all play history for {path}?"))? {
        println!("Cancelled.");
        return Ok(());
    }
    library
        .clear_history(path)
        .with_context(|| format!("Failed to clear play history for {path}"))?;
    println!("Play history cleared for {path}");
    Ok(())
}

pub fn archive(library: &Library, path: &str, archive: &str) -> Result<()> {
    let target = library
        .archive_rom(path, archive)
        .with_context(|| format!("Failed to archive {path}"))?;
    println!("Archived {path} -> {}", target.display());
    Ok(())
}

/// Write default settings to `path`; refuses to overwrite unless `force`.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Settings::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn report_degraded(state: &DegradedState) {
    match state {
        DegradedState::Healthy => {}
        DegradedState::Stale { reason } => {
            eprintln!("warning: play log unavailable, showing last loaded data ({reason})")
        }
        DegradedState::Empty { reason } => eprintln!("warning: play log unavailable ({reason})"),
    }
}

fn header(table: &mut Table, names: &[&str]) {
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        names
            .iter()
            .map(|name| Cell::new(name).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
}

/// Per-console table plus a total line, or the raw maps as JSON
pub fn format_stats(maps: &PlayMaps, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(maps).context("Failed to serialize play stats");
    }

    if maps.is_empty() {
        return Ok("No Play Records Found".to_string());
    }

    let mut table = Table::new();
    header(&mut table, &["Console", "Games", "Sessions", "Play Time", "Share"]);

    for (console, secs) in maps.consoles_by_play_time() {
        let games = maps.games_for(console);
        let sessions: u32 = games.iter().map(|g| g.play_count).sum();
        let share = (maps.grand_total > 0).then(|| secs as f64 / maps.grand_total as f64 * 100.0);
        table.add_row(vec![
            Cell::new(console),
            Cell::new(games.len()).set_alignment(CellAlignment::Right),
            Cell::new(sessions).set_alignment(CellAlignment::Right),
            Cell::new(format_duration(secs)).set_alignment(CellAlignment::Right),
            Cell::new(format_percent(share)).set_alignment(CellAlignment::Right),
        ]);
    }

    Ok(format!(
        "{table}\nTotal: {} ({})",
        format_duration(maps.grand_total),
        format_hours(maps.grand_total, f64::MAX)
    ))
}

pub fn format_filters(criteria: &[FilterCriterion]) -> String {
    if criteria.is_empty() {
        return "No filters available.".to_string();
    }

    let mut table = Table::new();
    header(&mut table, &["Filter", "Play Time", "Narrows Further"]);
    for criterion in criteria {
        table.add_row(vec![
            Cell::new(&criterion.display_name),
            Cell::new(format_hours(criterion.matched_play_secs, 9999.0))
                .set_alignment(CellAlignment::Right),
            Cell::new(if criterion.is_terminal() { "no" } else { "yes" }),
        ]);
    }
    table.to_string()
}
