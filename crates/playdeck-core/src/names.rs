//! Display helpers: ROM name cleaning, console tags, durations

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// `(USA)`, `[!]`, `(Rev 1)` and similar dump tags
fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"\s*(\([^)]*\)|\[[^\]]*\])").unwrap())
}

fn console_tag_regex() -> &'static Regex {
    static CONSOLE_TAG_RE: OnceLock<Regex> = OnceLock::new();
    CONSOLE_TAG_RE.get_or_init(|| Regex::new(r"\(([^()]+)\)\s*$").unwrap())
}

/// File name without extension or dump tags: `Tetris (World) (Rev 1).gb` → `Tetris`.
pub fn clean_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    strip_tags(&stem)
}

/// Display name without dump tags; a name that is nothing but tags is kept.
pub fn strip_tags(name: &str) -> String {
    let cleaned = tag_regex().replace_all(name, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        name.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

/// Tag of a console folder: `Game Boy Advance (GBA)` → `GBA`.
pub fn console_tag(console: &str) -> Option<&str> {
    console_tag_regex()
        .captures(console)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Console tag in parentheses, or the whole console name when it has none.
pub fn console_label(console: &str) -> String {
    match console_tag(console) {
        Some(tag) => format!("({tag})"),
        None => format!("({console})"),
    }
}

/// `5400` → `1h 30m`, `75` → `1m 15s`.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Hours with one decimal, capped for narrow list rows: `5400` → `1.5H`.
pub fn format_hours(secs: i64, cap: f64) -> String {
    format!("{:.1}H", (secs as f64 / 3600.0).min(cap))
}

/// `50.0` → `50.00%`; `None` (zero denominator) → `-`.
pub fn format_percent(pct: Option<f64>) -> String {
    match pct {
        Some(pct) => format!("{pct:.2}%"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("Tetris (World) (Rev 1).gb"), "Tetris");
        assert_eq!(clean_name("Sonic [!].md"), "Sonic");
        assert_eq!(clean_name("Metroid Fusion.gba"), "Metroid Fusion");
        assert_eq!(clean_name("(Prototype).gb"), "(Prototype)");
        assert_eq!(strip_tags("Dr. Mario (USA)"), "Dr. Mario");
    }

    #[test]
    fn test_console_tag() {
        assert_eq!(console_tag("Game Boy Advance (GBA)"), Some("GBA"));
        assert_eq!(console_tag("Ports"), None);
        assert_eq!(console_label("Ports"), "(Ports)");
        assert_eq!(console_label("Sega Genesis (MD)"), "(MD)");
    }

    #[test]
    fn test_durations() {
        assert_eq!(format_duration(5400), "1h 30m");
        assert_eq!(format_duration(75), "1m 15s");
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_hours(5400, 999.0), "1.5H");
        assert_eq!(format_hours(36_000_000, 999.0), "999.0H");
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_percent(Some(50.0)), "50.00%");
        assert_eq!(format_percent(None), "-");
    }
}
