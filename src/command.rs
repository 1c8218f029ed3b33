//! `/brain` command - human-readable stats for the last N days

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::patterns::{compute_history, PatternEngine, DEFAULT_HISTORY_DAYS};
use crate::storage::{truncate_chars, PatternKind};

const RECENT_SHOWN: usize = 5;
const PREVIEW_CHARS: usize = 40;

/// Parse the optional day argument. Anything unusable falls back to 7.
pub fn parse_days(args: Option<&str>) -> u32 {
    args.map(str::trim)
        .and_then(|a| a.parse::<u32>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_HISTORY_DAYS)
}

pub fn handle_brain_command(engine: &PatternEngine, args: Option<&str>) -> Result<String> {
    handle_brain_command_at(engine, args, Utc::now())
}

pub fn handle_brain_command_at(
    engine: &PatternEngine,
    args: Option<&str>,
    now: DateTime<Utc>,
) -> Result<String> {
    let days = parse_days(args);
    let records = engine.load_all()?;
    let history = compute_history(&records, None, days, now);

    let header = format!("🧠 BrainGuard - last {} days", days);
    if history.entries.is_empty() {
        return Ok(format!("{}\n\nNo pattern detected. 🎉", header));
    }

    // Kinds in first-seen order (most recent first)
    let mut counts: Vec<(PatternKind, usize)> = Vec::new();
    for entry in &history.entries {
        match counts.iter_mut().find(|(kind, _)| *kind == entry.pattern) {
            Some((_, count)) => *count += 1,
            None => counts.push((entry.pattern, 1)),
        }
    }

    let mut lines = vec![format!("{}\n", header)];
    for (kind, count) in counts {
        let trend = compute_history(&records, Some(kind), days, now).summary.trend;
        lines.push(format!("{}: {} {} {}", kind, count, trend.arrow(), trend.as_str()));
    }

    lines.push("\nRecent patterns:".to_string());
    for entry in history.entries.iter().take(RECENT_SHOWN) {
        lines.push(format!(
            "• {} - {} - \"{}...\"",
            time_ago(entry.date, now),
            entry.pattern,
            truncate_chars(&entry.message, PREVIEW_CHARS)
        ));
    }

    Ok(lines.join("\n"))
}

/// Coarse relative time: minutes, then hours, then days
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", elapsed.num_days())
}
