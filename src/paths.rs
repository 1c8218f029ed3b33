//! Where brain-guard keeps its files
//!
//! Path resolution only; callers create directories and files as needed.
//!
//! ```text
//! ~/clawd/brain-guard/         # or $BRAIN_GUARD_HOME
//! ├── config.toml              # Plugin config
//! └── patterns.jsonl           # Append-only pattern log (one record per line)
//! ```

use std::path::PathBuf;

/// Environment variable overriding the home directory
pub const ENV_HOME: &str = "BRAIN_GUARD_HOME";

/// Brain-guard home directory: `$BRAIN_GUARD_HOME` or `~/clawd/brain-guard/`
pub fn brain_guard_home() -> PathBuf {
    if let Ok(raw) = std::env::var(ENV_HOME) {
        if !raw.trim().is_empty() {
            return expand(&raw);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clawd")
        .join("brain-guard")
}

/// Config file: `<home>/config.toml`
pub fn config_path() -> PathBuf {
    brain_guard_home().join("config.toml")
}

/// Default pattern log: `<home>/patterns.jsonl`
pub fn pattern_log_path() -> PathBuf {
    brain_guard_home().join("patterns.jsonl")
}

/// Expand `~` and `$VARS` in a user-supplied path
pub fn expand(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        let expanded = expand("~/clawd");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("clawd"));
    }

    #[test]
    fn test_expand_plain_path_unchanged() {
        assert_eq!(expand("/tmp/brain"), PathBuf::from("/tmp/brain"));
    }

    #[test]
    fn test_layout_is_under_home() {
        let home = brain_guard_home();
        assert_eq!(config_path().parent(), Some(home.as_path()));
        assert_eq!(pattern_log_path().parent(), Some(home.as_path()));
    }
}
