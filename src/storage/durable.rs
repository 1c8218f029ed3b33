//! Durable pattern log: one JSON record per line, append-only
//!
//! Reads parse the whole file. A line that fails to parse is skipped with a
//! warning so one torn write cannot hide the rest of the history.

use anyhow::{Context, Result};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::PatternRecord;

#[derive(Debug)]
pub struct DurableStore {
    path: PathBuf,
}

impl DurableStore {
    /// Open (or prepare) the log at `path`, creating parent directories eagerly
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory: {}", parent.display())
                })?;
            }
        }
        debug!(path = %path.display(), "Opened durable pattern log");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line
    pub fn append(&mut self, record: &PatternRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).context("Failed to serialize record")?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open pattern log: {}", self.path.display()))?;

        // Single write call so readers never see half a record
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to append to pattern log: {}", self.path.display()))?;
        Ok(())
    }

    /// All parseable records in file order
    pub fn load_all(&self) -> Result<Vec<PatternRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open pattern log: {}", self.path.display()))?;

        // Raw bytes per line: bad UTF-8 is a malformed record, not an I/O failure
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line
                .with_context(|| format!("Failed to read pattern log: {}", self.path.display()))?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<PatternRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(line = idx + 1, error = %e, "Skipping malformed pattern record");
                }
            }
        }

        Ok(records)
    }
}
