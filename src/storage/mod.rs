//! Storage layer for brain-guard - append-only pattern records
//!
//! Two backends behind one enum:
//! - [`DurableStore`]: JSONL log on disk, parse-all on read
//! - [`TransientStore`]: plain `Vec`, gone on drop (tests, dry runs)
//!
//! The only write path is `append`. There is no update and no delete.
//!
//! # Example
//!
//! ```no_run
//! use brain_guard::storage::{StoreBackend, StoreConfig};
//!
//! let store = StoreBackend::open(&StoreConfig::Transient)?;
//! assert!(store.load_all()?.is_empty());
//! # Ok::<(), anyhow::Error>(())
//! ```

mod durable;
mod transient;
pub mod types;

pub use durable::DurableStore;
pub use transient::TransientStore;
pub use types::{
    truncate_chars, NewPattern, PatternKind, PatternRecord, PreviousMessage, MAX_CONTEXT_CHARS,
    MAX_MESSAGE_CHARS,
};

use anyhow::Result;
use std::path::PathBuf;

/// Which backend to open. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Durable { path: PathBuf },
    Transient,
}

/// Pattern store backend, enum dispatch over the two implementations
#[derive(Debug)]
pub enum StoreBackend {
    Durable(DurableStore),
    Transient(TransientStore),
}

impl StoreBackend {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(match config {
            StoreConfig::Durable { path } => Self::Durable(DurableStore::open(path)?),
            StoreConfig::Transient => Self::Transient(TransientStore::new()),
        })
    }

    /// Persist one fully-built record
    pub fn append(&mut self, record: PatternRecord) -> Result<()> {
        match self {
            Self::Durable(store) => store.append(&record),
            Self::Transient(store) => {
                store.append(record);
                Ok(())
            }
        }
    }

    /// All records in insertion order
    pub fn load_all(&self) -> Result<Vec<PatternRecord>> {
        match self {
            Self::Durable(store) => store.load_all(),
            Self::Transient(store) => Ok(store.load_all()),
        }
    }

    /// Release resources. Transient contents are dropped; the durable log stays.
    pub fn close(&mut self) {
        if let Self::Transient(store) = self {
            store.clear();
        }
    }

    /// Get backend name for debugging/logging
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Durable(_) => "durable",
            Self::Transient(_) => "transient",
        }
    }
}
