//! Pattern engine - the record/recall core
//!
//! Owns the active store and the embedding adapter. Every read loads the whole
//! store; that is fine for one person's history and keeps the log the only
//! source of truth.
//!
//! Entry points:
//! - [`PatternEngine::append`] - the single write path
//! - [`PatternEngine::find_similar`] - cosine ranking with exclusion and limit
//! - [`PatternEngine::get_history`] - windowed entries plus trend
//! - [`PatternEngine::search`] - filters, semantic ranking, summary

mod history;
mod search;
mod similar;

pub use history::{
    classify_trend, compute_history, HistoryEntry, HistoryResult, HistorySummary, Trend,
    DEFAULT_HISTORY_DAYS,
};
pub use search::{
    summarize, MatchType, SearchQuery, SearchResponse, SearchResult, SearchSummary,
    DEFAULT_SEARCH_DAYS,
};
pub use similar::{
    find_similar, rank_by_similarity, SimilarRecord, DEFAULT_SIMILAR_LIMIT, SIMILARITY_THRESHOLD,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::embeddings::{Availability, EmbeddingAdapter};
use crate::error::GuardError;
use crate::storage::{NewPattern, PatternKind, PatternRecord, StoreBackend, StoreConfig};

/// What `append` hands back
#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    pub record: PatternRecord,
    /// Earlier records close to this one (empty without an embedding)
    pub similar: Vec<SimilarRecord>,
}

impl AppendOutcome {
    pub fn id(&self) -> &str {
        &self.record.id
    }
}

pub struct PatternEngine {
    store: StoreBackend,
    embeddings: EmbeddingAdapter,
}

impl PatternEngine {
    pub fn new(store: StoreBackend, embeddings: EmbeddingAdapter) -> Self {
        Self { store, embeddings }
    }

    /// Engine over the configured store and remote embedder
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = StoreBackend::open(&config.store_config())?;
        let embeddings = EmbeddingAdapter::from_config(&config.embeddings)?;
        info!(
            backend = store.backend_name(),
            model = embeddings.model_name(),
            "Pattern engine ready"
        );
        Ok(Self::new(store, embeddings))
    }

    pub fn open(store_config: &StoreConfig, embeddings: EmbeddingAdapter) -> Result<Self> {
        Ok(Self::new(StoreBackend::open(store_config)?, embeddings))
    }

    /// Swap to a different store. The previous transient state is discarded.
    pub fn reinitialize(&mut self, store_config: &StoreConfig) -> Result<()> {
        let next = StoreBackend::open(store_config)?;
        self.store.close();
        info!(
            from = self.store.backend_name(),
            to = next.backend_name(),
            "Reinitialized pattern store"
        );
        self.store = next;
        Ok(())
    }

    /// Release the store (host shutdown)
    pub fn close(&mut self) {
        debug!(backend = self.store.backend_name(), "Closing pattern store");
        self.store.close();
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn embedding_availability(&self) -> Availability {
        self.embeddings.availability()
    }

    pub fn append(&mut self, input: NewPattern) -> Result<AppendOutcome> {
        self.append_at(input, Utc::now())
    }

    /// Record one pattern stamped `now`
    pub fn append_at(&mut self, input: NewPattern, now: DateTime<Utc>) -> Result<AppendOutcome> {
        if input.message.trim().is_empty() {
            return Err(GuardError::invalid("message is required for record action").into());
        }

        let existing = self.store.load_all()?;
        let mut record = PatternRecord::build(input, now, None);

        let embedding = self.embeddings.embed(&record.message);
        let similar = match &embedding {
            Some(vector) => {
                check_dimension(&existing, vector.len())?;
                find_similar(existing, vector, Some(record.id.as_str()), DEFAULT_SIMILAR_LIMIT)
            }
            None => Vec::new(),
        };
        record.embedding = embedding;

        self.store.append(record.clone())?;
        debug!(
            id = %record.id,
            pattern = %record.kind,
            embedded = record.embedding.is_some(),
            similar = similar.len(),
            "Recorded pattern"
        );

        Ok(AppendOutcome { record, similar })
    }

    pub fn load_all(&self) -> Result<Vec<PatternRecord>> {
        self.store.load_all()
    }

    /// Stored records most similar to `query`, best first
    pub fn find_similar(
        &self,
        query: &[f32],
        exclude_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SimilarRecord>> {
        Ok(find_similar(self.store.load_all()?, query, exclude_id, limit))
    }

    pub fn get_history(&self, kind: Option<PatternKind>, days: u32) -> Result<HistoryResult> {
        self.get_history_at(kind, days, Utc::now())
    }

    pub fn get_history_at(
        &self,
        kind: Option<PatternKind>,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<HistoryResult> {
        Ok(compute_history(&self.store.load_all()?, kind, days, now))
    }

    pub fn search(&mut self, query: &SearchQuery) -> Result<SearchResponse> {
        self.search_at(query, Utc::now())
    }

    pub fn search_at(&mut self, query: &SearchQuery, now: DateTime<Utc>) -> Result<SearchResponse> {
        query.validate()?;

        let records = self.store.load_all()?;
        let filtered: Vec<PatternRecord> =
            history::in_window(&records, query.kind, query.window_days(), now)
                .cloned()
                .collect();

        let Some(text) = query.query_text() else {
            return Ok(SearchResponse {
                summary: summarize(&filtered),
                results: filtered.into_iter().map(SearchResult::exact).collect(),
            });
        };

        let Some(vector) = self.embeddings.embed(text) else {
            debug!("Semantic search requested but embeddings unavailable");
            return Ok(SearchResponse::default());
        };
        check_dimension(&records, vector.len())?;

        let summary = summarize(&filtered);
        let results = rank_by_similarity(filtered, &vector, None)
            .into_iter()
            .map(SearchResult::semantic)
            .collect();

        Ok(SearchResponse { results, summary })
    }
}

/// Fail if `actual` disagrees with the first embedded record's dimension
fn check_dimension(records: &[PatternRecord], actual: usize) -> Result<(), GuardError> {
    let established = records
        .iter()
        .find_map(|r| r.embedding.as_ref().map(Vec::len));
    match established {
        Some(expected) if expected != actual => {
            Err(GuardError::DimensionMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}
