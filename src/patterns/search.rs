//! Search request/response types and the pure parts of search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::similar::SimilarRecord;
use crate::error::GuardError;
use crate::storage::{PatternKind, PatternRecord, PreviousMessage};

pub const DEFAULT_SEARCH_DAYS: u32 = 30;

/// Search filters. At least one must be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub kind: Option<PatternKind>,
    pub days: Option<u32>,
}

impl SearchQuery {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn kind(kind: PatternKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn days(days: u32) -> Self {
        Self {
            days: Some(days),
            ..Self::default()
        }
    }

    /// Query text, treating blank as absent
    pub fn query_text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn window_days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_SEARCH_DAYS)
    }

    /// Reject the unbounded "everything" search
    pub fn validate(&self) -> Result<(), GuardError> {
        if self.query_text().is_none() && self.kind.is_none() && self.days.is_none() {
            return Err(GuardError::invalid(
                "search requires at least one of query, type, or days",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Semantic,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub date: DateTime<Utc>,
    pub pattern: PatternKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    pub match_type: MatchType,
    pub message_id: Option<String>,
    pub previous_messages: Option<Vec<PreviousMessage>>,
    pub context: Option<String>,
}

impl SearchResult {
    fn from_record(record: PatternRecord, match_type: MatchType, similarity: Option<f32>) -> Self {
        Self {
            date: record.timestamp,
            pattern: record.kind,
            message: record.message,
            similarity,
            match_type,
            message_id: record.message_id,
            previous_messages: record.previous_messages,
            context: record.context,
        }
    }

    pub fn exact(record: PatternRecord) -> Self {
        Self::from_record(record, MatchType::Exact, None)
    }

    pub fn semantic(similar: SimilarRecord) -> Self {
        Self::from_record(similar.record, MatchType::Semantic, Some(similar.similarity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub total: usize,
    pub by_type: BTreeMap<PatternKind, usize>,
}

/// Total and per-kind counts
pub fn summarize(records: &[PatternRecord]) -> SearchSummary {
    let mut by_type = BTreeMap::new();
    for record in records {
        *by_type.entry(record.kind).or_insert(0) += 1;
    }
    SearchSummary {
        total: records.len(),
        by_type,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub summary: SearchSummary,
}
