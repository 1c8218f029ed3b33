//! Cosine ranking over stored embeddings

use std::cmp::Ordering;

use crate::embeddings::cosine_similarity;
use crate::storage::PatternRecord;

/// Results at or below this similarity are noise
pub const SIMILARITY_THRESHOLD: f32 = 0.5;

/// Default cap for `find_similar`
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// A stored record paired with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarRecord {
    pub record: PatternRecord,
    pub similarity: f32,
}

/// Every embedded record (except `exclude_id`) scoring above the threshold,
/// best first. Equal scores keep store order.
pub fn rank_by_similarity<I>(records: I, query: &[f32], exclude_id: Option<&str>) -> Vec<SimilarRecord>
where
    I: IntoIterator<Item = PatternRecord>,
{
    let mut ranked: Vec<SimilarRecord> = records
        .into_iter()
        .filter(|r| exclude_id != Some(r.id.as_str()))
        .filter_map(|record| {
            let similarity = cosine_similarity(record.embedding.as_deref()?, query);
            (similarity > SIMILARITY_THRESHOLD).then_some(SimilarRecord { record, similarity })
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// Top `limit` of [`rank_by_similarity`]
pub fn find_similar<I>(
    records: I,
    query: &[f32],
    exclude_id: Option<&str>,
    limit: usize,
) -> Vec<SimilarRecord>
where
    I: IntoIterator<Item = PatternRecord>,
{
    let mut ranked = rank_by_similarity(records, query, exclude_id);
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NewPattern, PatternKind};
    use chrono::Utc;

    fn embedded(message: &str, embedding: Vec<f32>) -> PatternRecord {
        PatternRecord::build(
            NewPattern::new(PatternKind::Delegation, message),
            Utc::now(),
            Some(embedding),
        )
    }

    fn plain(message: &str) -> PatternRecord {
        PatternRecord::build(NewPattern::new(PatternKind::Delegation, message), Utc::now(), None)
    }

    #[test]
    fn test_empty_input() {
        assert!(find_similar(Vec::new(), &[0.5, 0.5, 0.5, 0.5], None, 5).is_empty());
    }

    #[test]
    fn test_records_without_embedding_are_ignored() {
        let records = vec![plain("a"), plain("b")];
        assert!(find_similar(records, &[1.0, 0.0], None, 5).is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        // cos = 1 / (1 * 2) = 0.5 exactly
        let half = embedded("half", vec![1.0, 1.0, 1.0, 1.0]);
        let close = embedded("close", vec![1.0, 0.1, 0.0, 0.0]);
        let results = find_similar(vec![half, close.clone()], &[1.0, 0.0, 0.0, 0.0], None, 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record, close);
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let a = embedded("a", vec![1.0, 1.0]);
        let best = embedded("best", vec![1.0, 0.0]);
        let b = embedded("b", vec![1.0, 1.0]);
        let results = find_similar(vec![a, best, b], &[1.0, 0.0], None, 5);

        let messages: Vec<&str> = results.iter().map(|s| s.record.message.as_str()).collect();
        assert_eq!(messages, vec!["best", "a", "b"]);
        assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_exclude_and_limit() {
        let records: Vec<PatternRecord> = (0..10)
            .map(|i| embedded(&format!("fais le numéro {}", i), vec![0.9, 0.1, 0.1, 0.1]))
            .collect();
        let excluded = records[0].id.clone();

        let results = find_similar(records, &[0.9, 0.1, 0.1, 0.1], Some(&excluded), 3);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|s| s.record.id != excluded));
        assert!(results.iter().all(|s| s.similarity > SIMILARITY_THRESHOLD));
    }

    #[test]
    fn test_mismatched_dimension_scores_zero() {
        let records = vec![embedded("wide", vec![1.0, 0.0, 0.0])];
        assert!(find_similar(records, &[1.0, 0.0], None, 5).is_empty());
    }
}
