//! Integration tests for the durable pattern log through the engine

use anyhow::Result;
use brain_guard::embeddings::EmbeddingAdapter;
use brain_guard::patterns::{PatternEngine, SearchQuery, Trend};
use brain_guard::storage::{
    NewPattern, PatternKind, PreviousMessage, StoreConfig, MAX_CONTEXT_CHARS, MAX_MESSAGE_CHARS,
};
use brain_guard::testing::{KeywordEmbedder, UnconfiguredEmbedder};
use chrono::{Duration, Utc};
use std::fs;
use std::io::Write;
use tempfile::TempDir;

fn durable(temp: &TempDir) -> StoreConfig {
    StoreConfig::Durable {
        path: temp.path().join("data").join("patterns.jsonl"),
    }
}

fn keyword_engine(temp: &TempDir) -> Result<PatternEngine> {
    PatternEngine::open(
        &durable(temp),
        EmbeddingAdapter::new(Box::new(KeywordEmbedder::new())),
    )
}

#[test]
fn test_previous_messages_round_trip_through_disk() -> Result<()> {
    let temp = TempDir::new()?;
    let mut engine = keyword_engine(&temp)?;

    let previous = vec![PreviousMessage {
        id: "msg-41".to_string(),
        text: "je n'arrive pas à lancer le serveur".to_string(),
    }];
    let outcome = engine.append(
        NewPattern::new(PatternKind::Delegation, "fais-le pour moi")
            .message_id("msg-42")
            .previous_messages(previous.clone()),
    )?;

    // Fresh engine over the same file
    let reopened = keyword_engine(&temp)?;
    let records = reopened.load_all()?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, outcome.record.id);
    assert_eq!(records[0].message_id.as_deref(), Some("msg-42"));
    assert_eq!(records[0].previous_messages.as_ref(), Some(&previous));
    Ok(())
}

#[test]
fn test_truncation_is_exact() -> Result<()> {
    let temp = TempDir::new()?;
    let mut engine = keyword_engine(&temp)?;

    let message = "é".repeat(MAX_MESSAGE_CHARS + 250);
    let context = "ctx ".repeat(MAX_CONTEXT_CHARS);
    engine.append(NewPattern::new(PatternKind::Clarity, message.clone()).context(context.clone()))?;

    let stored = &engine.load_all()?[0];
    assert_eq!(stored.message, message.chars().take(MAX_MESSAGE_CHARS).collect::<String>());
    assert_eq!(
        stored.context.as_deref(),
        Some(context.chars().take(MAX_CONTEXT_CHARS).collect::<String>().as_str())
    );
    Ok(())
}

#[test]
fn test_corrupt_lines_are_skipped() -> Result<()> {
    let temp = TempDir::new()?;
    let mut engine = keyword_engine(&temp)?;
    engine.append(NewPattern::new(PatternKind::Vocabulary, "c'est quoi une API"))?;

    let StoreConfig::Durable { path } = durable(&temp) else {
        unreachable!()
    };
    let mut file = fs::OpenOptions::new().append(true).open(&path)?;
    writeln!(file, "{{\"id\": \"half a record")?;
    file.write_all(b"{\"id\":\"x\xff\xfe\n")?;
    drop(file);

    engine.append(NewPattern::new(PatternKind::Vocabulary, "c'est quoi un thread"))?;

    let records = engine.load_all()?;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.kind == PatternKind::Vocabulary));
    Ok(())
}

#[test]
fn test_history_trend_over_disk_log() -> Result<()> {
    let temp = TempDir::new()?;
    let mut engine = PatternEngine::open(
        &durable(&temp),
        EmbeddingAdapter::new(Box::new(UnconfiguredEmbedder::new())),
    )?;
    let now = Utc::now();

    // One in the preceding week, three in the current one
    engine.append_at(
        NewPattern::new(PatternKind::Delegation, "older"),
        now - Duration::days(10),
    )?;
    for hours in [1, 20, 50] {
        engine.append_at(
            NewPattern::new(PatternKind::Delegation, format!("recent {}", hours)),
            now - Duration::hours(hours),
        )?;
    }

    let history = engine.get_history_at(Some(PatternKind::Delegation), 7, now)?;
    assert_eq!(history.summary.count, 3);
    assert_eq!(history.summary.trend, Trend::Up);
    assert!(history
        .entries
        .windows(2)
        .all(|pair| pair[0].date >= pair[1].date));
    assert_eq!(history.entries[0].message, "recent 1");
    Ok(())
}

#[test]
fn test_semantic_search_ranks_matching_kind_first() -> Result<()> {
    let temp = TempDir::new()?;
    let mut engine = keyword_engine(&temp)?;
    engine.append(NewPattern::new(PatternKind::Delegation, "fais-le pour moi"))?;
    engine.append(NewPattern::new(PatternKind::Vocabulary, "c'est quoi une API"))?;

    let response = engine.search(&SearchQuery::text("fais-le pour moi"))?;
    assert_eq!(response.results[0].pattern, PatternKind::Delegation);
    assert!(response
        .results
        .iter()
        .all(|r| r.similarity.is_some_and(|s| s > 0.5)));
    assert_eq!(response.summary.total, 2);
    Ok(())
}
