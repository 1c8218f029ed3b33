//! Integration tests for the `brain_guard` tool JSON surface

use approx::assert_relative_eq;
use brain_guard::embeddings::EmbeddingAdapter;
use brain_guard::patterns::PatternEngine;
use brain_guard::storage::{NewPattern, PatternKind, StoreBackend};
use brain_guard::testing::{CallCounter, KeywordEmbedder, UnconfiguredEmbedder};
use brain_guard::tool::{handle_tool, ToolContext};
use serde_json::{json, Value};

fn engine_with(embedder: KeywordEmbedder) -> PatternEngine {
    PatternEngine::new(
        StoreBackend::Transient(Default::default()),
        EmbeddingAdapter::new(Box::new(embedder)),
    )
}

fn call(engine: &mut PatternEngine, args: Value) -> Value {
    handle_tool(engine, &args, &ToolContext::default())
}

#[test]
fn test_search_by_days_summarizes_every_kind() {
    let mut engine = engine_with(KeywordEmbedder::new());
    for (kind, message) in [
        (PatternKind::Delegation, "fais-le pour moi"),
        (PatternKind::Delegation, "écris le code"),
        (PatternKind::NoReflection, "donne la réponse"),
        (PatternKind::Vocabulary, "c'est quoi une API"),
    ] {
        engine.append(NewPattern::new(kind, message)).unwrap();
    }

    let result = call(&mut engine, json!({"action": "search", "days": 30}));

    assert_eq!(result["success"], true);
    assert_eq!(
        result["summary"],
        json!({"total": 4, "byType": {"delegation": 2, "no_reflection": 1, "vocabulary": 1}})
    );
    let results = result["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r["matchType"] == "exact"));
}

#[test]
fn test_query_without_provider_returns_empty() {
    let mut engine = PatternEngine::new(
        StoreBackend::Transient(Default::default()),
        EmbeddingAdapter::new(Box::new(UnconfiguredEmbedder::new())),
    );
    engine
        .append(NewPattern::new(PatternKind::Delegation, "fais-le pour moi"))
        .unwrap();

    let result = call(&mut engine, json!({"action": "search", "query": "fais le travail"}));

    assert_eq!(result["success"], true);
    assert_eq!(result["results"], json!([]));
    assert_eq!(result["summary"], json!({"total": 0, "byType": {}}));
}

#[test]
fn test_search_without_filters_is_an_input_error() {
    let mut engine = engine_with(KeywordEmbedder::new());
    let result = call(&mut engine, json!({"action": "search"}));
    assert_eq!(result["success"], false);
    assert_eq!(
        result["error"],
        "search requires at least one of query, type, or days"
    );
}

#[test]
fn test_record_echoes_kind_history_and_similar() {
    let mut engine = engine_with(KeywordEmbedder::new());
    let first = call(
        &mut engine,
        json!({"action": "record", "pattern": "delegation", "message": "fais-le pour moi"}),
    );
    assert_eq!(first["similar"], json!([]));
    assert_eq!(first["byType"]["count"], 1);

    let second = call(
        &mut engine,
        json!({
            "action": "record",
            "pattern": "delegation",
            "message": "fais-le pour moi",
            "messageId": "msg-2",
            "previousMessages": [{"id": "msg-1", "text": "ça ne marche pas"}]
        }),
    );

    assert_eq!(second["success"], true);
    assert_eq!(second["recorded"]["pattern"], "delegation");
    assert_eq!(second["byType"]["count"], 2);
    assert_eq!(second["byType"]["entries"].as_array().unwrap().len(), 2);

    let similar = second["similar"].as_array().unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0]["message"], "fais-le pour moi");
    assert_relative_eq!(similar[0]["similarity"].as_f64().unwrap(), 1.0, epsilon = 1e-5);

    let stored = engine.load_all().unwrap();
    assert_eq!(stored[1].previous_messages.as_ref().unwrap()[0].id, "msg-1");
}

#[test]
fn test_provider_probed_once_across_calls() {
    let counter = CallCounter::default();
    let mut engine = engine_with(KeywordEmbedder::with_counter(counter.clone()));

    for _ in 0..3 {
        call(
            &mut engine,
            json!({"action": "record", "pattern": "clarity", "message": "euh le truc"}),
        );
    }

    // One probe plus one embedding per record
    assert_eq!(counter.get(), 4);
}
