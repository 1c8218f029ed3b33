//! Deterministic embedding providers for tests and offline runs
//!
//! `KeywordEmbedder` maps text onto four keyword buckets (delegation,
//! reflection, vocabulary, clarity) so related messages land close together
//! without a network round-trip.

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::embeddings::EmbeddingProvider;

const DELEGATION: &[&str] = &[
    "fais", "faire", "place", "moi", "écris", "génère", "do", "write", "generate",
];
const REFLECTION: &[&str] = &[
    "pourquoi", "comment", "pense", "réfléchir", "comprendre", "why", "how", "think",
    "understand",
];
const VOCABULARY: &[&str] = &[
    "quoi", "définition", "signifie", "veut", "dire", "what", "definition", "mean",
];
const CLARITY: &[&str] = &[
    "truc", "machin", "chose", "bidule", "euh", "thing", "stuff", "um",
];

/// Shared count of provider calls
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Four-dimension vector from keyword presence (0.9 hit, 0.1 miss)
pub fn keyword_embedding(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let score = |bucket: &[&str]| {
        if words.iter().any(|w| bucket.contains(w)) {
            0.9
        } else {
            0.1
        }
    };

    vec![
        score(DELEGATION),
        score(REFLECTION),
        score(VOCABULARY),
        score(CLARITY),
    ]
}

/// Always-configured provider returning [`keyword_embedding`]
#[derive(Debug, Default)]
pub struct KeywordEmbedder {
    counter: CallCounter,
    fail_on: Option<String>,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(counter: CallCounter) -> Self {
        Self {
            counter,
            fail_on: None,
        }
    }

    /// Errors whenever asked to embed exactly `text`
    pub fn failing_on(text: &str) -> Self {
        Self {
            counter: CallCounter::default(),
            fail_on: Some(text.to_string()),
        }
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn is_configured(&self) -> bool {
        true
    }

    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        self.counter.bump();
        if self.fail_on.as_deref() == Some(text) {
            bail!("simulated provider failure");
        }
        Ok(keyword_embedding(text))
    }

    fn model_name(&self) -> &str {
        "keyword-4d"
    }
}

/// Configured provider whose every call fails (network down, bad key, quota)
#[derive(Debug, Default)]
pub struct FailingEmbedder {
    counter: CallCounter,
}

impl FailingEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(counter: CallCounter) -> Self {
        Self { counter }
    }
}

impl EmbeddingProvider for FailingEmbedder {
    fn is_configured(&self) -> bool {
        true
    }

    fn embed(&mut self, _text: &str) -> Result<Vec<f32>> {
        self.counter.bump();
        bail!("401 Unauthorized")
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Provider with no credentials
#[derive(Debug, Default)]
pub struct UnconfiguredEmbedder {
    counter: CallCounter,
}

impl UnconfiguredEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(counter: CallCounter) -> Self {
        Self { counter }
    }
}

impl EmbeddingProvider for UnconfiguredEmbedder {
    fn is_configured(&self) -> bool {
        false
    }

    fn embed(&mut self, _text: &str) -> Result<Vec<f32>> {
        self.counter.bump();
        bail!("No API key configured for embeddings")
    }

    fn model_name(&self) -> &str {
        "unconfigured"
    }
}

/// Provider that panics mid-call, for exercising the bridge's panic guard
#[derive(Debug, Default)]
pub struct PanickingEmbedder;

impl EmbeddingProvider for PanickingEmbedder {
    fn is_configured(&self) -> bool {
        true
    }

    fn embed(&mut self, _text: &str) -> Result<Vec<f32>> {
        panic!("embedding provider blew up")
    }

    fn model_name(&self) -> &str {
        "panicking"
    }
}
