//! Embeddings module - text to vector, best effort
//!
//! The provider is remote and may be missing, misconfigured, or down. Callers
//! never see that as an error: [`EmbeddingAdapter::embed`] returns `None` and
//! the record or search carries on without a vector.

mod openai;
mod similarity;

pub use openai::OpenAiEmbedder;
pub use similarity::cosine_similarity;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::EmbeddingsConfig;

/// Text used for the one-time liveness probe
const PROBE_TEXT: &str = "brain-guard availability probe";

/// Trait for embedding backends
///
/// Requires Send so an engine can move into the host bridge thread.
pub trait EmbeddingProvider: Send {
    /// Whether credentials/config are present. No network.
    fn is_configured(&self) -> bool;

    /// Generate embedding for a single text
    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Cached result of the availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    NotYetChecked,
    Available,
    Unavailable,
}

/// Provider wrapper that probes once and absorbs every failure
pub struct EmbeddingAdapter {
    provider: Box<dyn EmbeddingProvider>,
    availability: Availability,
}

impl EmbeddingAdapter {
    pub fn new(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            availability: Availability::NotYetChecked,
        }
    }

    /// Adapter over the configured remote provider
    pub fn from_config(config: &EmbeddingsConfig) -> Result<Self> {
        Ok(Self::new(Box::new(OpenAiEmbedder::from_config(config)?)))
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Decide availability if not yet decided, then return the cached answer
    ///
    /// Unconfigured providers are marked unavailable without a network call.
    pub fn probe(&mut self) -> Availability {
        if self.availability != Availability::NotYetChecked {
            return self.availability;
        }

        self.availability = if !self.provider.is_configured() {
            info!(
                model = self.provider.model_name(),
                "Embedding provider not configured, semantic search disabled"
            );
            Availability::Unavailable
        } else {
            match self.provider.embed(PROBE_TEXT) {
                Ok(vector) if !vector.is_empty() => {
                    info!(
                        model = self.provider.model_name(),
                        dimension = vector.len(),
                        "Embedding provider available"
                    );
                    Availability::Available
                }
                Ok(_) => {
                    warn!("Embedding probe returned an empty vector, semantic search disabled");
                    Availability::Unavailable
                }
                Err(e) => {
                    warn!(error = %e, "Embedding probe failed, semantic search disabled");
                    Availability::Unavailable
                }
            }
        };

        self.availability
    }

    /// Embed text, or `None` when the provider is unavailable or this call fails
    pub fn embed(&mut self, text: &str) -> Option<Vec<f32>> {
        if self.probe() != Availability::Available {
            return None;
        }

        match self.provider.embed(text) {
            Ok(vector) if !vector.is_empty() => {
                debug!(dimension = vector.len(), "Generated embedding");
                Some(vector)
            }
            Ok(_) => {
                warn!("Embedding provider returned an empty vector");
                None
            }
            Err(e) => {
                warn!(error = %e, "Embedding call failed, continuing without vector");
                None
            }
        }
    }
}
