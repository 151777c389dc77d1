// Matching engine: term extraction, pluggable similarity, ranking, evaluation.
// Everything here is synchronous and pure except top_matches (store access) and handlers.

pub mod extractor;
pub mod handlers;
pub mod metrics;
pub mod service;
pub mod similarity;
pub mod top_matches;

use std::sync::Arc;

use extractor::ExtractorConfig;
use similarity::{NgramTfIdfCosine, SimilarityBackend, SimilarityCalculator, TermFrequencyCosine};

/// Instantiates the configured similarity backend. Phrases for the n-gram backend are
/// normalized with the same extractor settings used for profiles.
pub fn build_calculator(
    backend: SimilarityBackend,
    extractor: &ExtractorConfig,
) -> Arc<dyn SimilarityCalculator> {
    match backend {
        SimilarityBackend::TermFrequency => Arc::new(TermFrequencyCosine),
        SimilarityBackend::NgramTfidf => Arc::new(NgramTfIdfCosine::with_default_phrases(extractor)),
    }
}
