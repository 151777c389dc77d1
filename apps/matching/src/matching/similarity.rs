//! Similarity calculators: pluggable scorers over two normalized term sequences.
//!
//! Default: `TermFrequencyCosine` (raw term counts, cosine over the union vocabulary).
//! Alternative: `NgramTfIdfCosine` (averaged unigram/bigram TF-IDF cosine with a phrase
//! dictionary), selected at startup via `SIMILARITY_BACKEND`.
//!
//! `MatchService` holds an `Arc<dyn SimilarityCalculator>`, so an embedding-based scorer can
//! be dropped in without touching the orchestrator or the handlers.
//!
//! Every backend must be pure: symmetric, in `[0.0, 1.0]`, 0.0 when either side is empty,
//! and bit-for-bit reproducible. Vectors are `BTreeMap`s so summation order is fixed.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::matching::extractor::{extract_terms, ExtractorConfig};

/// Sparse vector keyed by term (or n-gram).
pub type TermVector = BTreeMap<String, f64>;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The similarity trait. Implement this to swap scoring backends.
pub trait SimilarityCalculator: Send + Sync {
    /// Short label reported to API callers, e.g. `"term_frequency"`.
    fn backend(&self) -> &'static str;

    /// Scores two normalized term sequences. Must return a value in `[0.0, 1.0]`.
    fn similarity(&self, left: &[String], right: &[String]) -> f64;
}

/// Backend selector parsed from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBackend {
    #[default]
    TermFrequency,
    NgramTfidf,
}

impl FromStr for SimilarityBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "term_frequency" | "tf" => Ok(Self::TermFrequency),
            "ngram_tfidf" | "ngram" => Ok(Self::NgramTfidf),
            other => Err(format!(
                "unknown similarity backend '{other}' (expected term_frequency or ngram_tfidf)"
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TermFrequencyCosine (default)
// ────────────────────────────────────────────────────────────────────────────

/// Cosine similarity of raw term-frequency vectors.
#[derive(Debug, Clone, Default)]
pub struct TermFrequencyCosine;

impl SimilarityCalculator for TermFrequencyCosine {
    fn backend(&self) -> &'static str {
        "term_frequency"
    }

    fn similarity(&self, left: &[String], right: &[String]) -> f64 {
        cosine_similarity(&term_frequencies(left), &term_frequencies(right))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// NgramTfIdfCosine: phrase-aware n-gram variant
// ────────────────────────────────────────────────────────────────────────────

/// Technology phrases counted once per document when present as a contiguous term run.
pub const DEFAULT_PHRASES: &[&str] = &[
    // data science and machine learning
    "machine learning", "deep learning", "artificial intelligence", "data science",
    "data analysis", "predictive analytics", "natural language processing", "computer vision",
    "reinforcement learning", "neural networks", "big data", "data visualization",
    "data engineering", "time series forecasting", "random forest", "support vector machines",
    // software engineering
    "web development", "full stack development", "backend development", "frontend development",
    "api design", "restful services", "microservices architecture", "cloud computing",
    "agile development", "test-driven development", "continuous integration", "devops",
    "unit testing", "containerization", "docker", "kubernetes", "distributed systems",
    "version control", "git",
    // cloud
    "aws", "azure", "google cloud platform", "serverless architecture",
    "infrastructure as code", "cloud migration",
    // security
    "cybersecurity", "network security", "penetration testing", "vulnerability assessment",
    "threat intelligence", "incident response", "firewalls", "encryption", "identity management",
    // general
    "agile methodology", "project management", "scrum", "jira", "trello",
    "software design patterns", "object-oriented programming", "system design",
    "scalability", "high availability",
    // languages
    "python", "java", "c#", "javascript", "typescript", "go", "ruby", "php",
    "rust", "scala", "swift", "kotlin",
    // storage
    "sql", "nosql", "mongodb", "postgresql", "mysql", "redis", "elasticsearch",
    "data lakes", "data warehousing",
    // tooling
    "gitlab", "github", "jenkins", "circleci", "terraform", "ansible", "puppet",
];

/// Averaged n-gram TF-IDF cosine.
///
/// For each order `1..=max_n`, both sides are vectorized over the two-document corpus
/// `{left, right}` with `tf = count / total` and `idf = ln(2 / (df + 1)) + 1`, plus one
/// occurrence per dictionary phrase found in the side. Orders where neither side yields
/// any feature are skipped; the score is the mean over the remaining orders.
#[derive(Debug, Clone)]
pub struct NgramTfIdfCosine {
    max_n: usize,
    /// Phrases pre-normalized with the same extractor settings as the profiles.
    phrases: Vec<Vec<String>>,
}

impl NgramTfIdfCosine {
    pub fn new(max_n: usize, phrases: Vec<Vec<String>>) -> Self {
        let mut phrases: Vec<Vec<String>> =
            phrases.into_iter().filter(|p| !p.is_empty()).collect();
        phrases.sort();
        phrases.dedup();
        Self {
            max_n: max_n.max(1),
            phrases,
        }
    }

    /// Builds the calculator from raw phrase strings, normalizing them with `config`
    /// so they line up with extracted profile terms.
    ///
    /// When punctuation is stripped, phrases carrying symbols other than hyphens (`c#`,
    /// `c++`) are skipped: their normalized form would match a different, shorter token.
    pub fn from_phrase_list<S: AsRef<str>>(
        max_n: usize,
        phrases: &[S],
        config: &ExtractorConfig,
    ) -> Self {
        let raw: Vec<&str> = phrases.iter().map(|p| p.as_ref()).collect();
        let normalized = raw
            .into_iter()
            .filter(|p| !config.strip_punctuation || survives_tokenization(p))
            .map(|p| extract_terms(p, config))
            .collect();
        Self::new(max_n, normalized)
    }

    pub fn with_default_phrases(config: &ExtractorConfig) -> Self {
        Self::from_phrase_list(2, DEFAULT_PHRASES, config)
    }

    fn features(&self, terms: &[String], n: usize) -> Vec<String> {
        let mut features: Vec<String> = self
            .phrases
            .iter()
            .filter(|phrase| contains_run(terms, phrase))
            .map(|phrase| phrase.join(" "))
            .collect();
        features.extend(ngrams(terms, n));
        features
    }
}

impl SimilarityCalculator for NgramTfIdfCosine {
    fn backend(&self) -> &'static str {
        "ngram_tfidf"
    }

    fn similarity(&self, left: &[String], right: &[String]) -> f64 {
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        let mut orders = 0usize;

        for n in 1..=self.max_n {
            let left_features = self.features(left, n);
            let right_features = self.features(right, n);
            if left_features.is_empty() && right_features.is_empty() {
                continue;
            }

            let left_tf = normalized_frequencies(&left_features);
            let right_tf = normalized_frequencies(&right_features);
            let (left_vec, right_vec) = apply_pairwise_idf(left_tf, right_tf);

            total += cosine_similarity(&left_vec, &right_vec);
            orders += 1;
        }

        if orders == 0 {
            return 0.0;
        }
        (total / orders as f64).clamp(0.0, 1.0)
    }
}

fn survives_tokenization(phrase: &str) -> bool {
    phrase
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace() || c == '-')
}

// ────────────────────────────────────────────────────────────────────────────
// Vector helpers
// ────────────────────────────────────────────────────────────────────────────

/// Raw occurrence counts per term.
pub fn term_frequencies(terms: &[String]) -> TermVector {
    let mut tf = TermVector::new();
    for term in terms {
        *tf.entry(term.clone()).or_insert(0.0) += 1.0;
    }
    tf
}

fn normalized_frequencies(terms: &[String]) -> TermVector {
    let mut tf = term_frequencies(terms);
    let total: f64 = tf.values().sum();
    if total > 0.0 {
        for value in tf.values_mut() {
            *value /= total;
        }
    }
    tf
}

/// Weights both vectors by IDF computed over the two-document corpus they form.
fn apply_pairwise_idf(mut left: TermVector, mut right: TermVector) -> (TermVector, TermVector) {
    const DOCUMENTS: f64 = 2.0;
    let idf = |in_other: bool| {
        let df = if in_other { 2.0 } else { 1.0 };
        (DOCUMENTS / (df + 1.0)).ln() + 1.0
    };

    for (term, value) in right.iter_mut() {
        *value *= idf(left.contains_key(term));
    }
    for (term, value) in left.iter_mut() {
        *value *= idf(right.contains_key(term));
    }
    (left, right)
}

/// Cosine of two sparse vectors. 0.0 when either has zero magnitude; exactly 1.0 when the
/// vectors are identical.
pub fn cosine_similarity(left: &TermVector, right: &TermVector) -> f64 {
    let magnitude_left = magnitude(left);
    let magnitude_right = magnitude(right);
    if magnitude_left == 0.0 || magnitude_right == 0.0 {
        return 0.0;
    }
    if left == right {
        return 1.0;
    }

    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    // Shared keys are visited in sorted order either way, which keeps the score symmetric.
    let dot: f64 = small
        .iter()
        .filter_map(|(term, a)| large.get(term).map(|b| a * b))
        .sum();

    (dot / (magnitude_left * magnitude_right)).clamp(0.0, 1.0)
}

fn magnitude(vector: &TermVector) -> f64 {
    vector.values().map(|v| v * v).sum::<f64>().sqrt()
}

fn ngrams(terms: &[String], n: usize) -> impl Iterator<Item = String> + '_ {
    terms.windows(n).map(|window| window.join(" "))
}

fn contains_run(terms: &[String], phrase: &[String]) -> bool {
    phrase.len() <= terms.len() && terms.windows(phrase.len()).any(|w| w == phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> Vec<String> {
        extract_terms(text, &ExtractorConfig::default())
    }

    fn backends() -> Vec<Box<dyn SimilarityCalculator>> {
        vec![
            Box::new(TermFrequencyCosine),
            Box::new(NgramTfIdfCosine::with_default_phrases(
                &ExtractorConfig::default(),
            )),
        ]
    }

    const TEXTS: &[&str] = &[
        "senior backend engineer golang",
        "backend engineer with golang experience",
        "frontend designer photoshop",
        "Machine learning engineer, Python and deep learning",
        "rust",
        "rust rust rust",
        "data science and machine learning with python",
        "",
    ];

    #[test]
    fn test_symmetry_for_all_backends() {
        for calc in backends() {
            for a in TEXTS {
                for b in TEXTS {
                    let ab = calc.similarity(&t(a), &t(b));
                    let ba = calc.similarity(&t(b), &t(a));
                    assert_eq!(ab, ba, "{}: asymmetric for {a:?} / {b:?}", calc.backend());
                }
            }
        }
    }

    #[test]
    fn test_self_similarity_is_one_for_non_empty_text() {
        for calc in backends() {
            for a in TEXTS.iter().filter(|a| !a.is_empty()) {
                let score = calc.similarity(&t(a), &t(a));
                assert_eq!(score, 1.0, "{}: self-similarity of {a:?}", calc.backend());
            }
        }
    }

    #[test]
    fn test_text_without_content_terms_scores_zero_against_itself() {
        for calc in backends() {
            for text in ["the and", "!!!", "  ,;  "] {
                assert_eq!(
                    calc.similarity(&t(text), &t(text)),
                    0.0,
                    "{}: {text:?} has no terms after extraction",
                    calc.backend()
                );
            }
        }
    }

    #[test]
    fn test_symbol_phrases_are_not_reduced_to_bare_letters() {
        let cfg = ExtractorConfig::default();
        let calc = NgramTfIdfCosine::from_phrase_list(
            2,
            &["c#", "c++", "test-driven development"][..],
            &cfg,
        );
        assert!(!calc.phrases.contains(&vec!["c".to_string()]));
        assert!(calc.phrases.contains(&t("test-driven development")));

        // "C programming" must not pick up a dictionary hit from "c#".
        let defaults = NgramTfIdfCosine::with_default_phrases(&cfg);
        assert!(defaults.features(&t("C programming"), 2).iter().all(|f| f != "c"));
    }

    #[test]
    fn test_empty_side_scores_zero() {
        for calc in backends() {
            assert_eq!(calc.similarity(&[], &[]), 0.0);
            assert_eq!(calc.similarity(&[], &t("rust engineer")), 0.0);
            assert_eq!(calc.similarity(&t("rust engineer"), &[]), 0.0);
        }
    }

    #[test]
    fn test_scores_are_bounded() {
        for calc in backends() {
            for a in TEXTS {
                for b in TEXTS {
                    let score = calc.similarity(&t(a), &t(b));
                    assert!(
                        (0.0..=1.0).contains(&score),
                        "{}: {score} out of range",
                        calc.backend()
                    );
                }
            }
        }
    }

    #[test]
    fn test_related_candidate_outscores_unrelated() {
        let job = t("senior backend engineer golang");
        let a = t("backend engineer with golang experience");
        let b = t("frontend designer photoshop");
        for calc in backends() {
            let score_a = calc.similarity(&job, &a);
            let score_b = calc.similarity(&job, &b);
            assert!(
                score_a > score_b,
                "{}: expected {score_a} > {score_b}",
                calc.backend()
            );
        }
    }

    #[test]
    fn test_term_frequency_known_value() {
        // job: senior, backend, engineer, golang; candidate: backend, engineer, golang, experience
        // dot = 3, |a| = |b| = 2 → 0.75
        let score = TermFrequencyCosine.similarity(
            &t("senior backend engineer golang"),
            &t("backend engineer with golang experience"),
        );
        assert!((score - 0.75).abs() < 1e-12, "score was {score}");
    }

    #[test]
    fn test_term_frequency_respects_counts() {
        // [2, 0] vs [1, 1] → 2 / (2 * sqrt 2)
        let score = TermFrequencyCosine.similarity(&t("rust rust"), &t("rust go"));
        assert!((score - 1.0 / 2f64.sqrt()).abs() < 1e-12, "score was {score}");
    }

    #[test]
    fn test_disjoint_texts_score_zero() {
        for calc in backends() {
            assert_eq!(calc.similarity(&t("alpha beta"), &t("gamma delta")), 0.0);
        }
    }

    #[test]
    fn test_ngram_skips_orders_with_no_features() {
        // Single-term texts have no bigrams; the unigram order alone decides.
        let calc = NgramTfIdfCosine::new(2, vec![]);
        assert_eq!(calc.similarity(&t("rust"), &t("rust")), 1.0);
    }

    #[test]
    fn test_ngram_phrase_match_requires_contiguous_run() {
        let calc = NgramTfIdfCosine::from_phrase_list(
            1,
            &["machine learning"],
            &ExtractorConfig::default(),
        );
        let contiguous = calc.features(&t("machine learning engineer"), 1);
        assert!(contiguous.contains(&"machine learning".to_string()));

        let split = calc.features(&t("machine operator, learning fast"), 1);
        assert!(!split.contains(&"machine learning".to_string()));
    }

    #[test]
    fn test_ngram_bigrams_reward_word_order() {
        let calc = NgramTfIdfCosine::new(2, vec![]);
        let job = t("distributed systems engineer");
        let same_order = calc.similarity(&job, &t("distributed systems engineer team"));
        let shuffled = calc.similarity(&job, &t("engineer systems distributed team"));
        assert!(same_order > shuffled, "{same_order} <= {shuffled}");
    }

    #[test]
    fn test_pairwise_idf_downweights_shared_terms() {
        let left = term_frequencies(&t("rust go"));
        let right = term_frequencies(&t("rust"));
        let (left, right) = apply_pairwise_idf(left, right);
        let shared = (2f64 / 3f64).ln() + 1.0;
        assert!((left["rust"] - shared).abs() < 1e-12);
        assert!((right["rust"] - shared).abs() < 1e-12);
        assert!((left["go"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_backend_parses_from_str() {
        assert_eq!(
            "term_frequency".parse::<SimilarityBackend>().unwrap(),
            SimilarityBackend::TermFrequency
        );
        assert_eq!(
            " NGRAM_TFIDF ".parse::<SimilarityBackend>().unwrap(),
            SimilarityBackend::NgramTfidf
        );
        assert!("embedding".parse::<SimilarityBackend>().is_err());
    }
}
