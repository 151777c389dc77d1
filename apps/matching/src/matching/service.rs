//! Match service: ranks many counterparts against one subject text.
//!
//! Algorithm:
//! 1. Extract the subject once.
//! 2. For each counterpart: extract (exclude on `ExtractionError`), then score.
//! 3. Sort by descending score, ties by ascending id.
//! 4. Apply the optional `min_score` filter (strict) and `top_n` cut-off.
//!
//! Pure and CPU-bound: async callers should run it inside `tokio::task::spawn_blocking`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::matching::extractor::{extract_profile, extract_terms, ExtractorConfig};
use crate::matching::similarity::SimilarityCalculator;

// ────────────────────────────────────────────────────────────────────────────
// Input / output models
// ────────────────────────────────────────────────────────────────────────────

/// A candidate as handed over by the document pipeline. `profile_text` is `None` when
/// upstream text extraction failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub profile_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProfile {
    pub id: Uuid,
    pub job_text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RankOptions {
    /// Keep only scores strictly greater than this.
    pub min_score: Option<f64>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub id: Uuid,
    pub score: f64,
}

/// A counterpart left out of the ranking because its profile could not be extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedProfile {
    pub id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankOutcome {
    pub matches: Vec<RankedMatch>,
    pub excluded: Vec<ExcludedProfile>,
    pub computed_at: DateTime<Utc>,
}

/// A scored candidate/advertisement pairing. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: Uuid,
    pub advertisement_id: Uuid,
    pub score: f64,
    pub computed_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

pub struct MatchService {
    extractor: ExtractorConfig,
    calculator: Arc<dyn SimilarityCalculator>,
}

impl MatchService {
    pub fn new(extractor: ExtractorConfig, calculator: Arc<dyn SimilarityCalculator>) -> Self {
        Self {
            extractor,
            calculator,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.calculator.backend()
    }

    /// Scores two raw texts.
    pub fn similarity(&self, left: &str, right: &str) -> f64 {
        self.calculator.similarity(
            &extract_terms(left, &self.extractor),
            &extract_terms(right, &self.extractor),
        )
    }

    /// Ranks candidates against one job advertisement text.
    pub fn rank_candidates(
        &self,
        job_text: &str,
        candidates: &[CandidateProfile],
        options: &RankOptions,
    ) -> RankOutcome {
        self.rank(
            job_text,
            candidates
                .iter()
                .map(|c| (c.id, c.profile_text.as_deref())),
            options,
        )
    }

    /// Ranks job advertisements against one candidate profile text.
    pub fn rank_jobs(
        &self,
        candidate_text: &str,
        jobs: &[JobProfile],
        options: &RankOptions,
    ) -> RankOutcome {
        self.rank(
            candidate_text,
            jobs.iter().map(|j| (j.id, j.job_text.as_deref())),
            options,
        )
    }

    /// Shared ranking pipeline. A blank subject is not an error: every counterpart scores 0.0.
    pub fn rank<'a, I>(&self, subject: &str, counterparts: I, options: &RankOptions) -> RankOutcome
    where
        I: IntoIterator<Item = (Uuid, Option<&'a str>)>,
    {
        let computed_at = Utc::now();
        let subject_terms = extract_terms(subject, &self.extractor);

        let mut matches = Vec::new();
        let mut excluded = Vec::new();

        for (id, text) in counterparts {
            match extract_profile(text, &self.extractor) {
                Ok(terms) => {
                    let score = self.calculator.similarity(&subject_terms, &terms);
                    matches.push(RankedMatch { id, score });
                }
                Err(e) => {
                    warn!(profile_id = %id, error = %e, "Excluding profile from ranking");
                    excluded.push(ExcludedProfile {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        sort_matches(&mut matches);

        if let Some(min_score) = options.min_score {
            matches.retain(|m| m.score > min_score);
        }
        if let Some(top_n) = options.top_n {
            matches.truncate(top_n);
        }

        debug!(
            backend = self.backend(),
            ranked = matches.len(),
            excluded = excluded.len(),
            "Ranking complete"
        );

        RankOutcome {
            matches,
            excluded,
            computed_at,
        }
    }
}

/// Descending score, then ascending id. Stable and total, so equal inputs give equal order.
pub fn sort_matches(matches: &mut [RankedMatch]) {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
}
