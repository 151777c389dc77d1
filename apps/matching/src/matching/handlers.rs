//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::metrics::{sweep_thresholds, LabelledPair, ThresholdReport, DEFAULT_THRESHOLDS};
use crate::matching::service::{CandidateProfile, ExcludedProfile, JobProfile, RankOptions};
use crate::matching::top_matches::{
    top_applicants_for_job, top_jobs_for_individual, TopApplicants,
    TopJobAdvertisements, TopMatchOptions,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RankCandidatesRequest {
    pub job_text: String,
    pub candidates: Vec<CandidateProfile>,
    pub top_n: Option<usize>,
    pub min_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CandidateScore {
    pub candidate_id: Uuid,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct RankCandidatesResponse {
    pub matches: Vec<CandidateScore>,
    pub excluded: Vec<ExcludedProfile>,
    pub backend: &'static str,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RankJobsRequest {
    pub candidate_text: String,
    pub jobs: Vec<JobProfile>,
    pub top_n: Option<usize>,
    pub min_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct JobScore {
    pub job_id: Uuid,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct RankJobsResponse {
    pub matches: Vec<JobScore>,
    pub excluded: Vec<ExcludedProfile>,
    pub backend: &'static str,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarityRequest {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Serialize)]
pub struct SimilarityResponse {
    pub score: f64,
    pub backend: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub pairs: Vec<LabelledPair>,
    pub thresholds: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub backend: &'static str,
    pub reports: Vec<ThresholdReport>,
}

#[derive(Debug, Deserialize)]
pub struct TopNQuery {
    pub top_n: Option<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matches/rank-candidates
///
/// Ranks candidate profiles against one job text. Candidates whose text is missing or
/// oversized are listed under `excluded`; the request still succeeds.
pub async fn handle_rank_candidates(
    State(state): State<AppState>,
    Json(request): Json<RankCandidatesRequest>,
) -> Result<Json<RankCandidatesResponse>, AppError> {
    let options = rank_options(request.top_n, request.min_score)?;
    let matcher = state.matcher.clone();
    let RankCandidatesRequest {
        job_text,
        candidates,
        ..
    } = request;

    let outcome = tokio::task::spawn_blocking(move || {
        matcher.rank_candidates(&job_text, &candidates, &options)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in rank_candidates: {e}")))?;

    Ok(Json(RankCandidatesResponse {
        matches: outcome
            .matches
            .into_iter()
            .map(|m| CandidateScore {
                candidate_id: m.id,
                score: m.score,
            })
            .collect(),
        excluded: outcome.excluded,
        backend: state.matcher.backend(),
        computed_at: outcome.computed_at,
    }))
}

/// POST /api/v1/matches/rank-jobs
///
/// Symmetric to rank-candidates: ranks job texts against one candidate profile.
pub async fn handle_rank_jobs(
    State(state): State<AppState>,
    Json(request): Json<RankJobsRequest>,
) -> Result<Json<RankJobsResponse>, AppError> {
    let options = rank_options(request.top_n, request.min_score)?;
    let matcher = state.matcher.clone();
    let RankJobsRequest {
        candidate_text,
        jobs,
        ..
    } = request;

    let outcome = tokio::task::spawn_blocking(move || {
        matcher.rank_jobs(&candidate_text, &jobs, &options)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in rank_jobs: {e}")))?;

    Ok(Json(RankJobsResponse {
        matches: outcome
            .matches
            .into_iter()
            .map(|m| JobScore {
                job_id: m.id,
                score: m.score,
            })
            .collect(),
        excluded: outcome.excluded,
        backend: state.matcher.backend(),
        computed_at: outcome.computed_at,
    }))
}

/// POST /api/v1/matches/similarity
///
/// Both texts are subject to the profile size cap.
pub async fn handle_similarity(
    State(state): State<AppState>,
    Json(request): Json<SimilarityRequest>,
) -> Result<Json<SimilarityResponse>, AppError> {
    check_text_size(&state, "left", &request.left)?;
    check_text_size(&state, "right", &request.right)?;

    let matcher = state.matcher.clone();
    let SimilarityRequest { left, right } = request;
    let score = tokio::task::spawn_blocking(move || matcher.similarity(&left, &right))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in similarity: {e}")))?;

    Ok(Json(SimilarityResponse {
        score,
        backend: state.matcher.backend(),
    }))
}

/// POST /api/v1/matches/evaluate
///
/// Scores labelled pairs and reports accuracy / precision / recall / F1 per threshold.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    if request.pairs.is_empty() {
        return Err(AppError::Validation("pairs cannot be empty".to_string()));
    }
    let thresholds = request
        .thresholds
        .unwrap_or_else(|| DEFAULT_THRESHOLDS.to_vec());
    if thresholds.is_empty() {
        return Err(AppError::Validation("thresholds cannot be empty".to_string()));
    }
    if let Some(bad) = thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
        return Err(AppError::Validation(format!(
            "threshold {bad} must be within [0, 1]"
        )));
    }
    for (i, pair) in request.pairs.iter().enumerate() {
        check_text_size(&state, &format!("pairs[{i}].left"), &pair.left)?;
        check_text_size(&state, &format!("pairs[{i}].right"), &pair.right)?;
    }

    let matcher = state.matcher.clone();
    let pairs = request.pairs;
    let reports =
        tokio::task::spawn_blocking(move || sweep_thresholds(&matcher, &pairs, &thresholds))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in evaluation: {e}"))
            })?;

    Ok(Json(EvaluateResponse {
        backend: state.matcher.backend(),
        reports,
    }))
}

/// GET /api/v1/matches/jobs/:job_ad_id/applicants
///
/// Top applicants for a job advertisement, scored on CV text plus portfolio.
pub async fn handle_top_applicants(
    State(state): State<AppState>,
    Path(job_ad_id): Path<Uuid>,
    Query(query): Query<TopNQuery>,
) -> Result<Json<TopApplicants>, AppError> {
    let options = top_match_options(&state, query.top_n)?;
    let result =
        top_applicants_for_job(state.store.as_ref(), state.matcher.clone(), job_ad_id, options)
            .await?;

    if result.applicants.is_empty() {
        return Err(AppError::NotFound("No matched applicants found.".to_string()));
    }
    Ok(Json(result))
}

/// GET /api/v1/matches/individuals/:user_id/job-ads
///
/// Top job advertisements for a skilled individual, scored on their portfolio.
pub async fn handle_top_job_ads(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<TopNQuery>,
) -> Result<Json<TopJobAdvertisements>, AppError> {
    let options = top_match_options(&state, query.top_n)?;
    let result =
        top_jobs_for_individual(state.store.as_ref(), state.matcher.clone(), user_id, options)
            .await?;

    if result.job_advertisements.is_empty() {
        return Err(AppError::NotFound(
            "No matched job advertisements found.".to_string(),
        ));
    }
    Ok(Json(result))
}

fn rank_options(top_n: Option<usize>, min_score: Option<f64>) -> Result<RankOptions, AppError> {
    if top_n == Some(0) {
        return Err(AppError::Validation("top_n must be at least 1".to_string()));
    }
    if let Some(min) = min_score {
        if !(0.0..=1.0).contains(&min) {
            return Err(AppError::Validation(
                "min_score must be within [0, 1]".to_string(),
            ));
        }
    }
    Ok(RankOptions { min_score, top_n })
}

fn check_text_size(state: &AppState, field: &str, text: &str) -> Result<(), AppError> {
    let limit = state.config.extractor.max_profile_chars;
    let chars = text.chars().count();
    if chars > limit {
        return Err(AppError::Validation(format!(
            "{field} has {chars} characters, limit is {limit}"
        )));
    }
    Ok(())
}

fn top_match_options(state: &AppState, top_n: Option<usize>) -> Result<TopMatchOptions, AppError> {
    let top_n = top_n.unwrap_or(state.config.match_top_n);
    if top_n == 0 {
        return Err(AppError::Validation("top_n must be at least 1".to_string()));
    }
    Ok(TopMatchOptions {
        threshold: state.config.match_threshold,
        top_n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_options_rejects_zero_top_n() {
        assert!(matches!(
            rank_options(Some(0), None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rank_options_rejects_out_of_range_min_score() {
        assert!(rank_options(None, Some(1.5)).is_err());
        assert!(rank_options(None, Some(-0.1)).is_err());
        let ok = rank_options(Some(3), Some(0.3)).unwrap();
        assert_eq!(ok.top_n, Some(3));
        assert_eq!(ok.min_score, Some(0.3));
    }
}
