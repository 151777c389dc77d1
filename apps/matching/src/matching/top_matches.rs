//! Store-backed match flows: top applicants for a job advertisement, and top job
//! advertisements for a skilled individual.
//!
//! Records are loaded through `MatchStore`, flattened to match text, and ranked by
//! `MatchService` on the blocking pool. Only scores strictly above the threshold survive.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::service::{ExcludedProfile, MatchResult, MatchService, RankOptions, RankOutcome};
use crate::models::job::JobAdvertisement;
use crate::models::portfolio::Portfolio;
use crate::store::MatchStore;

#[derive(Debug, Clone, Copy)]
pub struct TopMatchOptions {
    pub threshold: f64,
    pub top_n: usize,
}

impl From<TopMatchOptions> for RankOptions {
    fn from(value: TopMatchOptions) -> Self {
        RankOptions {
            min_score: Some(value.threshold),
            top_n: Some(value.top_n),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedApplicant {
    pub application_id: Uuid,
    #[serde(flatten)]
    pub result: MatchResult,
    pub startup_name: String,
    pub job_title: String,
    pub job_location: String,
    pub application_date: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedJobAdvertisement {
    #[serde(flatten)]
    pub result: MatchResult,
    pub startup_name: String,
    pub job_title: String,
    pub job_location: String,
    pub application_deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopApplicants {
    pub job_advertisement_id: Uuid,
    pub applicants: Vec<MatchedApplicant>,
    pub excluded: Vec<ExcludedProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopJobAdvertisements {
    pub user_id: Uuid,
    pub job_advertisements: Vec<MatchedJobAdvertisement>,
    pub excluded: Vec<ExcludedProfile>,
}

/// Ranks every application to `job_ad_id` by CV + portfolio text against the advertisement.
pub async fn top_applicants_for_job(
    store: &dyn MatchStore,
    matcher: Arc<MatchService>,
    job_ad_id: Uuid,
    options: TopMatchOptions,
) -> Result<TopApplicants, AppError> {
    let job_ad = store
        .find_job_advertisement(job_ad_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job advertisement {job_ad_id} not found")))?;

    let applications = store.list_applications_for_job(job_ad_id).await?;

    // One portfolio lookup per applicant, even if they applied twice.
    let mut portfolios: HashMap<Uuid, Option<Portfolio>> = HashMap::new();
    for application in &applications {
        if !portfolios.contains_key(&application.user_id) {
            let portfolio = store.find_portfolio(application.user_id).await?;
            portfolios.insert(application.user_id, portfolio);
        }
    }

    let profiles: Vec<(Uuid, Option<String>)> = applications
        .iter()
        .map(|a| {
            let portfolio = portfolios.get(&a.user_id).and_then(Option::as_ref);
            (a.id, a.match_text(portfolio))
        })
        .collect();

    let outcome = rank_blocking(matcher, job_ad.match_text(), profiles, options.into()).await?;

    let by_id: HashMap<Uuid, _> = applications.iter().map(|a| (a.id, a)).collect();
    let applicants: Vec<MatchedApplicant> = outcome
        .matches
        .iter()
        .filter_map(|m| by_id.get(&m.id).map(|a| (m, *a)))
        .map(|(m, application)| MatchedApplicant {
            application_id: application.id,
            result: MatchResult {
                candidate_id: application.user_id,
                advertisement_id: job_ad.id,
                score: m.score,
                computed_at: outcome.computed_at,
            },
            startup_name: job_ad.startup_name.clone(),
            job_title: job_ad.job_title.clone(),
            job_location: job_ad.location_or_default(),
            application_date: application.application_date,
            status: application
                .status()
                .map(|s| s.to_string())
                .unwrap_or_else(|_| application.status.clone()),
        })
        .collect();

    info!(
        job_ad_id = %job_ad_id,
        applications = applications.len(),
        matched = applicants.len(),
        excluded = outcome.excluded.len(),
        "Ranked applicants for job advertisement"
    );

    Ok(TopApplicants {
        job_advertisement_id: job_ad_id,
        applicants,
        excluded: outcome.excluded,
    })
}

/// Ranks every job advertisement against the individual's portfolio text.
pub async fn top_jobs_for_individual(
    store: &dyn MatchStore,
    matcher: Arc<MatchService>,
    user_id: Uuid,
    options: TopMatchOptions,
) -> Result<TopJobAdvertisements, AppError> {
    let portfolio = store
        .find_portfolio(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio for user {user_id} not found")))?;

    let job_ads = store.list_job_advertisements().await?;
    let profiles: Vec<(Uuid, Option<String>)> = job_ads
        .iter()
        .map(|ad| (ad.id, Some(ad.match_text())))
        .collect();

    let outcome = rank_blocking(matcher, portfolio.match_text(), profiles, options.into()).await?;

    let by_id: HashMap<Uuid, &JobAdvertisement> = job_ads.iter().map(|ad| (ad.id, ad)).collect();
    let job_advertisements: Vec<MatchedJobAdvertisement> = outcome
        .matches
        .iter()
        .filter_map(|m| by_id.get(&m.id).map(|ad| (m, *ad)))
        .map(|(m, ad)| MatchedJobAdvertisement {
            result: MatchResult {
                candidate_id: user_id,
                advertisement_id: ad.id,
                score: m.score,
                computed_at: outcome.computed_at,
            },
            startup_name: ad.startup_name.clone(),
            job_title: ad.job_title.clone(),
            job_location: ad.location_or_default(),
            application_deadline: ad.application_deadline,
        })
        .collect();

    info!(
        user_id = %user_id,
        job_ads = job_ads.len(),
        matched = job_advertisements.len(),
        excluded = outcome.excluded.len(),
        "Ranked job advertisements for individual"
    );

    Ok(TopJobAdvertisements {
        user_id,
        job_advertisements,
        excluded: outcome.excluded,
    })
}

/// Runs the CPU-bound ranking on tokio's blocking pool. Takes owned data for the
/// `'static` closure bound.
async fn rank_blocking(
    matcher: Arc<MatchService>,
    subject: String,
    profiles: Vec<(Uuid, Option<String>)>,
    options: RankOptions,
) -> Result<RankOutcome, AppError> {
    tokio::task::spawn_blocking(move || {
        matcher.rank(
            &subject,
            profiles.iter().map(|(id, text)| (*id, text.as_deref())),
            &options,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in ranking: {e}")))
}
