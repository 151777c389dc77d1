pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless ranking over caller-supplied texts
        .route(
            "/api/v1/matches/rank-candidates",
            post(handlers::handle_rank_candidates),
        )
        .route("/api/v1/matches/rank-jobs", post(handlers::handle_rank_jobs))
        .route("/api/v1/matches/similarity", post(handlers::handle_similarity))
        .route("/api/v1/matches/evaluate", post(handlers::handle_evaluate))
        // Store-backed top matches
        .route(
            "/api/v1/matches/jobs/:job_ad_id/applicants",
            get(handlers::handle_top_applicants),
        )
        .route(
            "/api/v1/matches/individuals/:user_id/job-ads",
            get(handlers::handle_top_job_ads),
        )
        .with_state(state)
}
