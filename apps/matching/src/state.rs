use std::sync::Arc;

use crate::config::Config;
use crate::matching::service::MatchService;
use crate::store::MatchStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read access to job advertisements, applications and portfolios.
    pub store: Arc<dyn MatchStore>,
    /// Extractor + similarity backend. Backend chosen via SIMILARITY_BACKEND.
    pub matcher: Arc<MatchService>,
    pub config: Config,
}
