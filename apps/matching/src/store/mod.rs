//! Read-only access to the records the matcher ranks.
//!
//! The job, application and portfolio tables belong to other services; this crate only
//! reads them. `AppState` holds an `Arc<dyn MatchStore>` so handlers can be driven by an
//! in-memory store in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobAdvertisement, JobApplication};
use crate::models::portfolio::Portfolio;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgMatchStore;

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find_job_advertisement(&self, id: Uuid) -> Result<Option<JobAdvertisement>, AppError>;

    async fn list_job_advertisements(&self) -> Result<Vec<JobAdvertisement>, AppError>;

    async fn list_applications_for_job(
        &self,
        job_advertisement_id: Uuid,
    ) -> Result<Vec<JobApplication>, AppError>;

    /// Portfolio of a skilled individual, items in display order.
    async fn find_portfolio(&self, user_id: Uuid) -> Result<Option<Portfolio>, AppError>;
}
