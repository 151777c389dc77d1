use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobAdvertisement, JobApplication};
use crate::models::portfolio::{Portfolio, PortfolioItem, PortfolioRow};
use crate::store::MatchStore;

const JOB_AD_COLUMNS: &str = "id, user_id, startup_name, startup_description, industry, \
     key_technologies, job_title, job_description, required_skills, experience, education, \
     job_location, application_deadline";

/// `MatchStore` backed by the platform's PostgreSQL database.
#[derive(Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn find_job_advertisement(&self, id: Uuid) -> Result<Option<JobAdvertisement>, AppError> {
        let job_ad = sqlx::query_as::<_, JobAdvertisement>(&format!(
            "SELECT {JOB_AD_COLUMNS} FROM job_advertisements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job_ad)
    }

    async fn list_job_advertisements(&self) -> Result<Vec<JobAdvertisement>, AppError> {
        let job_ads = sqlx::query_as::<_, JobAdvertisement>(&format!(
            "SELECT {JOB_AD_COLUMNS} FROM job_advertisements ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(job_ads)
    }

    async fn list_applications_for_job(
        &self,
        job_advertisement_id: Uuid,
    ) -> Result<Vec<JobApplication>, AppError> {
        let applications = sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT id, job_advertisement_id, cv_url, cv_text_content, cover_letter_url,
                   application_date, status, interview_date, user_id
            FROM job_applications
            WHERE job_advertisement_id = $1
            ORDER BY id
            "#,
        )
        .bind(job_advertisement_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn find_portfolio(&self, user_id: Uuid) -> Result<Option<Portfolio>, AppError> {
        let row: Option<PortfolioRow> =
            sqlx::query_as("SELECT id, user_id FROM portfolios WHERE user_id = $1 LIMIT 1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, PortfolioItem>(
            r#"
            SELECT id, portfolio_id, title, description, skills, technologies, industry
            FROM portfolio_items
            WHERE portfolio_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Portfolio::from_parts(row, items)))
    }
}
