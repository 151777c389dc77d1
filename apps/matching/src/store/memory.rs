//! In-memory `MatchStore` and record builders for handler and orchestration tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobAdvertisement, JobApplication};
use crate::models::portfolio::{Portfolio, PortfolioItem};
use crate::store::MatchStore;

#[derive(Default)]
pub struct InMemoryStore {
    pub job_ads: Vec<JobAdvertisement>,
    pub applications: Vec<JobApplication>,
    pub portfolios: HashMap<Uuid, Portfolio>,
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn find_job_advertisement(&self, id: Uuid) -> Result<Option<JobAdvertisement>, AppError> {
        Ok(self.job_ads.iter().find(|ad| ad.id == id).cloned())
    }

    async fn list_job_advertisements(&self) -> Result<Vec<JobAdvertisement>, AppError> {
        Ok(self.job_ads.clone())
    }

    async fn list_applications_for_job(
        &self,
        job_advertisement_id: Uuid,
    ) -> Result<Vec<JobApplication>, AppError> {
        Ok(self
            .applications
            .iter()
            .filter(|a| a.job_advertisement_id == job_advertisement_id)
            .cloned()
            .collect())
    }

    async fn find_portfolio(&self, user_id: Uuid) -> Result<Option<Portfolio>, AppError> {
        Ok(self.portfolios.get(&user_id).cloned())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Record builders
// ────────────────────────────────────────────────────────────────────────────

pub fn job_ad(n: u128, title: &str, description: &str) -> JobAdvertisement {
    JobAdvertisement {
        id: Uuid::from_u128(n),
        user_id: Uuid::from_u128(9999),
        startup_name: format!("Startup {n}"),
        startup_description: String::new(),
        industry: String::new(),
        key_technologies: None,
        job_title: title.to_string(),
        job_description: description.to_string(),
        required_skills: None,
        experience: None,
        education: None,
        job_location: None,
        application_deadline: Utc::now(),
    }
}

pub fn application(n: u128, job: Uuid, user: u128, cv: Option<&str>) -> JobApplication {
    JobApplication {
        id: Uuid::from_u128(n),
        job_advertisement_id: job,
        cv_url: None,
        cv_text_content: cv.map(String::from),
        cover_letter_url: None,
        application_date: Utc::now(),
        status: "under_review".to_string(),
        interview_date: None,
        user_id: Uuid::from_u128(user),
    }
}

pub fn portfolio(user: u128, title: &str, skills: &str) -> Portfolio {
    Portfolio {
        id: Uuid::new_v4(),
        user_id: Uuid::from_u128(user),
        items: vec![PortfolioItem {
            id: Uuid::new_v4(),
            portfolio_id: Uuid::nil(),
            title: title.to_string(),
            description: String::new(),
            skills: Some(skills.to_string()),
            technologies: None,
            industry: None,
        }],
    }
}
