use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::portfolio::Portfolio;

pub const DEFAULT_JOB_LOCATION: &str = "Remote";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobAdvertisement {
    pub id: Uuid,
    /// Founder who posted the advertisement.
    pub user_id: Uuid,
    pub startup_name: String,
    pub startup_description: String,
    pub industry: String,
    pub key_technologies: Option<String>,
    pub job_title: String,
    pub job_description: String,
    pub required_skills: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub job_location: Option<String>,
    pub application_deadline: DateTime<Utc>,
}

impl JobAdvertisement {
    /// Text the matcher compares against: title, description, skills, technologies,
    /// industry, experience, education, startup description.
    pub fn match_text(&self) -> String {
        join_present([
            Some(self.job_title.as_str()),
            Some(self.job_description.as_str()),
            self.required_skills.as_deref(),
            self.key_technologies.as_deref(),
            Some(self.industry.as_str()),
            self.experience.as_deref(),
            self.education.as_deref(),
            Some(self.startup_description.as_str()),
        ])
    }

    pub fn location_or_default(&self) -> String {
        self.job_location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_JOB_LOCATION.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobApplicationStatus {
    Submitted,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    Interviewed,
    OfferExtended,
    OfferAcceptedByIndividual,
    OfferRejectedByIndividual,
    ApplicationRejectedByFounder,
    ApplicationWithdrawnByIndividual,
}

impl JobApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Shortlisted => "shortlisted",
            Self::InterviewScheduled => "interview_scheduled",
            Self::Interviewed => "interviewed",
            Self::OfferExtended => "offer_extended",
            Self::OfferAcceptedByIndividual => "offer_accepted_by_individual",
            Self::OfferRejectedByIndividual => "offer_rejected_by_individual",
            Self::ApplicationRejectedByFounder => "application_rejected_by_founder",
            Self::ApplicationWithdrawnByIndividual => "application_withdrawn_by_individual",
        }
    }

    /// Human-readable label shown next to matched applicants.
    pub fn friendly(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::UnderReview => "Under Review",
            Self::Shortlisted => "Shortlisted",
            Self::InterviewScheduled => "Interview Scheduled",
            Self::Interviewed => "Interviewed",
            Self::OfferExtended => "Offer Extended",
            Self::OfferAcceptedByIndividual => "Offer Accepted by Individual",
            Self::OfferRejectedByIndividual => "Offer Rejected by Individual",
            Self::ApplicationRejectedByFounder => "Application Rejected by Founder",
            Self::ApplicationWithdrawnByIndividual => "Application Withdrawn by Individual",
        }
    }
}

impl fmt::Display for JobApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.friendly())
    }
}

impl FromStr for JobApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [JobApplicationStatus; 10] = [
            JobApplicationStatus::Submitted,
            JobApplicationStatus::UnderReview,
            JobApplicationStatus::Shortlisted,
            JobApplicationStatus::InterviewScheduled,
            JobApplicationStatus::Interviewed,
            JobApplicationStatus::OfferExtended,
            JobApplicationStatus::OfferAcceptedByIndividual,
            JobApplicationStatus::OfferRejectedByIndividual,
            JobApplicationStatus::ApplicationRejectedByFounder,
            JobApplicationStatus::ApplicationWithdrawnByIndividual,
        ];
        ALL.into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown job application status '{s}'"))
    }
}

/// Stored row. `status` is kept as text, see `JobApplication::status`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_advertisement_id: Uuid,
    pub cv_url: Option<String>,
    /// Plain text extracted from the CV by the upload pipeline.
    pub cv_text_content: Option<String>,
    pub cover_letter_url: Option<String>,
    pub application_date: DateTime<Utc>,
    pub status: String,
    pub interview_date: Option<DateTime<Utc>>,
    /// Applicant (skilled individual).
    pub user_id: Uuid,
}

impl JobApplication {
    pub fn status(&self) -> Result<JobApplicationStatus, String> {
        self.status.parse()
    }

    /// CV text followed by the applicant's portfolio text.
    ///
    /// `None` when neither is available, i.e. there is nothing to match on.
    pub fn match_text(&self, portfolio: Option<&Portfolio>) -> Option<String> {
        let cv = self.cv_text_content.as_deref();
        let portfolio_text = portfolio.map(Portfolio::match_text);
        if cv.is_none() && portfolio_text.is_none() {
            return None;
        }
        Some(join_present([cv, portfolio_text.as_deref()]))
    }
}

/// Space-joins the present, non-blank parts.
pub(crate) fn join_present<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
