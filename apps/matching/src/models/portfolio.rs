use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::join_present;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioRow {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills: Option<String>,
    pub technologies: Option<String>,
    pub industry: Option<String>,
}

impl PortfolioItem {
    pub fn match_text(&self) -> String {
        join_present([
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            self.skills.as_deref(),
            self.technologies.as_deref(),
            self.industry.as_deref(),
        ])
    }
}

/// A skilled individual's portfolio. Owns its items; item order is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<PortfolioItem>,
}

impl Portfolio {
    pub fn from_parts(row: PortfolioRow, items: Vec<PortfolioItem>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            items,
        }
    }

    pub fn match_text(&self) -> String {
        self.items
            .iter()
            .map(PortfolioItem::match_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
