use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::core::models::feedback::Feedback;
use crate::error::Error;

#[derive(Debug, FromRow)]
pub struct FeedbackRow {
    pub id: i32,
    pub user_id: i32,
    pub project_id: Option<i32>,
    pub category: String,
    pub description: String,
    pub severity: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = Error;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        Ok(Feedback {
            id: row.id,
            user_id: row.user_id,
            project_id: row.project_id,
            category: row.category.parse()?,
            description: row.description,
            severity: row.severity.as_deref().map(str::parse).transpose()?,
            created_at: row.created_at,
        })
    }
}
