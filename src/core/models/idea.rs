use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Maximum number of vote tokens one user can hold on a single idea.
pub const MAX_VOTES_PER_IDEA: i64 = 5;

pub fn clamp_votes(target: i64) -> i64 {
    target.clamp(0, MAX_VOTES_PER_IDEA)
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Idea {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub user_id: i32,
    pub vote_count: i64,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct Create {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub title: String,
    pub description: String,
    pub user_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct VoteTally {
    pub idea_id: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteCount {
    pub current_count: i64,
}

#[derive(Debug, Serialize)]
pub struct IdeaWithVotes {
    #[serde(flatten)]
    pub idea: Idea,
    pub my_votes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_votes: Option<i64>,
}
