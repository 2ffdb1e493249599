use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub leader_id: i32,
    pub idea_id: i32,
    pub max_members: i32,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn is_full(&self) -> bool {
        self.member_count >= i64::from(self.max_members)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TeamMember {
    pub id: i32,
    pub team_id: i32,
    pub user_id: i32,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct Create {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub idea_id: i32,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub name: String,
    pub description: String,
    pub leader_id: i32,
    pub idea_id: i32,
    pub max_members: i32,
}

#[derive(Debug, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
    pub is_member: bool,
}
