use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: i32,
    pub team_id: i32,
    pub title: String,
    pub description: String,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub presentation_url: Option<String>,
    pub track: Option<String>,
    pub judges_score: f64,
    pub showcase_vote_count: i64,
    pub judge_vote_count: i64,
    pub is_winner: bool,
    pub winner_category: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Submit {
    pub team_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub track: Option<String>,
    pub presentation_url: Option<String>,
}

pub type Insert = Submit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    #[default]
    Recent,
    #[serde(alias = "votes")]
    ShowcaseVotes,
    JudgesScore,
    JudgeVotes,
}

#[derive(Debug, Default)]
pub struct Query {
    pub order: Order,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WinnerCategory {
    #[serde(rename = "First Place")]
    FirstPlace,
    #[serde(rename = "Second Place")]
    SecondPlace,
    #[serde(rename = "Third Place")]
    ThirdPlace,
    #[serde(rename = "Hacker's Choice")]
    HackersChoice,
}

impl WinnerCategory {
    pub const PLACES: [WinnerCategory; 3] = [WinnerCategory::FirstPlace, WinnerCategory::SecondPlace, WinnerCategory::ThirdPlace];

    pub fn as_str(&self) -> &'static str {
        match self {
            WinnerCategory::FirstPlace => "First Place",
            WinnerCategory::SecondPlace => "Second Place",
            WinnerCategory::ThirdPlace => "Third Place",
            WinnerCategory::HackersChoice => "Hacker's Choice",
        }
    }
}

impl Display for WinnerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Award {
    pub project_id: i32,
    pub category: WinnerCategory,
}

#[derive(Debug, Serialize)]
pub struct ProjectWithVote {
    #[serde(flatten)]
    pub project: Project,
    pub voted: bool,
}

#[derive(Debug, Serialize)]
pub struct Toggled {
    pub voted: bool,
}
