use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Docs,
    Apis,
    Tooling,
    Dx,
    Bugs,
    FeatureRequest,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Docs => "docs",
            Category::Apis => "apis",
            Category::Tooling => "tooling",
            Category::Dx => "dx",
            Category::Bugs => "bugs",
            Category::FeatureRequest => "feature_request",
            Category::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.into())).map_err(|_| Error::BusinessError(format!("unknown feedback category: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.into())).map_err(|_| Error::BusinessError(format!("unknown severity: {}", s)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: i32,
    pub user_id: i32,
    pub project_id: Option<i32>,
    pub category: Category,
    pub description: String,
    pub severity: Option<Severity>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct Submit {
    pub category: Category,
    pub description: String,
    pub severity: Option<Severity>,
    pub project_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub user_id: i32,
    pub project_id: Option<i32>,
    pub category: Category,
    pub description: String,
    pub severity: Option<Severity>,
}
