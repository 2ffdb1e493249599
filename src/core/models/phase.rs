use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    IdeasOpen,
    IdeasVoting,
    TeamsOpen,
    SubmissionsOpen,
    ShowcaseVoting,
    WinnersRevealed,
}

impl PhaseName {
    pub const ALL: [PhaseName; 6] = [
        PhaseName::IdeasOpen,
        PhaseName::IdeasVoting,
        PhaseName::TeamsOpen,
        PhaseName::SubmissionsOpen,
        PhaseName::ShowcaseVoting,
        PhaseName::WinnersRevealed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::IdeasOpen => "ideas_open",
            PhaseName::IdeasVoting => "ideas_voting",
            PhaseName::TeamsOpen => "teams_open",
            PhaseName::SubmissionsOpen => "submissions_open",
            PhaseName::ShowcaseVoting => "showcase_voting",
            PhaseName::WinnersRevealed => "winners_revealed",
        }
    }
}

impl Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseName::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::BusinessError(format!("unknown phase: {}", s)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub name: PhaseName,
    pub is_open: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseState {
    pub name: PhaseName,
    pub is_open: bool,
    pub effective: bool,
}

#[derive(Debug, Deserialize)]
pub struct Toggle {
    pub is_open: bool,
}

/// Date-based fallback openings, consulted when a phase flag is not set.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    opens: HashMap<PhaseName, DateTime<Utc>>,
}

impl Schedule {
    pub fn new(opens: HashMap<PhaseName, DateTime<Utc>>) -> Self {
        Self { opens }
    }

    pub fn is_open_at(&self, phase: PhaseName, now: DateTime<Utc>) -> bool {
        self.opens.get(&phase).map(|at| now >= *at).unwrap_or(false)
    }
}
