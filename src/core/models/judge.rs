use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::core::models::project::Project;
use crate::error::Error;

/// A judge's exclusive placing, 1st to 3rd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Rank(i16);

impl Rank {
    pub const ALL: [Rank; 3] = [Rank(1), Rank(2), Rank(3)];

    pub fn new(value: i16) -> Result<Self, Error> {
        if !(1..=3).contains(&value) {
            return Err(Error::BusinessError(format!("rank must be 1, 2 or 3 (got {})", value)));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i16 {
        self.0
    }

    /// Weight this rank contributes to a project's `judge_vote_count`.
    pub fn points(&self) -> i64 {
        4 - i64::from(self.0)
    }
}

impl TryFrom<i16> for Rank {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Rank::new(value)
    }
}

impl From<Rank> for i16 {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgeVote {
    pub project_id: i32,
    pub judge_name: String,
    pub rank: Rank,
}

#[derive(Debug, Deserialize)]
pub struct RankChange {
    pub rank: Option<Rank>,
}

#[derive(Debug, Serialize)]
pub struct JudgedProject {
    #[serde(flatten)]
    pub project: Project,
    pub my_rank: Option<Rank>,
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub name: String,
}
