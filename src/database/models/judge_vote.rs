use sqlx::FromRow;

use crate::core::models::judge::{JudgeVote, Rank};
use crate::error::Error;

#[derive(Debug, FromRow)]
pub struct JudgeVoteRow {
    pub project_id: i32,
    pub judge_name: String,
    pub rank: i16,
}

impl TryFrom<JudgeVoteRow> for JudgeVote {
    type Error = Error;

    fn try_from(row: JudgeVoteRow) -> Result<Self, Self::Error> {
        Ok(JudgeVote {
            project_id: row.project_id,
            judge_name: row.judge_name,
            rank: Rank::new(row.rank)?,
        })
    }
}
