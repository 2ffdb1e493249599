use chrono::{DateTime, Utc};

use crate::core::models::{
    common::Pagination,
    feedback::{Feedback, Insert as FeedbackInsert},
    idea::{Idea, Insert as IdeaInsert, VoteTally},
    judge::{JudgeVote, Rank},
    phase::{Phase, PhaseName},
    project::{Insert as ProjectInsert, Project, Query as ProjectQuery, WinnerCategory},
    team::{Insert as TeamInsert, Team, TeamMember},
    user::User,
};
use crate::error::Error;

pub trait UserCommon {
    async fn get(&mut self, id: i32) -> Result<User, Error>;
    async fn get_by_name(&mut self, name: &str) -> Result<Option<User>, Error>;
    async fn insert(&mut self, name: &str) -> Result<User, Error>;
    async fn touch(&mut self, id: i32, at: DateTime<Utc>) -> Result<(), Error>;
}

pub trait IdeaCommon {
    async fn insert(&mut self, data: IdeaInsert) -> Result<Idea, Error>;
    async fn get(&mut self, id: i32) -> Result<Idea, Error>;
    /// Locks the idea row until the transaction ends.
    async fn get_for_update(&mut self, id: i32) -> Result<Idea, Error>;
    /// Ideas by descending vote count, oldest first among equals.
    async fn query(&mut self, pagination: Option<Pagination>) -> Result<Vec<Idea>, Error>;
    async fn count(&mut self) -> Result<i64, Error>;
    async fn lock(&mut self, id: i32) -> Result<u64, Error>;
    async fn delete(&mut self, id: i32) -> Result<u64, Error>;
}

pub trait IdeaVoteCommon {
    async fn count(&mut self, idea_id: i32, user_id: i32) -> Result<i64, Error>;
    async fn insert_many(&mut self, idea_id: i32, user_id: i32, n: i64) -> Result<(), Error>;
    /// Deletes the `n` most recently created tokens of the pair.
    async fn delete_latest(&mut self, idea_id: i32, user_id: i32, n: i64) -> Result<u64, Error>;
    async fn tallies(&mut self, user_id: i32) -> Result<Vec<VoteTally>, Error>;
}

pub trait TeamCommon {
    async fn insert(&mut self, data: TeamInsert) -> Result<Team, Error>;
    async fn get(&mut self, id: i32) -> Result<Team, Error>;
    async fn get_for_update(&mut self, id: i32) -> Result<Team, Error>;
    async fn query(&mut self) -> Result<Vec<Team>, Error>;
    async fn exists_for_idea(&mut self, idea_id: i32) -> Result<bool, Error>;
    async fn members(&mut self, team_id: i32) -> Result<Vec<TeamMember>, Error>;
    async fn is_member(&mut self, team_id: i32, user_id: i32) -> Result<bool, Error>;
    async fn add_member(&mut self, team_id: i32, user_id: i32) -> Result<(), Error>;
    async fn remove_member(&mut self, team_id: i32, user_id: i32) -> Result<u64, Error>;
}

pub trait ProjectCommon {
    async fn insert(&mut self, data: ProjectInsert) -> Result<Project, Error>;
    async fn get(&mut self, id: i32) -> Result<Project, Error>;
    async fn query(&mut self, query: &ProjectQuery) -> Result<Vec<Project>, Error>;
    async fn set_judges_score(&mut self, id: i32, score: f64) -> Result<u64, Error>;
    async fn clear_winners(&mut self) -> Result<(), Error>;
    async fn mark_winner(&mut self, id: i32, category: WinnerCategory) -> Result<(), Error>;
}

pub trait ShowcaseVoteCommon {
    async fn exists(&mut self, project_id: i32, user_id: i32) -> Result<bool, Error>;
    async fn insert(&mut self, project_id: i32, user_id: i32) -> Result<(), Error>;
    async fn delete(&mut self, project_id: i32, user_id: i32) -> Result<u64, Error>;
    async fn voted_projects(&mut self, user_id: i32) -> Result<Vec<i32>, Error>;
}

pub trait JudgeVoteCommon {
    async fn query(&mut self, judge_name: &str) -> Result<Vec<JudgeVote>, Error>;
    async fn insert(&mut self, vote: JudgeVote) -> Result<(), Error>;
    async fn delete_by_project(&mut self, project_id: i32, judge_name: &str) -> Result<u64, Error>;
    async fn delete_by_rank(&mut self, judge_name: &str, rank: Rank) -> Result<u64, Error>;
}

pub trait PhaseCommon {
    async fn query(&mut self) -> Result<Vec<Phase>, Error>;
    async fn upsert(&mut self, name: PhaseName, is_open: bool, at: DateTime<Utc>) -> Result<(), Error>;
}

pub trait FeedbackCommon {
    async fn insert(&mut self, data: FeedbackInsert) -> Result<Feedback, Error>;
    async fn query(&mut self, pagination: Option<Pagination>) -> Result<Vec<Feedback>, Error>;
    async fn count(&mut self) -> Result<i64, Error>;
    async fn delete(&mut self, id: i32) -> Result<u64, Error>;
}

pub trait Common:
    UserCommon + IdeaCommon + IdeaVoteCommon + TeamCommon + ProjectCommon + ShowcaseVoteCommon + JudgeVoteCommon + PhaseCommon + FeedbackCommon
{
}

pub trait Store: Common {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}

pub trait Manager<'m, S, T>
where
    S: Store,
    T: TxStore,
{
    async fn db(&'m self) -> Result<S, Error>;
    async fn tx(&'m self) -> Result<T, Error>;
}
