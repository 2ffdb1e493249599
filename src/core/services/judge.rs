use std::collections::HashMap;

use crate::core::models::judge::{JudgeVote, JudgedProject, Rank};
use crate::core::models::project::{Order, Query};
use crate::core::ports::repository::{JudgeVoteCommon, ProjectCommon, Store, TxStore};
use crate::core::services::finish;
use crate::error::Error;

/// Normalised judge name when it is on the allow-list.
pub fn login(judges: &[String], name: &str) -> Result<String, Error> {
    let name = name.trim().to_lowercase();
    if name.is_empty() || !judges.contains(&name) {
        return Err(Error::Forbidden("not a registered judge".into()));
    }
    Ok(name)
}

async fn change_rank_in<S>(store: &mut S, judge: &str, project_id: i32, rank: Option<Rank>) -> Result<Vec<JudgeVote>, Error>
where
    S: Store,
{
    ProjectCommon::get(store, project_id).await?;
    match rank {
        None => {
            JudgeVoteCommon::delete_by_project(store, project_id, judge).await?;
        }
        Some(rank) => {
            if JudgeVoteCommon::delete_by_rank(store, judge, rank).await? > 0 {
                log::debug!("judge {} moved rank {} to project {}", judge, rank.value(), project_id);
            }
            JudgeVoteCommon::delete_by_project(store, project_id, judge).await?;
            JudgeVoteCommon::insert(
                store,
                JudgeVote {
                    project_id,
                    judge_name: judge.into(),
                    rank,
                },
            )
            .await?;
        }
    }
    JudgeVoteCommon::query(store, judge).await
}

/// Gives `project_id` the judge's `rank`, taking it from whichever project
/// held it; `None` clears the project's rank. Returns the judge's ledger.
pub async fn change_rank<T>(mut tx: T, judge: &str, project_id: i32, rank: Option<Rank>) -> Result<Vec<JudgeVote>, Error>
where
    T: TxStore,
{
    let result = change_rank_in(&mut tx, judge, project_id, rank).await;
    finish(tx, result).await
}

pub async fn vote_rank<T>(tx: T, judge: &str, project_id: i32, rank: Rank) -> Result<Vec<JudgeVote>, Error>
where
    T: TxStore,
{
    change_rank(tx, judge, project_id, Some(rank)).await
}

pub async fn unvote_rank<T>(tx: T, judge: &str, project_id: i32) -> Result<Vec<JudgeVote>, Error>
where
    T: TxStore,
{
    change_rank(tx, judge, project_id, None).await
}

/// All projects by weighted judge votes, with this judge's own ranks.
pub async fn projects<S>(store: &mut S, judge: &str) -> Result<Vec<JudgedProject>, Error>
where
    S: Store,
{
    let ranks: HashMap<i32, Rank> = JudgeVoteCommon::query(store, judge).await?.into_iter().map(|v| (v.project_id, v.rank)).collect();
    let projects = ProjectCommon::query(
        store,
        &Query {
            order: Order::JudgeVotes,
            ..Default::default()
        },
    )
    .await?;
    Ok(projects
        .into_iter()
        .map(|project| JudgedProject {
            my_rank: ranks.get(&project.id).copied(),
            project,
        })
        .collect())
}
