use std::collections::HashMap;

use crate::core::models::common::Pagination;
use crate::core::models::idea::{clamp_votes, Create, Idea, IdeaWithVotes, Insert, VoteCount};
use crate::core::ports::repository::{IdeaCommon, IdeaVoteCommon, Store, TxStore};
use crate::core::services::finish;
use crate::error::Error;

pub async fn submit<S>(store: &mut S, user_id: i32, create: Create) -> Result<Idea, Error>
where
    S: Store,
{
    let title = create.title.trim();
    let description = create.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(Error::BusinessError("title and description are required".into()));
    }
    let idea = IdeaCommon::insert(
        store,
        Insert {
            title: title.into(),
            description: description.into(),
            user_id,
        },
    )
    .await?;
    log::info!("user {} submitted idea {}", user_id, idea.id);
    Ok(idea)
}

/// Ideas by vote count with the caller's own token count on each.
pub async fn list<S>(store: &mut S, user_id: i32, pagination: Option<Pagination>) -> Result<(Vec<IdeaWithVotes>, i64), Error>
where
    S: Store,
{
    let total = IdeaCommon::count(store).await?;
    let ideas = IdeaCommon::query(store, pagination).await?;
    let mine: HashMap<i32, i64> = IdeaVoteCommon::tallies(store, user_id).await?.into_iter().map(|t| (t.idea_id, t.count)).collect();
    let list = ideas
        .into_iter()
        .map(|idea| IdeaWithVotes {
            my_votes: mine.get(&idea.id).copied().unwrap_or(0),
            idea,
            pending_votes: None,
        })
        .collect();
    Ok((list, total))
}

/// The caller's live tokens on an idea that still accepts votes.
pub async fn my_votes<S>(store: &mut S, idea_id: i32, user_id: i32) -> Result<i64, Error>
where
    S: Store,
{
    if IdeaCommon::get(store, idea_id).await?.is_locked {
        return Err(Error::BusinessError("idea is locked".into()));
    }
    IdeaVoteCommon::count(store, idea_id, user_id).await
}

async fn reconcile<S, F>(store: &mut S, idea_id: i32, user_id: i32, target: F) -> Result<VoteCount, Error>
where
    S: Store,
    F: FnOnce(i64) -> i64,
{
    // serialises writers on the idea so the count below stays current until commit
    let idea = IdeaCommon::get_for_update(store, idea_id).await?;
    let current = IdeaVoteCommon::count(store, idea_id, user_id).await?;
    let target = clamp_votes(target(current));
    let diff = target - current;
    if diff == 0 {
        return Ok(VoteCount { current_count: current });
    }
    if idea.is_locked {
        return Err(Error::BusinessError("idea is locked".into()));
    }
    if diff > 0 {
        IdeaVoteCommon::insert_many(store, idea_id, user_id, diff).await?;
    } else {
        IdeaVoteCommon::delete_latest(store, idea_id, user_id, -diff).await?;
    }
    log::debug!("user {} now holds {} votes on idea {}", user_id, target, idea_id);
    Ok(VoteCount { current_count: target })
}

/// Brings the caller's live tokens on the idea to `clamp(target, 0, 5)`:
/// inserts the shortfall or removes the newest surplus tokens.
pub async fn set_vote_count<T>(mut tx: T, idea_id: i32, user_id: i32, target: i64) -> Result<VoteCount, Error>
where
    T: TxStore,
{
    let result = reconcile(&mut tx, idea_id, user_id, |_| target).await;
    finish(tx, result).await
}

pub async fn vote<T>(mut tx: T, idea_id: i32, user_id: i32) -> Result<VoteCount, Error>
where
    T: TxStore,
{
    let result = reconcile(&mut tx, idea_id, user_id, |current| current + 1).await;
    finish(tx, result).await
}

pub async fn unvote<T>(mut tx: T, idea_id: i32, user_id: i32) -> Result<VoteCount, Error>
where
    T: TxStore,
{
    let result = reconcile(&mut tx, idea_id, user_id, |current| current - 1).await;
    finish(tx, result).await
}

pub async fn lock<S>(store: &mut S, id: i32) -> Result<(), Error>
where
    S: Store,
{
    if IdeaCommon::lock(store, id).await? == 0 {
        return Err(Error::NotFound(format!("idea {}", id)));
    }
    log::info!("locked idea {}", id);
    Ok(())
}

pub async fn delete<S>(store: &mut S, id: i32) -> Result<(), Error>
where
    S: Store,
{
    if IdeaCommon::delete(store, id).await? == 0 {
        return Err(Error::NotFound(format!("idea {}", id)));
    }
    log::info!("deleted idea {}", id);
    Ok(())
}
