use actix_web::web::{Data, Json, Path, Query};
use serde::{Deserialize, Serialize};

use crate::context::UserInfo;
use crate::core::models::idea::{Create, Idea, IdeaWithVotes, VoteCount};
use crate::core::models::phase::PhaseName;
use crate::core::pending_votes::PendingVotes;
use crate::core::phase_cache::PhaseCache;
use crate::core::ports::repository::Manager;
use crate::core::services::{idea, phase};
use crate::error::Error;
use crate::handlers::DB;
use crate::request::Pagination;
use crate::response::List;

#[derive(Debug, Deserialize)]
pub struct SetVotes {
    pub target: i64,
}

#[derive(Debug, Deserialize)]
pub struct Click {
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct PendingCount {
    pub pending_count: i64,
}

pub async fn list(user_info: UserInfo, Query(page): Query<Pagination>, db: DB, pending: Data<PendingVotes>) -> Result<Json<List<IdeaWithVotes>>, Error> {
    let mut store = db.db().await?;
    let (mut ideas, total) = idea::list(&mut store, user_info.id, page.window()).await?;
    for i in ideas.iter_mut() {
        i.pending_votes = pending.pending_target(i.idea.id, user_info.id);
    }
    Ok(Json(List::new(ideas, total)))
}

pub async fn create(user_info: UserInfo, Json(body): Json<Create>, db: DB, phases: Data<PhaseCache>) -> Result<Json<Idea>, Error> {
    let mut store = db.db().await?;
    phase::ensure_open(&phases, &mut store, PhaseName::IdeasOpen).await?;
    Ok(Json(idea::submit(&mut store, user_info.id, body).await?))
}

async fn voting_open(db: &DB, phases: &PhaseCache) -> Result<(), Error> {
    let mut store = db.db().await?;
    phase::ensure_open(phases, &mut store, PhaseName::IdeasVoting).await
}

pub async fn vote(user_info: UserInfo, id: Path<(i32,)>, db: DB, phases: Data<PhaseCache>) -> Result<Json<VoteCount>, Error> {
    voting_open(&db, &phases).await?;
    Ok(Json(idea::vote(db.tx().await?, id.into_inner().0, user_info.id).await?))
}

pub async fn unvote(user_info: UserInfo, id: Path<(i32,)>, db: DB, phases: Data<PhaseCache>) -> Result<Json<VoteCount>, Error> {
    voting_open(&db, &phases).await?;
    Ok(Json(idea::unvote(db.tx().await?, id.into_inner().0, user_info.id).await?))
}

pub async fn set_votes(user_info: UserInfo, id: Path<(i32,)>, Json(body): Json<SetVotes>, db: DB, phases: Data<PhaseCache>) -> Result<Json<VoteCount>, Error> {
    voting_open(&db, &phases).await?;
    Ok(Json(idea::set_vote_count(db.tx().await?, id.into_inner().0, user_info.id, body.target).await?))
}

/// One vote click, coalesced with the caller's other clicks on the same idea.
pub async fn click(
    user_info: UserInfo,
    id: Path<(i32,)>,
    Json(body): Json<Click>,
    db: DB,
    phases: Data<PhaseCache>,
    pending: Data<PendingVotes>,
) -> Result<Json<PendingCount>, Error> {
    if body.delta != 1 && body.delta != -1 {
        return Err(Error::BusinessError("delta must be 1 or -1".into()));
    }
    voting_open(&db, &phases).await?;
    let idea_id = id.into_inner().0;
    let user_id = user_info.id;
    let server_count = idea::my_votes(&mut db.db().await?, idea_id, user_id).await?;
    let manager = db.clone();
    let pending_count = pending.adjust(idea_id, user_id, body.delta, server_count, move |target| async move {
        let count = idea::set_vote_count(manager.tx().await?, idea_id, user_id, target).await?;
        Ok(count.current_count)
    });
    Ok(Json(PendingCount { pending_count }))
}
