use actix_web::web::{Data, Json, Path, Query};
use serde::Deserialize;

use crate::context::UserInfo;
use crate::core::models::phase::PhaseName;
use crate::core::models::project::{Order, Project, ProjectWithVote, Submit, Toggled};
use crate::core::phase_cache::PhaseCache;
use crate::core::ports::repository::Manager;
use crate::core::services::{phase, project, winner};
use crate::error::Error;
use crate::handlers::DB;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub order: Order,
}

pub async fn list(user_info: UserInfo, Query(query): Query<ListQuery>, db: DB) -> Result<Json<Vec<ProjectWithVote>>, Error> {
    let mut store = db.db().await?;
    Ok(Json(project::list(&mut store, user_info.id, query.order).await?))
}

pub async fn create(user_info: UserInfo, Json(body): Json<Submit>, db: DB, phases: Data<PhaseCache>) -> Result<Json<Project>, Error> {
    let mut store = db.db().await?;
    phase::ensure_open(&phases, &mut store, PhaseName::SubmissionsOpen).await?;
    Ok(Json(project::submit(&mut store, user_info.id, body).await?))
}

pub async fn vote(user_info: UserInfo, id: Path<(i32,)>, db: DB, phases: Data<PhaseCache>) -> Result<Json<Toggled>, Error> {
    let mut store = db.db().await?;
    phase::ensure_open(&phases, &mut store, PhaseName::ShowcaseVoting).await?;
    Ok(Json(project::vote(&mut store, id.into_inner().0, user_info.id).await?))
}

pub async fn unvote(user_info: UserInfo, id: Path<(i32,)>, db: DB, phases: Data<PhaseCache>) -> Result<Json<Toggled>, Error> {
    let mut store = db.db().await?;
    phase::ensure_open(&phases, &mut store, PhaseName::ShowcaseVoting).await?;
    Ok(Json(project::unvote(&mut store, id.into_inner().0, user_info.id).await?))
}

pub async fn toggle(user_info: UserInfo, id: Path<(i32,)>, db: DB, phases: Data<PhaseCache>) -> Result<Json<Toggled>, Error> {
    let mut store = db.db().await?;
    phase::ensure_open(&phases, &mut store, PhaseName::ShowcaseVoting).await?;
    Ok(Json(project::toggle(&mut store, id.into_inner().0, user_info.id).await?))
}

pub async fn winners(db: DB, phases: Data<PhaseCache>) -> Result<Json<Vec<Project>>, Error> {
    let mut store = db.db().await?;
    phase::ensure_open(&phases, &mut store, PhaseName::WinnersRevealed).await?;
    Ok(Json(winner::winners(&mut store).await?))
}
