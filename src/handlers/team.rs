use actix_web::web::{Data, Json, Path};

use crate::config::Config;
use crate::context::UserInfo;
use crate::core::models::phase::PhaseName;
use crate::core::models::team::{Create, Team, TeamDetail};
use crate::core::phase_cache::PhaseCache;
use crate::core::ports::repository::Manager;
use crate::core::services::{phase, team};
use crate::error::Error;
use crate::handlers::DB;
use crate::response::Empty;

pub async fn list(user_info: UserInfo, db: DB) -> Result<Json<Vec<TeamDetail>>, Error> {
    let mut store = db.db().await?;
    Ok(Json(team::list(&mut store, user_info.id).await?))
}

pub async fn create(user_info: UserInfo, Json(body): Json<Create>, db: DB, phases: Data<PhaseCache>, config: Data<Config>) -> Result<Json<Team>, Error> {
    phase::ensure_open(&phases, &mut db.db().await?, PhaseName::TeamsOpen).await?;
    Ok(Json(team::create(db.tx().await?, user_info.id, body, config.team_rules).await?))
}

pub async fn join(user_info: UserInfo, id: Path<(i32,)>, db: DB, phases: Data<PhaseCache>) -> Result<Json<Team>, Error> {
    phase::ensure_open(&phases, &mut db.db().await?, PhaseName::TeamsOpen).await?;
    Ok(Json(team::join(db.tx().await?, id.into_inner().0, user_info.id).await?))
}

pub async fn leave(user_info: UserInfo, id: Path<(i32,)>, db: DB) -> Result<Json<Empty>, Error> {
    let mut store = db.db().await?;
    team::leave(&mut store, id.into_inner().0, user_info.id).await?;
    Ok(Json(Empty {}))
}
