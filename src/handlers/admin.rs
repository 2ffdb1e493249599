use actix_web::web::{Data, Json, Path};
use serde::Deserialize;

use crate::config::Config;
use crate::context::AdminInfo;
use crate::core::models::phase::{Phase, PhaseName, Toggle};
use crate::core::models::project::Award;
use crate::core::phase_cache::PhaseCache;
use crate::core::ports::repository::Manager;
use crate::core::services::{admin, idea, phase, project, winner};
use crate::core::tokener::Role;
use crate::error::Error;
use crate::handlers::{issue_token, DB};
use crate::response::{Empty, Session};

#[derive(Debug, Deserialize)]
pub struct Login {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Score {
    pub score: f64,
}

pub async fn login(Json(body): Json<Login>, config: Data<Config>) -> Result<Json<Session<Empty>>, Error> {
    admin::login(config.admin_password.as_deref(), &body.password)?;
    let token = issue_token(&config, "admin".into(), Role::Admin)?;
    log::info!("admin logged in");
    Ok(Json(Session {
        token,
        role: Role::Admin,
        profile: Empty {},
    }))
}

pub async fn phases(_: AdminInfo, db: DB) -> Result<Json<Vec<Phase>>, Error> {
    let mut store = db.db().await?;
    Ok(Json(phase::list(&mut store).await?))
}

pub async fn toggle_phase(_: AdminInfo, name: Path<(String,)>, Json(body): Json<Toggle>, db: DB, phases: Data<PhaseCache>) -> Result<Json<Empty>, Error> {
    let name: PhaseName = name.into_inner().0.parse()?;
    let mut store = db.db().await?;
    phase::toggle(&phases, &mut store, name, body.is_open).await?;
    Ok(Json(Empty {}))
}

pub async fn lock_idea(_: AdminInfo, id: Path<(i32,)>, db: DB) -> Result<Json<Empty>, Error> {
    let mut store = db.db().await?;
    idea::lock(&mut store, id.into_inner().0).await?;
    Ok(Json(Empty {}))
}

pub async fn delete_idea(_: AdminInfo, id: Path<(i32,)>, db: DB) -> Result<Json<Empty>, Error> {
    let mut store = db.db().await?;
    idea::delete(&mut store, id.into_inner().0).await?;
    Ok(Json(Empty {}))
}

pub async fn set_score(_: AdminInfo, id: Path<(i32,)>, Json(body): Json<Score>, db: DB) -> Result<Json<Empty>, Error> {
    let mut store = db.db().await?;
    project::set_judges_score(&mut store, id.into_inner().0, body.score).await?;
    Ok(Json(Empty {}))
}

pub async fn reveal_winners(_: AdminInfo, db: DB, phases: Data<PhaseCache>) -> Result<Json<Vec<Award>>, Error> {
    Ok(Json(winner::reveal(db.tx().await?, &phases).await?))
}
