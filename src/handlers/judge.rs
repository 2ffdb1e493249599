use actix_web::web::{Data, Json, Path};

use crate::config::Config;
use crate::context::JudgeInfo;
use crate::core::models::judge::{JudgeVote, JudgedProject, Login, RankChange};
use crate::core::ports::repository::Manager;
use crate::core::services::judge;
use crate::core::tokener::Role;
use crate::error::Error;
use crate::handlers::{issue_token, DB};
use crate::response::Session;

pub async fn login(Json(body): Json<Login>, config: Data<Config>) -> Result<Json<Session<String>>, Error> {
    let name = judge::login(&config.judges, &body.name)?;
    let token = issue_token(&config, name.clone(), Role::Judge)?;
    log::info!("judge {} logged in", name);
    Ok(Json(Session {
        token,
        role: Role::Judge,
        profile: name,
    }))
}

pub async fn projects(judge_info: JudgeInfo, db: DB) -> Result<Json<Vec<JudgedProject>>, Error> {
    let mut store = db.db().await?;
    Ok(Json(judge::projects(&mut store, &judge_info.name).await?))
}

pub async fn rank(judge_info: JudgeInfo, id: Path<(i32,)>, Json(body): Json<RankChange>, db: DB) -> Result<Json<Vec<JudgeVote>>, Error> {
    let project_id = id.into_inner().0;
    let ledger = match body.rank {
        Some(rank) => judge::vote_rank(db.tx().await?, &judge_info.name, project_id, rank).await?,
        None => judge::unvote_rank(db.tx().await?, &judge_info.name, project_id).await?,
    };
    Ok(Json(ledger))
}

pub async fn unrank(judge_info: JudgeInfo, id: Path<(i32,)>, db: DB) -> Result<Json<Vec<JudgeVote>>, Error> {
    Ok(Json(judge::unvote_rank(db.tx().await?, &judge_info.name, id.into_inner().0).await?))
}
