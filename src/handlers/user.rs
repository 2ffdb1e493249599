use actix_web::web::{Data, Json};

use crate::config::Config;
use crate::context::UserInfo;
use crate::core::models::user::{Login, User};
use crate::core::ports::repository::Manager;
use crate::core::services::user;
use crate::core::tokener::Role;
use crate::error::Error;
use crate::handlers::{issue_token, Clock, DB};
use crate::response::Session;

pub async fn login(Json(body): Json<Login>, db: DB, clock: Clock, config: Data<Config>) -> Result<Json<Session<User>>, Error> {
    let mut store = db.db().await?;
    let user = user::login(&mut store, &body.name, clock.utc()).await?;
    let token = issue_token(&config, user.id.to_string(), Role::Participant)?;
    Ok(Json(Session {
        token,
        role: Role::Participant,
        profile: user,
    }))
}

pub async fn me(user_info: UserInfo, db: DB, clock: Clock) -> Result<Json<User>, Error> {
    let mut store = db.db().await?;
    let user = user::current(&mut store, user_info.id, clock.utc()).await?;
    Ok(Json(user))
}
