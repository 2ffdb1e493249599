pub mod admin;
pub mod event;
pub mod feedback;
pub mod idea;
pub mod judge;
pub mod project;
pub mod team;
pub mod user;

use actix_web::web::Data;
use mockable::Clock as ClockTrait;

use crate::config::Config;
use crate::core::tokener::{Role, Tokener};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use crate::middlewares::jwt::Claim;

pub type DB = Data<PgSqlxManager>;
pub type Clock = Data<dyn ClockTrait + Send + Sync>;

fn issue_token(config: &Config, subject: String, role: Role) -> Result<String, Error> {
    JWT::new(config.jwt_secret.as_bytes().to_vec()).gen_token(&Claim::new(subject, role, config.token_ttl_hours))
}
