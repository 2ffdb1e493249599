use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error as ThisError;

use crate::core::models::phase::PhaseName;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BusinessError(String),

    #[error("{0} is closed")]
    PhaseClosed(PhaseName),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("jwt error: {0}")]
    JWTError(#[from] jsonwebtoken::errors::Error),

    #[error("content service error: {0}")]
    ContentError(#[from] reqwest::Error),

    #[error("dotenv error: {0}")]
    DotEnvError(#[from] dotenv::Error),

    #[error("invalid config {0}: {1}")]
    ConfigError(String, String),

    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("server error: {0}")]
    ServerError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Maps a unique-constraint violation to `Duplicate`, everything else to `DatabaseError`.
    pub fn from_insert(err: sqlx::Error, duplicate: &str) -> Self {
        if is_unique_violation(&err) {
            return Error::Duplicate(duplicate.into());
        }
        Error::DatabaseError(err)
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Duplicate(_))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(e) => e.code().map(|c| c == UNIQUE_VIOLATION).unwrap_or(false),
        _ => false,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::DatabaseError(sqlx::Error::RowNotFound) | Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Duplicate(_) => StatusCode::CONFLICT,
            Error::BusinessError(_) => StatusCode::BAD_REQUEST,
            Error::PhaseClosed(_) | Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Unauthorized | Error::JWTError(_) => StatusCode::UNAUTHORIZED,
            Error::ContentError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}
