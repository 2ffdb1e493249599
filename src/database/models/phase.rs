use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::core::models::phase::Phase;
use crate::error::Error;

#[derive(Debug, FromRow)]
pub struct PhaseRow {
    pub phase_name: String,
    pub is_open: bool,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PhaseRow> for Phase {
    type Error = Error;

    fn try_from(row: PhaseRow) -> Result<Self, Self::Error> {
        Ok(Phase {
            name: row.phase_name.parse()?,
            is_open: row.is_open,
            updated_at: row.updated_at,
        })
    }
}
