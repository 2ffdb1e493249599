use actix_web::web::{Data, Json};

use crate::core::models::event::Event;
use crate::core::models::phase::PhaseState;
use crate::core::phase_cache::PhaseCache;
use crate::core::ports::repository::Manager;
use crate::core::services::{event::EventCache, phase};
use crate::error::Error;
use crate::handlers::DB;
use crate::impls::content::strapi::Strapi;

pub async fn current(events: Data<EventCache<Strapi>>) -> Result<Json<Option<Event>>, Error> {
    Ok(Json(events.current().await?))
}

pub async fn phases(db: DB, phases: Data<PhaseCache>) -> Result<Json<Vec<PhaseState>>, Error> {
    let mut store = db.db().await?;
    Ok(Json(phase::states(&phases, &mut store).await?))
}
