mod config;
mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod middlewares;
mod request;
mod response;
#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::Logger;
use actix_web::web::{delete, get, post, put, resource, scope, Data};
use actix_web::{App, HttpServer};
use mockable::{Clock, DefaultClock};
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::core::pending_votes::PendingVotes;
use crate::core::phase_cache::PhaseCache;
use crate::core::services::event::EventCache;
use crate::core::tokener::Role;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::content::strapi::Strapi;
use crate::middlewares::jwt::JWTMiddleware;

const CONTENT_TIMEOUT: Duration = Duration::from_secs(10);

#[actix_web::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,actix_web=info")).init();
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
    let strapi = match &config.content_base_url {
        Some(url) => Some(Strapi::new(url, CONTENT_TIMEOUT)?),
        None => {
            log::warn!("CONTENT_BASE_URL not set, event metadata disabled");
            None
        }
    };
    let events = Data::new(EventCache::new(strapi, clock.clone(), config.content_cache_ttl));
    let phases = Data::new(PhaseCache::new(clock.clone(), config.schedule.clone(), config.phase_cache_ttl));
    let manager = Data::new(PgSqlxManager::new(pool));
    let clock: Data<dyn Clock + Send + Sync> = Data::from(clock);
    let secret = config.jwt_secret.clone().into_bytes();
    let debounce = config.vote_debounce;
    let bind_addr = config.bind_addr.clone();
    let config = Data::new(config);

    log::info!("listening on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(manager.clone())
            .app_data(phases.clone())
            .app_data(events.clone())
            .app_data(clock.clone())
            .app_data(config.clone())
            .app_data(Data::new(PendingVotes::new(debounce)))
            .service(resource("/login").route(post().to(handlers::user::login)))
            .service(resource("/judges/login").route(post().to(handlers::judge::login)))
            .service(resource("/admin/login").route(post().to(handlers::admin::login)))
            .service(resource("/event").route(get().to(handlers::event::current)))
            .service(resource("/phases").route(get().to(handlers::event::phases)))
            .service(
                scope("/judging")
                    .wrap(JWTMiddleware::new(secret.clone(), Role::Judge))
                    .route("/projects", get().to(handlers::judge::projects))
                    .service(
                        resource("/projects/{id}/rank")
                            .route(put().to(handlers::judge::rank))
                            .route(delete().to(handlers::judge::unrank)),
                    ),
            )
            .service(
                scope("/admin")
                    .wrap(JWTMiddleware::new(secret.clone(), Role::Admin))
                    .route("/phases", get().to(handlers::admin::phases))
                    .route("/phases/{name}", put().to(handlers::admin::toggle_phase))
                    .route("/ideas/{id}/lock", post().to(handlers::admin::lock_idea))
                    .route("/ideas/{id}", delete().to(handlers::admin::delete_idea))
                    .route("/projects/{id}/score", put().to(handlers::admin::set_score))
                    .route("/winners", post().to(handlers::admin::reveal_winners))
                    .route("/feedback", get().to(handlers::feedback::list))
                    .route("/feedback/{id}", delete().to(handlers::feedback::delete)),
            )
            .service(
                scope("")
                    .wrap(JWTMiddleware::new(secret.clone(), Role::Participant))
                    .route("/me", get().to(handlers::user::me))
                    .service(
                        scope("/ideas")
                            .route("", get().to(handlers::idea::list))
                            .route("", post().to(handlers::idea::create))
                            .service(
                                resource("/{id}/votes")
                                    .route(post().to(handlers::idea::vote))
                                    .route(delete().to(handlers::idea::unvote))
                                    .route(put().to(handlers::idea::set_votes)),
                            )
                            .route("/{id}/votes/pending", post().to(handlers::idea::click)),
                    )
                    .service(
                        scope("/teams")
                            .route("", get().to(handlers::team::list))
                            .route("", post().to(handlers::team::create))
                            .service(
                                resource("/{id}/members")
                                    .route(post().to(handlers::team::join))
                                    .route(delete().to(handlers::team::leave)),
                            ),
                    )
                    .service(
                        scope("/projects")
                            .route("", get().to(handlers::project::list))
                            .route("", post().to(handlers::project::create))
                            .service(
                                resource("/{id}/showcase-votes")
                                    .route(put().to(handlers::project::vote))
                                    .route(delete().to(handlers::project::unvote)),
                            )
                            .route("/{id}/showcase-votes/toggle", post().to(handlers::project::toggle)),
                    )
                    .route("/winners", get().to(handlers::project::winners))
                    .route("/feedback", post().to(handlers::feedback::submit)),
            )
    })
    .bind(bind_addr)?
    .run()
    .await?;
    Ok(())
}
