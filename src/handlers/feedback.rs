use actix_web::web::{Json, Path, Query};

use crate::context::{AdminInfo, UserInfo};
use crate::core::models::feedback::{Feedback, Submit};
use crate::core::ports::repository::Manager;
use crate::core::services::feedback;
use crate::error::Error;
use crate::handlers::DB;
use crate::request::Pagination;
use crate::response::{Empty, List};

pub async fn submit(user_info: UserInfo, Json(body): Json<Submit>, db: DB) -> Result<Json<Feedback>, Error> {
    let mut store = db.db().await?;
    Ok(Json(feedback::submit(&mut store, user_info.id, body).await?))
}

pub async fn list(_: AdminInfo, Query(page): Query<Pagination>, db: DB) -> Result<Json<List<Feedback>>, Error> {
    let mut store = db.db().await?;
    let (list, total) = feedback::list(&mut store, page.window()).await?;
    Ok(Json(List::new(list, total)))
}

pub async fn delete(_: AdminInfo, id: Path<(i32,)>, db: DB) -> Result<Json<Empty>, Error> {
    let mut store = db.db().await?;
    feedback::delete(&mut store, id.into_inner().0).await?;
    Ok(Json(Empty {}))
}
