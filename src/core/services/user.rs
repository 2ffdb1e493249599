use chrono::{DateTime, Utc};

use crate::core::models::user::User;
use crate::core::ports::repository::{Store, UserCommon};
use crate::error::Error;

/// Resolves a display name to its user, creating the user on first sight.
pub async fn login<S>(store: &mut S, name: &str, now: DateTime<Utc>) -> Result<User, Error>
where
    S: Store,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::BusinessError("name must not be blank".into()));
    }
    if let Some(mut user) = UserCommon::get_by_name(store, name).await? {
        UserCommon::touch(store, user.id, now).await?;
        user.last_seen_at = now;
        return Ok(user);
    }
    let user = UserCommon::insert(store, name).await?;
    log::info!("created user {} ({})", user.id, user.name);
    Ok(user)
}

pub async fn current<S>(store: &mut S, id: i32, now: DateTime<Utc>) -> Result<User, Error>
where
    S: Store,
{
    let mut user = UserCommon::get(store, id).await?;
    UserCommon::touch(store, id, now).await?;
    user.last_seen_at = now;
    Ok(user)
}
