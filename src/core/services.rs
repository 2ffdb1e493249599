pub mod admin;
pub mod event;
pub mod feedback;
pub mod idea;
pub mod judge;
pub mod phase;
pub mod project;
pub mod team;
pub mod user;
pub mod winner;

use crate::core::ports::repository::TxStore;
use crate::error::Error;

/// Commits on success, rolls back on failure and hands the result through.
pub(crate) async fn finish<T, R>(tx: T, result: Result<R, Error>) -> Result<R, Error>
where
    T: TxStore,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                log::error!("failed to rollback transaction: {}", rollback);
            }
            Err(e)
        }
    }
}
