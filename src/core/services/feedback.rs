use crate::core::models::common::Pagination;
use crate::core::models::feedback::{Feedback, Insert, Submit};
use crate::core::ports::repository::{FeedbackCommon, ProjectCommon, Store};
use crate::error::Error;

pub async fn submit<S>(store: &mut S, user_id: i32, submit: Submit) -> Result<Feedback, Error>
where
    S: Store,
{
    let description = submit.description.trim();
    if description.is_empty() {
        return Err(Error::BusinessError("feedback description is required".into()));
    }
    if let Some(project_id) = submit.project_id {
        ProjectCommon::get(store, project_id).await?;
    }
    let feedback = FeedbackCommon::insert(
        store,
        Insert {
            user_id,
            project_id: submit.project_id,
            category: submit.category,
            description: description.into(),
            severity: submit.severity,
        },
    )
    .await?;
    log::info!("user {} left {} feedback {}", user_id, feedback.category.as_str(), feedback.id);
    Ok(feedback)
}

pub async fn list<S>(store: &mut S, pagination: Option<Pagination>) -> Result<(Vec<Feedback>, i64), Error>
where
    S: Store,
{
    let total = FeedbackCommon::count(store).await?;
    let list = FeedbackCommon::query(store, pagination).await?;
    Ok((list, total))
}

pub async fn delete<S>(store: &mut S, id: i32) -> Result<(), Error>
where
    S: Store,
{
    if FeedbackCommon::delete(store, id).await? == 0 {
        return Err(Error::NotFound(format!("feedback {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::models::feedback::{Category, Severity};
    use crate::database::memory::MemStore;

    fn note(description: &str, project_id: Option<i32>) -> Submit {
        Submit {
            category: Category::Apis,
            description: description.into(),
            severity: Some(Severity::High),
            project_id,
        }
    }

    #[tokio::test]
    async fn test_submit_list_delete() {
        let mut store = MemStore::new();
        let first = submit(&mut store, 1, note("rate limits are unclear", None)).await.unwrap();
        let second = submit(&mut store, 2, note("sdk panics on retry", None)).await.unwrap();

        let (list, total) = list(&mut store, Some(Pagination::new(1, None))).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, second.id);

        delete(&mut store, first.id).await.unwrap();
        assert!(matches!(delete(&mut store, first.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let mut store = MemStore::new();
        assert!(matches!(submit(&mut store, 1, note("  ", None)).await, Err(Error::BusinessError(_))));
        assert!(matches!(submit(&mut store, 1, note("about a project", Some(404))).await, Err(Error::NotFound(_))));
    }
}
