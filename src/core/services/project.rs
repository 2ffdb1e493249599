use std::collections::HashSet;

use crate::core::models::project::{Order, Project, ProjectWithVote, Query, Submit, Toggled};
use crate::core::ports::repository::{ProjectCommon, ShowcaseVoteCommon, Store, TeamCommon};
use crate::error::Error;

pub async fn submit<S>(store: &mut S, user_id: i32, submit: Submit) -> Result<Project, Error>
where
    S: Store,
{
    if submit.title.trim().is_empty() {
        return Err(Error::BusinessError("project title is required".into()));
    }
    TeamCommon::get(store, submit.team_id).await?;
    if !TeamCommon::is_member(store, submit.team_id, user_id).await? {
        return Err(Error::Forbidden("only team members can submit a project".into()));
    }
    let project = ProjectCommon::insert(
        store,
        Submit {
            title: submit.title.trim().into(),
            ..submit
        },
    )
    .await?;
    log::info!("team {} submitted project {}", project.team_id, project.id);
    Ok(project)
}

pub async fn list<S>(store: &mut S, user_id: i32, order: Order) -> Result<Vec<ProjectWithVote>, Error>
where
    S: Store,
{
    let projects = ProjectCommon::query(store, &Query { order, ..Default::default() }).await?;
    let voted: HashSet<i32> = ShowcaseVoteCommon::voted_projects(store, user_id).await?.into_iter().collect();
    Ok(projects
        .into_iter()
        .map(|project| ProjectWithVote {
            voted: voted.contains(&project.id),
            project,
        })
        .collect())
}

/// Casts the caller's single showcase vote; voting twice is harmless.
pub async fn vote<S>(store: &mut S, project_id: i32, user_id: i32) -> Result<Toggled, Error>
where
    S: Store,
{
    ProjectCommon::get(store, project_id).await?;
    match ShowcaseVoteCommon::insert(store, project_id, user_id).await {
        Err(e) if e.is_duplicate() => log::debug!("user {} already voted for project {}", user_id, project_id),
        other => other?,
    }
    Ok(Toggled { voted: true })
}

pub async fn unvote<S>(store: &mut S, project_id: i32, user_id: i32) -> Result<Toggled, Error>
where
    S: Store,
{
    ShowcaseVoteCommon::delete(store, project_id, user_id).await?;
    Ok(Toggled { voted: false })
}

pub async fn toggle<S>(store: &mut S, project_id: i32, user_id: i32) -> Result<Toggled, Error>
where
    S: Store,
{
    if ShowcaseVoteCommon::exists(store, project_id, user_id).await? {
        unvote(store, project_id, user_id).await
    } else {
        vote(store, project_id, user_id).await
    }
}

pub async fn set_judges_score<S>(store: &mut S, project_id: i32, score: f64) -> Result<(), Error>
where
    S: Store,
{
    if !score.is_finite() || score < 0.0 {
        return Err(Error::BusinessError(format!("invalid judges score: {}", score)));
    }
    if ProjectCommon::set_judges_score(store, project_id, score).await? == 0 {
        return Err(Error::NotFound(format!("project {}", project_id)));
    }
    log::info!("project {} judges score set to {}", project_id, score);
    Ok(())
}
