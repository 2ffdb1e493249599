use crate::core::models::common::Pagination;
use crate::core::models::team::{Create, Insert, Team, TeamDetail};
use crate::core::ports::repository::{IdeaCommon, Store, TeamCommon, TxStore};
use crate::core::services::finish;
use crate::error::Error;

#[derive(Debug, Clone, Copy)]
pub struct Rules {
    pub max_members: i32,
    /// Only this many top-voted ideas may have teams formed around them.
    pub eligible_ideas: i64,
}

async fn create_in<S>(store: &mut S, leader_id: i32, create: Create, rules: Rules) -> Result<Team, Error>
where
    S: Store,
{
    let name = create.name.trim();
    if name.is_empty() {
        return Err(Error::BusinessError("team name is required".into()));
    }
    let idea = IdeaCommon::get(store, create.idea_id).await?;
    let top = IdeaCommon::query(store, Some(Pagination::new(rules.eligible_ideas, None))).await?;
    if !top.iter().any(|i| i.id == idea.id) {
        return Err(Error::BusinessError(format!("only the top {} ideas can form teams", rules.eligible_ideas)));
    }
    if TeamCommon::exists_for_idea(store, idea.id).await? {
        return Err(Error::Duplicate("A team already exists for this idea".into()));
    }
    let mut team = TeamCommon::insert(
        store,
        Insert {
            name: name.into(),
            description: create.description.trim().into(),
            leader_id,
            idea_id: idea.id,
            max_members: rules.max_members,
        },
    )
    .await?;
    TeamCommon::add_member(store, team.id, leader_id).await?;
    team.member_count = 1;
    Ok(team)
}

/// Creates the team and its leader's membership as one unit.
pub async fn create<T>(mut tx: T, leader_id: i32, create: Create, rules: Rules) -> Result<Team, Error>
where
    T: TxStore,
{
    let result = create_in(&mut tx, leader_id, create, rules).await;
    let team = finish(tx, result).await?;
    log::info!("user {} formed team {} around idea {}", leader_id, team.id, team.idea_id);
    Ok(team)
}

async fn join_in<S>(store: &mut S, team_id: i32, user_id: i32) -> Result<Team, Error>
where
    S: Store,
{
    let team = TeamCommon::get_for_update(store, team_id).await?;
    if TeamCommon::is_member(store, team_id, user_id).await? {
        return Ok(team);
    }
    if team.is_full() {
        return Err(Error::BusinessError("team is full".into()));
    }
    match TeamCommon::add_member(store, team_id, user_id).await {
        Err(e) if e.is_duplicate() => log::debug!("user {} already in team {}", user_id, team_id),
        other => other?,
    }
    TeamCommon::get(store, team_id).await
}

/// Joining a team twice is a no-op; joining a full team is refused.
pub async fn join<T>(mut tx: T, team_id: i32, user_id: i32) -> Result<Team, Error>
where
    T: TxStore,
{
    let result = join_in(&mut tx, team_id, user_id).await;
    finish(tx, result).await
}

pub async fn leave<S>(store: &mut S, team_id: i32, user_id: i32) -> Result<(), Error>
where
    S: Store,
{
    let team = TeamCommon::get(store, team_id).await?;
    if team.leader_id == user_id {
        return Err(Error::Forbidden("team leaders cannot leave their own team".into()));
    }
    if TeamCommon::remove_member(store, team_id, user_id).await? == 0 {
        return Err(Error::NotFound(format!("membership in team {}", team_id)));
    }
    log::info!("user {} left team {}", user_id, team_id);
    Ok(())
}

pub async fn list<S>(store: &mut S, user_id: i32) -> Result<Vec<TeamDetail>, Error>
where
    S: Store,
{
    let teams = TeamCommon::query(store).await?;
    let mut details = Vec::with_capacity(teams.len());
    for team in teams {
        let members = TeamCommon::members(store, team.id).await?;
        let is_member = members.iter().any(|m| m.user_id == user_id);
        details.push(TeamDetail { team, members, is_member });
    }
    Ok(details)
}
