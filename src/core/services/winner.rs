use crate::core::models::phase::PhaseName;
use crate::core::models::project::{Award, Order, Project, Query, WinnerCategory};
use crate::core::phase_cache::PhaseCache;
use crate::core::ports::repository::{PhaseCommon, ProjectCommon, Store, TxStore};
use crate::core::services::finish;
use crate::error::Error;

/// Places go to the first three of `by_score` in order; Hacker's Choice goes
/// to `top_voted` even when it already holds a place.
///
/// `by_score` may carry a fourth project so a tie at third place can be
/// reported. Ties keep the store's order.
pub fn assign_awards(by_score: &[Project], top_voted: Option<&Project>) -> Vec<Award> {
    if let (Some(third), Some(fourth)) = (by_score.get(2), by_score.get(3)) {
        if third.judges_score == fourth.judges_score {
            log::warn!(
                "projects {} and {} tie for third place at {}; third place goes to {}",
                third.id,
                fourth.id,
                third.judges_score,
                third.id
            );
        }
    }
    let mut awards: Vec<Award> = WinnerCategory::PLACES
        .iter()
        .zip(by_score)
        .map(|(category, project)| Award {
            project_id: project.id,
            category: *category,
        })
        .collect();
    if let Some(project) = top_voted {
        awards.push(Award {
            project_id: project.id,
            category: WinnerCategory::HackersChoice,
        });
    }
    awards
}

async fn reveal_in<S>(store: &mut S, cache: &PhaseCache) -> Result<Vec<Award>, Error>
where
    S: Store,
{
    let by_score = ProjectCommon::query(
        store,
        &Query {
            order: Order::JudgesScore,
            limit: Some(4),
            ..Default::default()
        },
    )
    .await?;
    let by_votes = ProjectCommon::query(
        store,
        &Query {
            order: Order::ShowcaseVotes,
            limit: Some(1),
            ..Default::default()
        },
    )
    .await?;
    let awards = assign_awards(&by_score, by_votes.first());
    ProjectCommon::clear_winners(store).await?;
    for award in &awards {
        ProjectCommon::mark_winner(store, award.project_id, award.category).await?;
    }
    PhaseCommon::upsert(store, PhaseName::WinnersRevealed, true, cache.now()).await?;
    Ok(awards)
}

/// Marks the winners and opens `winners_revealed`. Running it again
/// recomputes from the current scores and votes.
pub async fn reveal<T>(mut tx: T, cache: &PhaseCache) -> Result<Vec<Award>, Error>
where
    T: TxStore,
{
    let result = reveal_in(&mut tx, cache).await;
    let awards = finish(tx, result).await?;
    cache.invalidate();
    for award in &awards {
        log::info!("project {} wins {}", award.project_id, award.category);
    }
    Ok(awards)
}

pub async fn winners<S>(store: &mut S) -> Result<Vec<Project>, Error>
where
    S: Store,
{
    let projects = ProjectCommon::query(
        store,
        &Query {
            order: Order::JudgesScore,
            ..Default::default()
        },
    )
    .await?;
    Ok(projects.into_iter().filter(|p| p.is_winner).collect())
}
