use crate::core::models::phase::{Phase, PhaseName, PhaseState};
use crate::core::phase_cache::PhaseCache;
use crate::core::ports::repository::{PhaseCommon, Store};
use crate::error::Error;

/// Fails with `PhaseClosed` unless the phase is open by flag or by date.
pub async fn ensure_open<S>(cache: &PhaseCache, store: &mut S, phase: PhaseName) -> Result<(), Error>
where
    S: Store,
{
    if !cache.is_open(store, phase).await? {
        return Err(Error::PhaseClosed(phase));
    }
    Ok(())
}

pub async fn toggle<S>(cache: &PhaseCache, store: &mut S, phase: PhaseName, is_open: bool) -> Result<(), Error>
where
    S: Store,
{
    PhaseCommon::upsert(store, phase, is_open, cache.now()).await?;
    cache.invalidate();
    log::info!("phase {} {}", phase, if is_open { "opened" } else { "closed" });
    Ok(())
}

pub async fn list<S>(store: &mut S) -> Result<Vec<Phase>, Error>
where
    S: Store,
{
    PhaseCommon::query(store).await
}

/// Flag and effective state of every phase, effective including the date fallback.
pub async fn states<S>(cache: &PhaseCache, store: &mut S) -> Result<Vec<PhaseState>, Error>
where
    S: Store,
{
    let flags = cache.flags(store).await?;
    let now = cache.now();
    Ok(PhaseName::ALL
        .into_iter()
        .map(|name| {
            let is_open = flags.get(&name).copied().unwrap_or(false);
            PhaseState {
                name,
                is_open,
                effective: is_open || cache.schedule().is_open_at(name, now),
            }
        })
        .collect())
}
