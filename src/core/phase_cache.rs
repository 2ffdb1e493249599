use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::core::cache::TtlCell;
use crate::core::models::phase::{PhaseName, Schedule};
use crate::core::ports::repository::{PhaseCommon, Store};
use crate::error::Error;

/// Process-local view of the admin phase flags, refreshed once the
/// freshness window has passed or after `invalidate`.
pub struct PhaseCache {
    clock: Arc<dyn Clock + Send + Sync>,
    schedule: Schedule,
    flags: TtlCell<HashMap<PhaseName, bool>>,
}

impl PhaseCache {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>, schedule: Schedule, ttl: Duration) -> Self {
        Self {
            clock,
            schedule,
            flags: TtlCell::new(ttl),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub async fn flags<S>(&self, store: &mut S) -> Result<HashMap<PhaseName, bool>, Error>
    where
        S: Store,
    {
        let now = self.now();
        if let Some(flags) = self.flags.get(now) {
            return Ok(flags);
        }
        let phases = PhaseCommon::query(store).await?;
        let flags: HashMap<PhaseName, bool> = phases.into_iter().map(|p| (p.name, p.is_open)).collect();
        log::debug!("refreshed phase flags: {:?}", flags);
        self.flags.set(flags.clone(), now);
        Ok(flags)
    }

    /// True when the flag is set, otherwise whatever `date_check` says.
    pub async fn is_feature_open<S, F>(&self, store: &mut S, phase: PhaseName, date_check: F) -> Result<bool, Error>
    where
        S: Store,
        F: FnOnce() -> bool,
    {
        let flags = self.flags(store).await?;
        if flags.get(&phase).copied().unwrap_or(false) {
            return Ok(true);
        }
        Ok(date_check())
    }

    /// `is_feature_open` with the configured opening date as the fallback.
    pub async fn is_open<S>(&self, store: &mut S, phase: PhaseName) -> Result<bool, Error>
    where
        S: Store,
    {
        let now = self.now();
        self.is_feature_open(store, phase, || self.schedule.is_open_at(phase, now)).await
    }

    pub fn invalidate(&self) {
        self.flags.invalidate();
    }
}
