use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;

use crate::core::cache::TtlCell;
use crate::core::models::event::Event;
use crate::core::ports::content::ContentSource;
use crate::error::Error;

/// Current event metadata, cached for a short window.
///
/// Content service failures are logged and read as "no event" without being
/// cached, so the next request tries again.
pub struct EventCache<C> {
    source: Option<C>,
    clock: Arc<dyn Clock + Send + Sync>,
    cached: TtlCell<Option<Event>>,
}

impl<C> EventCache<C>
where
    C: ContentSource,
{
    pub fn new(source: Option<C>, clock: Arc<dyn Clock + Send + Sync>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            cached: TtlCell::new(ttl),
        }
    }

    pub async fn current(&self) -> Result<Option<Event>, Error> {
        let source = match &self.source {
            Some(source) => source,
            None => return Ok(None),
        };
        let now = self.clock.utc();
        if let Some(event) = self.cached.get(now) {
            return Ok(event);
        }
        match source.current_event().await {
            Ok(event) => {
                self.cached.set(event.clone(), now);
                Ok(event)
            }
            Err(e) => {
                log::warn!("failed to fetch current event: {}", e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::MutableClock;
    use chrono::{TimeZone, Utc};
    use std::cell::Cell;

    struct Scripted {
        calls: Cell<usize>,
        fail: Cell<bool>,
    }

    impl ContentSource for Scripted {
        async fn current_event(&self) -> Result<Option<Event>, Error> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(Error::ServerError("content service down".into()));
            }
            let event = serde_json::from_value(serde_json::json!({
                "title": "Winter Jam",
                "slug": "winter-jam",
                "start_date": "2025-11-20",
                "end_date": "2025-12-05",
                "demo_day_date": "2025-12-05",
                "is_current": true,
            }))
            .unwrap();
            Ok(Some(event))
        }
    }

    fn setup(fail: bool) -> (Arc<MutableClock>, EventCache<Scripted>) {
        let clock = Arc::new(MutableClock::new(Utc.with_ymd_and_hms(2025, 11, 20, 9, 0, 0).unwrap()));
        let source = Scripted {
            calls: Cell::new(0),
            fail: Cell::new(fail),
        };
        let cache = EventCache::new(Some(source), clock.clone(), Duration::from_secs(60));
        (clock, cache)
    }

    fn calls(cache: &EventCache<Scripted>) -> usize {
        cache.source.as_ref().map(|s| s.calls.get()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_fetches_once_per_window() {
        let (clock, cache) = setup(false);
        assert_eq!(cache.current().await.unwrap().unwrap().slug, "winter-jam");
        clock.advance_seconds(59);
        cache.current().await.unwrap();
        assert_eq!(calls(&cache), 1);
        clock.advance_seconds(1);
        cache.current().await.unwrap();
        assert_eq!(calls(&cache), 2);
    }

    #[tokio::test]
    async fn test_failure_reads_as_no_event_and_is_not_cached() {
        let (_, cache) = setup(true);
        assert!(cache.current().await.unwrap().is_none());
        if let Some(source) = &cache.source {
            source.fail.set(false);
        }
        assert!(cache.current().await.unwrap().is_some());
        assert_eq!(calls(&cache), 2);
    }

    #[tokio::test]
    async fn test_unconfigured_source() {
        let clock = Arc::new(MutableClock::new(Utc.with_ymd_and_hms(2025, 11, 20, 9, 0, 0).unwrap()));
        let cache: EventCache<Scripted> = EventCache::new(None, clock, Duration::from_secs(60));
        assert!(cache.current().await.unwrap().is_none());
    }
}
