use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use actix_web::rt::{spawn, task::JoinHandle, time::sleep};

use crate::core::models::idea::clamp_votes;
use crate::error::Error;

type Key = (i32, i32);

struct Pending {
    target: i64,
    generation: u64,
    // None once the flush has started; a running flush is never aborted.
    flush: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Inner {
    generation: u64,
    entries: HashMap<Key, Pending>,
}

/// Shadow vote targets per (idea, user) with a debounced flush.
///
/// Every click moves the shadow target and reschedules the single write
/// that brings the ledger to it. Lives on one actix worker.
#[derive(Clone)]
pub struct PendingVotes {
    delay: Duration,
    inner: Rc<RefCell<Inner>>,
}

impl PendingVotes {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: Rc::new(RefCell::new(Inner::default())),
        }
    }

    pub fn pending_target(&self, idea_id: i32, user_id: i32) -> Option<i64> {
        self.inner.borrow().entries.get(&(idea_id, user_id)).map(|p| p.target)
    }

    /// Moves the shadow target by `delta` (starting from `server_count` when
    /// nothing is pending) and schedules `flush(target)` after the delay,
    /// replacing any flush not yet started. Returns the new target.
    pub fn adjust<F, Fut>(&self, idea_id: i32, user_id: i32, delta: i64, server_count: i64, flush: F) -> i64
    where
        F: FnOnce(i64) -> Fut + 'static,
        Fut: Future<Output = Result<i64, Error>> + 'static,
    {
        let key = (idea_id, user_id);
        let mut inner = self.inner.borrow_mut();
        let base = inner.entries.get(&key).map(|p| p.target).unwrap_or(server_count);
        let target = clamp_votes(base + delta);
        if let Some(handle) = inner.entries.get_mut(&key).and_then(|p| p.flush.take()) {
            handle.abort();
        }
        inner.generation += 1;
        let generation = inner.generation;

        let shared = self.inner.clone();
        let delay = self.delay;
        let handle = spawn(async move {
            sleep(delay).await;
            if let Some(p) = shared.borrow_mut().entries.get_mut(&key) {
                if p.generation == generation {
                    p.flush = None;
                }
            }
            match flush(target).await {
                Ok(count) => log::debug!("flushed votes of user {} on idea {}: {}", user_id, idea_id, count),
                Err(e) => log::error!("failed to flush votes of user {} on idea {}: {}", user_id, idea_id, e),
            }
            let mut inner = shared.borrow_mut();
            if inner.entries.get(&key).map(|p| p.generation) == Some(generation) {
                inner.entries.remove(&key);
            }
        });
        inner.entries.insert(
            key,
            Pending {
                target,
                generation,
                flush: Some(handle),
            },
        );
        target
    }
}
