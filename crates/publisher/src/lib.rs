//! Interval-driven publish scheduler.
//!
//! [`start`] spawns a tokio task that fires a caller-supplied async action
//! once per period until the returned [`PublishHandle`] is cancelled or
//! dropped. Firings either run inline in the scheduler loop (sequential
//! mode) or are spawned as independent tasks (concurrent mode).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Shortest accepted period; shorter requests are clamped.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// The action fired on each tick.
pub type Action = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static>;

/// Cancellation handle for a running publisher.
///
/// Cancelling stops future ticks only: a firing already dispatched in
/// concurrent mode is neither awaited nor aborted. `cancel` is idempotent,
/// and dropping the handle cancels as well, so the scheduler task and its
/// timer are always released.
#[derive(Debug)]
pub struct PublishHandle {
    cancel: CancellationToken,
}

impl PublishHandle {
    /// Requests cancellation. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PublishHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Starts a periodic publisher firing `action` once per `period`.
///
/// With `concurrent` set, each firing runs on its own task and may overlap
/// firings still in progress. Without it, the action is awaited in the
/// scheduler loop; an action that outlasts the period delays subsequent
/// ticks rather than queueing them ([`MissedTickBehavior::Delay`]).
///
/// Must be called from within a tokio runtime.
pub fn start(action: Action, period: Duration, concurrent: bool) -> PublishHandle {
    let period = period.max(MIN_PERIOD);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick so the first firing is one full
        // period after start.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if concurrent {
                        tokio::spawn(action());
                    } else {
                        action().await;
                    }
                }
            }
        }
        tracing::debug!("publish scheduler stopped");
    });

    PublishHandle { cancel }
}
