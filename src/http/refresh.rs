//! The refresh gate: single-flight coordination for token refresh.
//!
//! At most one refresh call is ever in flight. The first request to observe
//! a 401 claims the slot and performs the refresh; every 401 that arrives
//! while it runs parks on a oneshot channel and is settled with the shared
//! outcome. The critical sections never await, so claiming the slot cannot
//! interleave with another task's claim.

use std::sync::Mutex;

use tokio::sync::oneshot;

use super::error::ApiError;

/// Outcome delivered to parked requests: the new access token, or the error
/// that ended the cycle.
pub(crate) type RefreshOutcome = Result<String, ApiError>;

/// What `begin` handed out: either this task drives the refresh, or it waits
/// for the driver's outcome.
pub(crate) enum RefreshTicket {
    Leader,
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
struct GateState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Owned by the `ApiClient`; one gate per client instance, no globals.
#[derive(Default)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    pub fn new() -> Self {
        RefreshGate::default()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, GateState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Atomically claim the refresh slot or join the queue behind the
    /// current holder.
    pub fn begin(&self) -> RefreshTicket {
        let mut state = self.locked();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            RefreshTicket::Waiter(rx)
        } else {
            state.refreshing = true;
            RefreshTicket::Leader
        }
    }

    /// End the cycle: reset the flag and settle every queued waiter, in
    /// enqueue order, exactly once. Runs on success and failure alike.
    ///
    /// The queue is detached before any send, so a request that fails with
    /// 401 while we are settling starts a fresh cycle instead of being added
    /// to this one.
    pub fn settle(&self, outcome: &RefreshOutcome) {
        let waiters = {
            let mut state = self.locked();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A waiter whose caller went away just drops its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }

    #[cfg(test)]
    pub fn is_refreshing(&self) -> bool {
        self.locked().refreshing
    }
}
