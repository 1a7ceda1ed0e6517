use std::{
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use tokio::{
    select,
    sync::Notify,
    time::{self, Instant},
};
use tracing::trace;

use crate::{
    limiter::{deadline_after, Limiter},
    lock, Callback,
};

struct Pending<A> {
    when: Instant,
    args: A,
}

/// Delays the callback until calls stop arriving for `wait`.
///
/// Every call replaces the pending invocation, so the callback only ever sees
/// the arguments of the last call in a burst. A background task sleeps until
/// the current deadline and is woken whenever a call moves it.
pub struct Debounce<A> {
    pub wait: Duration,
    callback: Callback<A>,
    pending: Mutex<Option<Pending<A>>>,
    background_task: Arc<Notify>,
}

impl<A: Send + 'static> Debounce<A> {
    /// Must be called from within a tokio runtime.
    pub fn init<F>(wait: Duration, callback: F) -> Arc<Self>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        let debounce = Self {
            wait,
            callback: Box::new(callback),
            pending: Mutex::new(None),
            background_task: Arc::new(Notify::new()),
        };

        let shared_state = Arc::new(debounce);
        let wake = shared_state.background_task.clone();
        tokio::spawn(fire_when_due(Arc::downgrade(&shared_state), wake));

        shared_state
    }

    /// Whether an invocation is scheduled.
    pub fn pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    fn deadline(&self) -> Option<Instant> {
        lock(&self.pending).as_ref().map(|p| p.when)
    }
}

async fn fire_when_due<A: Send + 'static>(state: Weak<Debounce<A>>, wake: Arc<Notify>) {
    loop {
        let next = match state.upgrade() {
            Some(state) => state.rearm(),
            None => return,
        };

        if let Some(when) = next {
            select! {
                _ = time::sleep_until(when) => {}
                _ = wake.notified() => {}
            }
        } else {
            wake.notified().await;
        }
    }
}

impl<A: Send + 'static> Limiter<A> for Debounce<A> {
    fn call(&self, args: A) {
        if self.wait.is_zero() {
            (self.callback)(args);
            return;
        }

        let when = deadline_after(Instant::now(), self.wait);
        if lock(&self.pending).replace(Pending { when, args }).is_some() {
            trace!(wait_ms = self.wait.as_millis() as u64, "debounce rescheduled");
        }

        self.background_task.notify_one();
    }

    fn rearm(&self) -> Option<Instant> {
        let due = {
            let mut pending = lock(&self.pending);
            let when = pending.as_ref()?.when;
            if when > Instant::now() {
                return Some(when);
            }
            pending.take()
        };

        if let Some(Pending { args, .. }) = due {
            trace!("debounce fired");
            (self.callback)(args);
        }

        // the callback may have called us again
        self.deadline()
    }
}

impl<A> Drop for Debounce<A> {
    fn drop(&mut self) {
        self.background_task.notify_one();
    }
}
