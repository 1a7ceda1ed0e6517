use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::time::Instant;
use tracing::trace;

use crate::{
    limiter::{deadline_after, Limiter},
    lock, Callback,
};

/// Suppression state of a [`Throttle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Idle,
    Active { until: Instant },
}

/// Runs the callback at most once per `limit`, dropping calls in between.
///
/// The first call of a window fires immediately in the caller. The window is
/// a deadline rather than a flag cleared by a timer, so an expired window is
/// always reopened by the next call.
pub struct Throttle<A> {
    pub limit: Duration,
    callback: Callback<A>,
    window: Mutex<Window>,
}

impl<A> Throttle<A> {
    pub fn init<F>(limit: Duration, callback: F) -> Arc<Self>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Arc::new(Self {
            limit,
            callback: Box::new(callback),
            window: Mutex::new(Window::Idle),
        })
    }

    /// Like [`Limiter::call`], but reports whether the callback ran.
    pub fn try_call(&self, args: A) -> bool {
        let now = Instant::now();
        {
            let mut window = lock(&self.window);
            if let Window::Active { until } = *window {
                if now < until {
                    trace!("throttled call dropped");
                    return false;
                }
            }

            *window = if self.limit.is_zero() {
                Window::Idle
            } else {
                Window::Active {
                    until: deadline_after(now, self.limit),
                }
            };
        }

        (self.callback)(args);
        true
    }

    pub fn window(&self) -> Window {
        self.expire();
        *lock(&self.window)
    }

    fn expire(&self) -> Option<Instant> {
        let mut window = lock(&self.window);
        match *window {
            Window::Active { until } if until > Instant::now() => Some(until),
            _ => {
                *window = Window::Idle;
                None
            }
        }
    }
}

impl<A> Limiter<A> for Throttle<A> {
    fn call(&self, args: A) {
        self.try_call(args);
    }

    fn rearm(&self) -> Option<Instant> {
        self.expire()
    }
}
