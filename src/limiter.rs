use std::time::Duration;

use tokio::time::Instant;

/// Roughly 30 years, the same horizon tokio uses for deadlines that never arrive.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// A wrapper that bounds how often an underlying callback runs.
pub trait Limiter<A> {
    /// Invoke the wrapper. Whether and when the callback runs is up to the limiter.
    fn call(&self, args: A);

    /// Advance the state to now and return the next deadline, if one is pending.
    fn rearm(&self) -> Option<Instant>;
}

/// `now + delay`, saturating at a far-future deadline instead of overflowing.
pub(crate) fn deadline_after(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay).unwrap_or(now + FAR_FUTURE)
}
