//! Rate limiting and best-effort JSON persistence for interactive front ends.
//!
//! [`Debounce`] and [`Throttle`] bound how often an event handler runs.
//! [`Cache`] stores JSON values in a [`KeyValueStore`] and never lets a storage
//! failure reach the caller. [`FormDraft`] and [`ConsentGate`] are the two
//! consumers built on top of it.

pub mod cache;
pub mod config;
pub mod consent;
pub mod debounce;
pub mod draft;
pub mod limiter;
pub mod store;
pub mod throttle;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use cache::{Cache, CacheError};
pub use config::Settings;
pub use consent::{ConsentGate, ConsentRecord};
pub use debounce::Debounce;
pub use draft::FormDraft;
pub use limiter::Limiter;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use throttle::{Throttle, Window};

/// A wrapped event handler.
pub type Callback<A> = Box<dyn Fn(A) + Send + Sync>;

// Guarded state is never left half-updated, so a poisoned lock is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
