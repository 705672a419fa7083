//! Bounded admission of concurrent API operations.
//!
//! A counter guarded by a mutex, paired with a [`Notify`] used as the
//! condition variable. Capacity is returned through [`AdmissionPermit`]'s
//! `Drop`, so a guarded region releases its slot on every exit path.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Gate bounding the number of in-flight operations to `max_parallel`.
#[derive(Debug)]
pub struct AdmissionLimiter {
    max_parallel: usize,
    in_flight: Mutex<usize>,
    released: Notify,
}

impl AdmissionLimiter {
    pub fn new(max_parallel: NonZeroUsize) -> Self {
        Self {
            max_parallel: max_parallel.get(),
            in_flight: Mutex::new(0),
            released: Notify::new(),
        }
    }

    /// Waits until fewer than `max_parallel` operations are in flight, then
    /// takes a slot. There is no timeout: the caller waits until some other
    /// permit is released.
    pub async fn acquire(&self) -> AdmissionPermit<'_> {
        loop {
            // Register interest before checking the predicate so a release
            // between the check and the await is not lost.
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            {
                let mut in_flight = self.lock();
                if *in_flight < self.max_parallel {
                    *in_flight += 1;
                    return AdmissionPermit { limiter: self };
                }
            }

            released.await;
        }
    }

    /// Number of operations currently holding a permit.
    pub fn in_flight(&self) -> usize {
        *self.lock()
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    fn release(&self) {
        {
            let mut in_flight = self.lock();
            debug_assert!(*in_flight > 0, "admission permit released twice");
            *in_flight = in_flight.saturating_sub(1);
        }
        // Every waiter re-checks the count.
        self.released.notify_waiters();
    }

    // The count is a plain integer that is never left half-updated, so a
    // poisoned lock still holds a usable value.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A held admission slot. Dropping it returns the slot to the limiter.
#[derive(Debug)]
#[must_use = "dropping the permit immediately releases the admission slot"]
pub struct AdmissionPermit<'a> {
    limiter: &'a AdmissionLimiter,
}

impl AdmissionPermit<'_> {
    /// Ends the guarded region early.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for AdmissionPermit<'_> {
    fn drop(&mut self) {
        self.limiter.release();
    }
}
