//! Blocking building blocks shared by the buffers.
//!
//! - [`CancelToken`]: an external signal that aborts blocking waits.
//! - [`Semaphore`]: a counting semaphore built from a mutex-protected counter
//!   and a condition variable.
//!
//! Every blocking wait in this crate goes through the same loop: under the
//! lock, re-check the predicate, the token and the deadline, then sleep on the
//! condition variable and repeat. The lock is never held while sleeping.

mod cancel;
mod semaphore;

pub use self::cancel::CancelToken;
pub use self::semaphore::{Semaphore, SemaphorePermit};

pub(crate) use self::cancel::Wake;

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::WaitError;

/// Locks `mutex`, ignoring poisoning.
///
/// Every critical section in this crate leaves the guarded state consistent
/// before anything that may panic, so a poisoned lock still guards valid data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How long a blocking call is willing to wait.
pub(crate) struct Blocking<'a> {
    cancel: Option<(&'a CancelToken, Arc<dyn Wake>)>,
    deadline: Option<Instant>,
}

impl<'a> Blocking<'a> {
    /// Waits until the predicate clears, however long it takes.
    pub(crate) fn forever() -> Self {
        Blocking {
            cancel: None,
            deadline: None,
        }
    }

    /// Waits until the predicate clears or `token` fires. `waker` is what the
    /// token nudges to get the waiter to notice.
    pub(crate) fn cancellable(token: &'a CancelToken, waker: Arc<dyn Wake>) -> Self {
        Blocking {
            cancel: Some((token, waker)),
            deadline: None,
        }
    }

    /// Waits until the predicate clears or `timeout` elapses.
    pub(crate) fn timeout(timeout: Duration) -> Self {
        Blocking {
            cancel: None,
            // An unrepresentable deadline is as good as none.
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Sleeps on `cvar` while `blocked` holds for the guarded state.
    ///
    /// Returns the guard with `blocked` false, or the reason for giving up. In
    /// both cases the guarded state has not been modified by this call.
    pub(crate) fn wait_while<'g, T, F>(
        &self,
        what: &'static str,
        cvar: &Condvar,
        mut guard: MutexGuard<'g, T>,
        mut blocked: F,
    ) -> Result<MutexGuard<'g, T>, WaitError>
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut _registration = None;
        let mut waited = false;
        while blocked(&mut *guard) {
            if !waited {
                slog_global::trace!("blocking wait"; "on" => what);
                waited = true;
                if let Some((token, waker)) = &self.cancel {
                    _registration = Some(token.register(Arc::clone(waker)));
                }
            }
            if let Some((token, _)) = &self.cancel {
                // Checked under the lock the waker takes, so a cancel that
                // races with going to sleep is either seen here or wakes us.
                if token.is_cancelled() {
                    slog_global::debug!("blocking wait cancelled"; "on" => what);
                    return Err(WaitError::Cancelled);
                }
            }
            guard = match self.deadline {
                None => cvar.wait(guard).unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        slog_global::debug!("blocking wait timed out"; "on" => what);
                        return Err(WaitError::TimedOut);
                    }
                    cvar.wait_timeout(guard, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        Ok(guard)
    }
}
