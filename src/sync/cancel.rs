use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::lock;

/// Something a cancelled token has to nudge so that its blocked waiters
/// re-check the token.
///
/// Implementors take the lock their waiters sleep under before notifying,
/// which orders the notification after any check of the token made under that
/// lock.
pub(crate) trait Wake: Send + Sync {
    fn wake(&self);
}

/// A cancellation signal for blocking buffer and semaphore calls.
///
/// Clones share the same signal. Once [`cancel`] is called every blocking
/// call currently waiting with this token (or any clone) returns
/// [`WaitError::Cancelled`], and every later call that would have to wait
/// fails the same way. Calls that can complete without waiting are not
/// affected.
///
/// [`cancel`]: CancelToken::cancel
/// [`WaitError::Cancelled`]: crate::WaitError::Cancelled
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    next_key: AtomicUsize,
    waiters: Mutex<Vec<(usize, Arc<dyn Wake>)>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the token and wakes every call blocked on it.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        // Wake outside of the registry lock: waiters register while holding
        // their own lock, which `wake` takes as well.
        let waiters: Vec<_> = lock(&self.inner.waiters)
            .iter()
            .map(|(_, waker)| Arc::clone(waker))
            .collect();
        slog_global::debug!("cancel token fired"; "blocked" => waiters.len());
        for waker in waiters {
            waker.wake();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Registers `waker` until the returned guard is dropped.
    pub(crate) fn register(&self, waker: Arc<dyn Wake>) -> Registration<'_> {
        let key = self.inner.next_key.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.waiters).push((key, waker));
        Registration { token: self, key }
    }

    #[cfg(test)]
    pub(crate) fn registered(&self) -> usize {
        lock(&self.inner.waiters).len()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

pub(crate) struct Registration<'a> {
    token: &'a CancelToken,
    key: usize,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let key = self.key;
        lock(&self.token.inner.waiters).retain(|(k, _)| *k != key);
    }
}
