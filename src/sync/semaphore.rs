//! Counting semaphore.
//!
//! A semaphore keeps a count of available permits. [`Semaphore::wait`] and its
//! cancellable and timed siblings take one permit, blocking while there is
//! none; [`Semaphore::release`] puts one back and wakes a blocked taker.
//!
//! The count lives under a [`Mutex`] and takers sleep on a [`Condvar`]. A taker
//! re-checks the count every time it wakes up: a released permit may have been
//! grabbed by a thread that arrived in between.
//!
//! Permits come back as [`SemaphorePermit`] guards that release on drop. A
//! permit that is handed over to someone else (the bounded buffer moves a
//! free-slot permit into the filled-slot semaphore, and back) is consumed with
//! [`SemaphorePermit::forget`] instead.

use std::fmt;
use std::mem;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use super::{lock, Blocking, CancelToken, Wake};
use crate::error::WaitError;

/// Counting semaphore.
pub struct Semaphore {
    name: &'static str,
    permits: Mutex<usize>,
    cvar: Condvar,
}

impl Semaphore {
    /// Creates a semaphore holding `permits` permits.
    pub fn new(permits: usize) -> Self {
        Self::named("semaphore", permits)
    }

    /// Creates a semaphore whose `name` shows up in logs.
    pub fn named(name: &'static str, permits: usize) -> Self {
        Semaphore {
            name,
            permits: Mutex::new(permits),
            cvar: Condvar::new(),
        }
    }

    /// Returns the number of permits that could be taken right now.
    pub fn available_permits(&self) -> usize {
        *lock(&self.permits)
    }

    /// Takes a permit, blocking for as long as it takes.
    pub fn wait(&self) -> SemaphorePermit<'_> {
        match self.acquire_with(Blocking::forever()) {
            Ok(permit) => permit,
            // An unbounded wait has no way to give up.
            Err(e) => unreachable!("unbounded wait gave up: {}", e),
        }
    }

    /// Takes a permit, blocking until one is available or `cancel` fires.
    pub fn acquire(
        self: &Arc<Self>,
        cancel: &CancelToken,
    ) -> Result<SemaphorePermit<'_>, WaitError> {
        let waker: Arc<dyn Wake> = Arc::<Self>::clone(self);
        self.acquire_with(Blocking::cancellable(cancel, waker))
    }

    /// Takes a permit, blocking at most `timeout`.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<SemaphorePermit<'_>, WaitError> {
        self.acquire_with(Blocking::timeout(timeout))
    }

    /// Takes a permit if one is available right now.
    pub fn try_acquire(&self) -> Option<SemaphorePermit<'_>> {
        let mut permits = lock(&self.permits);
        if *permits == 0 {
            return None;
        }
        *permits -= 1;
        Some(SemaphorePermit { sema: self })
    }

    /// Puts a permit back and wakes one blocked taker, if any.
    pub fn release(&self) {
        let mut permits = lock(&self.permits);
        *permits += 1;
        self.cvar.notify_one();
    }

    fn acquire_with(&self, blocking: Blocking<'_>) -> Result<SemaphorePermit<'_>, WaitError> {
        let permits = lock(&self.permits);
        let mut permits = blocking.wait_while(self.name, &self.cvar, permits, |p| *p == 0)?;
        *permits -= 1;
        Ok(SemaphorePermit { sema: self })
    }
}

impl Wake for Semaphore {
    fn wake(&self) {
        let _permits = lock(&self.permits);
        self.cvar.notify_all();
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore")
            .field("name", &self.name)
            .field("permits", &self.available_permits())
            .finish()
    }
}

/// An RAII permit of a [`Semaphore`]. Dropping it releases the permit.
#[must_use = "dropping a permit releases it immediately"]
pub struct SemaphorePermit<'a> {
    sema: &'a Semaphore,
}

impl SemaphorePermit<'_> {
    /// Consumes the permit without releasing it.
    pub fn forget(self) {
        mem::forget(self);
    }
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        self.sema.release();
    }
}

impl fmt::Debug for SemaphorePermit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemaphorePermit")
            .field("sema", &self.sema.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_counting() {
        let sema = Semaphore::new(2);
        let p1 = sema.wait();
        let p2 = sema.try_acquire().unwrap();
        assert_eq!(sema.available_permits(), 0);
        assert!(sema.try_acquire().is_none());

        drop(p1);
        assert_eq!(sema.available_permits(), 1);
        p2.forget();
        assert_eq!(sema.available_permits(), 1);

        sema.release();
        assert_eq!(sema.available_permits(), 2);
    }

    #[test]
    fn test_wait_blocks_until_release() {
        let sema = Arc::new(Semaphore::new(0));
        let (tx, rx) = mpsc::channel();

        let handle = {
            let sema = sema.clone();
            thread::spawn(move || {
                sema.wait().forget();
                tx.send(()).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        sema.release();
        rx.recv_timeout(Duration::from_secs(10)).unwrap();
        handle.join().unwrap();
        assert_eq!(sema.available_permits(), 0);
    }

    #[test]
    fn test_acquire_timeout() {
        let sema = Semaphore::new(0);
        let start = Instant::now();
        assert_eq!(
            sema.acquire_timeout(Duration::from_millis(30)).unwrap_err(),
            WaitError::TimedOut
        );
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(sema.available_permits(), 0);

        sema.release();
        sema.acquire_timeout(Duration::from_millis(30))
            .unwrap()
            .forget();
    }

    #[test]
    fn test_cancel_blocked_acquire() {
        let sema = Arc::new(Semaphore::new(0));
        let token = CancelToken::new();

        let handle = {
            let (sema, token) = (sema.clone(), token.clone());
            thread::spawn(move || sema.acquire(&token).map(SemaphorePermit::forget))
        };

        while token.registered() == 0 {
            thread::yield_now();
        }
        token.cancel();
        assert_eq!(handle.join().unwrap(), Err(WaitError::Cancelled));
        assert_eq!(sema.available_permits(), 0);
        assert_eq!(token.registered(), 0);
    }

    #[test]
    fn test_cancelled_token_without_waiting() {
        let sema = Arc::new(Semaphore::new(1));
        let token = CancelToken::new();
        token.cancel();

        // A permit is available, so nothing has to wait.
        sema.acquire(&token).unwrap().forget();
        assert_eq!(sema.acquire(&token).unwrap_err(), WaitError::Cancelled);
    }
}
