use std::fmt;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::bound_buffer::BoundBuffer;
use crate::error::{AddError, WaitError};
use crate::sync::{lock, Blocking, CancelToken, Wake};
use crate::util::buffer::Ring;

/// A bounded MPMC buffer built as a monitor.
///
/// One lock guards the whole ring, and one condition variable is the wait-set
/// shared by blocked producers and blocked consumers. Because both kinds of
/// waiters sleep on the same condition variable, a woken thread can never
/// assume its condition holds: it re-checks it under the lock, and goes back
/// to sleep if another thread got there first.
///
/// # Examples
///
/// ```
/// use boundbuf::{BoundBuffer, MonitorBuffer};
/// use std::sync::Arc;
/// use std::thread;
///
/// let buf = Arc::new(MonitorBuffer::new(2));
/// let producer = {
///     let buf = buf.clone();
///     thread::spawn(move || (0..10).for_each(|i| buf.put(i)))
/// };
///
/// let received: Vec<_> = (0..10).map(|_| buf.take()).collect();
/// producer.join().unwrap();
/// assert_eq!(received, (0..10).collect::<Vec<_>>());
/// ```
pub struct MonitorBuffer<T> {
    monitor: Arc<Monitor<T>>,
    cap: usize,
}

struct Monitor<T> {
    ring: Mutex<Ring<T>>,
    cvar: Condvar,
}

impl<T: Send> Wake for Monitor<T> {
    fn wake(&self) {
        let _ring = lock(&self.ring);
        self.cvar.notify_all();
    }
}

impl<T> MonitorBuffer<T> {
    /// Creates an empty buffer holding at most `cap` values.
    ///
    /// # Panics
    ///
    /// Panics if `cap` is 0.
    pub fn new(cap: usize) -> Self {
        let ring = Ring::new(cap);
        slog_global::debug!("bounded buffer created"; "strategy" => "monitor", "capacity" => cap);
        MonitorBuffer {
            monitor: Arc::new(Monitor {
                ring: Mutex::new(ring),
                cvar: Condvar::new(),
            }),
            cap,
        }
    }

    fn add_with(&self, value: T, blocking: Blocking<'_>) -> Result<(), AddError<T>> {
        let ring = lock(&self.monitor.ring);
        let mut ring =
            match blocking.wait_while("free slot", &self.monitor.cvar, ring, |r| r.is_full()) {
                Ok(ring) => ring,
                Err(e) => return Err(AddError::new(e, value)),
            };
        ring.push(value);
        // The wait-set mixes producers and consumers; a single wake-up may
        // land on a thread that cannot proceed and be lost.
        self.monitor.cvar.notify_all();
        Ok(())
    }

    fn remove_with(&self, blocking: Blocking<'_>) -> Result<T, WaitError> {
        let ring = lock(&self.monitor.ring);
        let mut ring =
            blocking.wait_while("filled slot", &self.monitor.cvar, ring, |r| r.is_empty())?;
        let value = ring.pop();
        self.monitor.cvar.notify_all();
        Ok(value)
    }
}

impl<T: Send + 'static> MonitorBuffer<T> {
    fn cancellable<'a>(&self, cancel: &'a CancelToken) -> Blocking<'a> {
        let waker: Arc<dyn Wake> = self.monitor.clone();
        Blocking::cancellable(cancel, waker)
    }
}

impl<T: Send + 'static> BoundBuffer<T> for MonitorBuffer<T> {
    fn capacity(&self) -> usize {
        self.cap
    }

    fn len(&self) -> usize {
        lock(&self.monitor.ring).len()
    }

    fn add(&self, value: T, cancel: &CancelToken) -> Result<(), AddError<T>> {
        self.add_with(value, self.cancellable(cancel))
    }

    fn remove(&self, cancel: &CancelToken) -> Result<T, WaitError> {
        self.remove_with(self.cancellable(cancel))
    }

    fn try_remove(&self) -> Option<T> {
        let mut ring = lock(&self.monitor.ring);
        let value = ring.try_pop()?;
        self.monitor.cvar.notify_all();
        Some(value)
    }

    fn try_add(&self, value: T) -> Result<(), T> {
        let mut ring = lock(&self.monitor.ring);
        ring.try_push(value)?;
        self.monitor.cvar.notify_all();
        Ok(())
    }

    fn add_timeout(&self, value: T, timeout: Duration) -> Result<(), AddError<T>> {
        self.add_with(value, Blocking::timeout(timeout))
    }

    fn remove_timeout(&self, timeout: Duration) -> Result<T, WaitError> {
        self.remove_with(Blocking::timeout(timeout))
    }

    fn put(&self, value: T) {
        if let Err(e) = self.add_with(value, Blocking::forever()) {
            unreachable!("unbounded add gave up: {}", e.reason());
        }
    }

    fn take(&self) -> T {
        match self.remove_with(Blocking::forever()) {
            Ok(value) => value,
            Err(e) => unreachable!("unbounded remove gave up: {}", e),
        }
    }
}

impl<T> fmt::Debug for MonitorBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorBuffer")
            .field("cap", &self.cap)
            .field("len", &lock(&self.monitor.ring).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_try_ops() {
        let buf = MonitorBuffer::new(2);
        assert_eq!(buf.try_remove(), None);
        buf.try_add(1).unwrap();
        buf.try_add(2).unwrap();
        assert_eq!(buf.try_add(3), Err(3));
        assert!(buf.is_full());
        assert_eq!(buf.try_remove(), Some(1));
        assert_eq!(buf.len(), 1);
    }

    // With a single slot and a single wait-set, waking only one waiter after
    // each mutation can leave every producer and consumer asleep.
    #[test]
    fn test_mixed_wait_set_capacity_one() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 2_000;

        let buf = Arc::new(MonitorBuffer::new(1));
        let mut handles = Vec::new();
        for p in 0..THREADS {
            let buf = buf.clone();
            handles.push(thread::spawn(move || {
                for i in 0..PER_THREAD {
                    buf.put(p * PER_THREAD + i);
                }
                0
            }));
        }
        for _ in 0..THREADS {
            let buf = buf.clone();
            handles.push(thread::spawn(move || {
                (0..PER_THREAD).map(|_| buf.take()).sum::<usize>()
            }));
        }

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        let n = THREADS * PER_THREAD;
        assert_eq!(total, n * (n - 1) / 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_cancel_leaves_other_waiters_blocked() {
        let buf = Arc::new(MonitorBuffer::<u32>::new(1));
        let cancelled = CancelToken::new();
        let idle = CancelToken::new();

        let doomed = {
            let (buf, token) = (buf.clone(), cancelled.clone());
            thread::spawn(move || buf.remove(&token))
        };
        let survivor = {
            let (buf, token) = (buf.clone(), idle.clone());
            thread::spawn(move || buf.remove(&token))
        };

        while cancelled.registered() == 0 || idle.registered() == 0 {
            thread::yield_now();
        }
        cancelled.cancel();
        assert_eq!(doomed.join().unwrap(), Err(WaitError::Cancelled));

        buf.put(9);
        assert_eq!(survivor.join().unwrap(), Ok(9));
        assert!(buf.is_empty());
    }
}
