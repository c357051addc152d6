use std::cell::UnsafeCell;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::bound_buffer::BoundBuffer;
use crate::error::{AddError, WaitError};
use crate::sync::{CancelToken, Semaphore, SemaphorePermit};
use crate::util::buffer::Ring;

/// A bounded MPMC buffer coordinated by three counting semaphores.
///
/// * `free_slots` starts with `cap` permits, one per empty slot. Producers take
///   one before adding.
/// * `filled_slots` starts empty, one permit per held value. Consumers take one
///   before removing.
/// * `mutex` holds a single permit and guards the ring itself.
///
/// A producer takes a free slot, then `mutex`, pushes, gives `mutex` back and
/// only then announces the value on `filled_slots`; consumers mirror that. The
/// slot semaphore always comes first and is never waited on while `mutex` is
/// held. Producers only ever sleep on `free_slots` and consumers only on
/// `filled_slots`, so a permit in hand is a slot or a value that nobody else
/// can claim, and nothing has to be re-checked after waking.
///
/// # Examples
///
/// ```
/// use boundbuf::{BoundBuffer, CancelToken, SemaphoreBuffer};
///
/// let buf = SemaphoreBuffer::new(2);
/// let cancel = CancelToken::new();
///
/// buf.add('a', &cancel).unwrap();
/// assert_eq!(buf.try_add('b'), Ok(()));
/// assert_eq!(buf.try_add('c'), Err('c'));
///
/// assert_eq!(buf.remove(&cancel).unwrap(), 'a');
/// assert_eq!(buf.try_remove(), Some('b'));
/// assert_eq!(buf.try_remove(), None);
/// ```
pub struct SemaphoreBuffer<T> {
    free_slots: Arc<Semaphore>,
    filled_slots: Arc<Semaphore>,
    mutex: Semaphore,

    /// Only touched while holding the `mutex` permit.
    ring: UnsafeCell<Ring<T>>,

    cap: usize,
}

// `ring` is only reached through `with_ring`, which holds the single `mutex`
// permit for the duration of the access.
unsafe impl<T: Send> Sync for SemaphoreBuffer<T> {}

impl<T> SemaphoreBuffer<T> {
    /// Creates an empty buffer holding at most `cap` values.
    ///
    /// # Panics
    ///
    /// Panics if `cap` is 0.
    pub fn new(cap: usize) -> Self {
        let ring = Ring::new(cap);
        slog_global::debug!("bounded buffer created"; "strategy" => "semaphore", "capacity" => cap);
        SemaphoreBuffer {
            free_slots: Arc::new(Semaphore::named("free slot", cap)),
            filled_slots: Arc::new(Semaphore::named("filled slot", 0)),
            mutex: Semaphore::named("buffer mutex", 1),
            ring: UnsafeCell::new(ring),
            cap,
        }
    }

    /// Runs `f` on the ring while holding the `mutex` permit.
    fn with_ring<R>(&self, f: impl FnOnce(&mut Ring<T>) -> R) -> R {
        let _permit = self.mutex.wait();
        // SAFETY: `mutex` has a single permit and it is held until `_permit`
        // drops, so no other reference to the ring exists.
        let ring = unsafe { &mut *self.ring.get() };
        f(ring)
    }

    /// Second half of an add, once a free-slot permit has been taken.
    fn commit_add(&self, free_slot: SemaphorePermit<'_>, value: T) {
        free_slot.forget();
        self.with_ring(|ring| ring.push(value));
        self.filled_slots.release();
    }

    /// Second half of a remove, once a filled-slot permit has been taken.
    fn commit_remove(&self, filled_slot: SemaphorePermit<'_>) -> T {
        filled_slot.forget();
        let value = self.with_ring(Ring::pop);
        self.free_slots.release();
        value
    }
}

impl<T: Send> BoundBuffer<T> for SemaphoreBuffer<T> {
    fn capacity(&self) -> usize {
        self.cap
    }

    fn len(&self) -> usize {
        self.with_ring(|ring| ring.len())
    }

    fn add(&self, value: T, cancel: &CancelToken) -> Result<(), AddError<T>> {
        match self.free_slots.acquire(cancel) {
            Ok(free_slot) => {
                self.commit_add(free_slot, value);
                Ok(())
            }
            Err(e) => Err(AddError::new(e, value)),
        }
    }

    fn remove(&self, cancel: &CancelToken) -> Result<T, WaitError> {
        let filled_slot = self.filled_slots.acquire(cancel)?;
        Ok(self.commit_remove(filled_slot))
    }

    fn try_remove(&self) -> Option<T> {
        let filled_slot = self.filled_slots.try_acquire()?;
        Some(self.commit_remove(filled_slot))
    }

    fn try_add(&self, value: T) -> Result<(), T> {
        match self.free_slots.try_acquire() {
            Some(free_slot) => {
                self.commit_add(free_slot, value);
                Ok(())
            }
            None => Err(value),
        }
    }

    fn add_timeout(&self, value: T, timeout: Duration) -> Result<(), AddError<T>> {
        match self.free_slots.acquire_timeout(timeout) {
            Ok(free_slot) => {
                self.commit_add(free_slot, value);
                Ok(())
            }
            Err(e) => Err(AddError::new(e, value)),
        }
    }

    fn remove_timeout(&self, timeout: Duration) -> Result<T, WaitError> {
        let filled_slot = self.filled_slots.acquire_timeout(timeout)?;
        Ok(self.commit_remove(filled_slot))
    }

    fn put(&self, value: T) {
        let free_slot = self.free_slots.wait();
        self.commit_add(free_slot, value);
    }

    fn take(&self) -> T {
        let filled_slot = self.filled_slots.wait();
        self.commit_remove(filled_slot)
    }
}

impl<T> fmt::Debug for SemaphoreBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemaphoreBuffer")
            .field("cap", &self.cap)
            .field("free_slots", &self.free_slots.available_permits())
            .field("filled_slots", &self.filled_slots.available_permits())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn permits<T>(buf: &SemaphoreBuffer<T>) -> (usize, usize, usize) {
        (
            buf.free_slots.available_permits(),
            buf.filled_slots.available_permits(),
            buf.mutex.available_permits(),
        )
    }

    #[test]
    fn test_permits_track_contents() {
        let buf = SemaphoreBuffer::new(3);
        assert_eq!(permits(&buf), (3, 0, 1));

        buf.put("x");
        buf.put("y");
        assert_eq!(permits(&buf), (1, 2, 1));

        assert_eq!(buf.take(), "x");
        assert_eq!(permits(&buf), (2, 1, 1));

        assert_eq!(buf.try_remove(), Some("y"));
        assert_eq!(buf.try_remove(), None);
        assert_eq!(permits(&buf), (3, 0, 1));
    }

    #[test]
    fn test_cancelled_add_keeps_permits() {
        let buf = Arc::new(SemaphoreBuffer::new(1));
        buf.put(1u64);
        let token = CancelToken::new();

        let handle = {
            let (buf, token) = (buf.clone(), token.clone());
            thread::spawn(move || buf.add(2, &token).map_err(AddError::into_inner))
        };
        // Registered means parked on `free_slots` without the mutex.
        while token.registered() == 0 {
            thread::yield_now();
        }
        token.cancel();

        assert_eq!(handle.join().unwrap(), Err(2));
        assert_eq!(permits(&buf), (0, 1, 1));
        assert_eq!(buf.take(), 1);
        assert_eq!(permits(&buf), (1, 0, 1));
    }

    #[test]
    fn test_ring_panic_releases_mutex() {
        let buf = SemaphoreBuffer::<u8>::new(1);
        // Popping without a filled-slot permit breaks the buffer's
        // bookkeeping; the mutex permit must still come back.
        assert!(panic_hook::recover_safe(|| buf.with_ring(Ring::pop)).is_err());
        assert_eq!(permits(&buf), (1, 0, 1));
    }
}
