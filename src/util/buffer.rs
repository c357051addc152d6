use std::fmt;

/// A fixed-capacity FIFO that holds the values of a bounded queue.
///
/// This is just storage: it does no synchronization and never blocks. The
/// queues wrap it in a lock (or a mutual-exclusion semaphore) and only call
/// [`push`] and [`pop`] once they know there is room or content. A [`push`] into
/// a full ring or a [`pop`] from an empty one means the caller's bookkeeping is
/// broken, so both panic instead of returning an error.
///
/// [`push`]: Ring::push
/// [`pop`]: Ring::pop
pub struct Ring<T> {
    /// Slots of the ring. `slots.len()` is the capacity.
    slots: Box<[Option<T>]>,

    /// Offset of the oldest value.
    head: usize,

    /// Number of occupied slots, starting at `head` and wrapping around.
    len: usize,
}

impl<T> Ring<T> {
    /// Allocates an empty ring with room for exactly `cap` values.
    ///
    /// # Panics
    ///
    /// Panics if `cap` is 0.
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "capacity of a ring must be positive");

        let mut slots = Vec::with_capacity(cap);
        slots.resize_with(cap, || None);

        Ring {
            slots: slots.into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.cap()
    }

    /// Maps a logical position (0 is the head) to a slot offset.
    #[inline]
    fn offset(&self, pos: usize) -> usize {
        let offset = self.head + pos;
        if offset < self.cap() {
            offset
        } else {
            offset - self.cap()
        }
    }

    /// Appends `value` at the tail.
    ///
    /// # Panics
    ///
    /// Panics if the ring is full.
    pub fn push(&mut self, value: T) {
        if self.try_push(value).is_err() {
            panic!("push into a full ring of capacity {}", self.cap());
        }
    }

    /// Appends `value` at the tail, or hands it back if the ring is full.
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        let offset = self.offset(self.len);
        debug_assert!(self.slots[offset].is_none());
        self.slots[offset] = Some(value);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the head.
    ///
    /// # Panics
    ///
    /// Panics if the ring is empty.
    pub fn pop(&mut self) -> T {
        match self.try_pop() {
            Some(value) => value,
            None => panic!("pop from an empty ring of capacity {}", self.cap()),
        }
    }

    /// Removes and returns the head, or `None` if the ring is empty.
    pub fn try_pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.slots[self.head].take();
        debug_assert!(value.is_some());
        self.head = self.offset(1);
        self.len -= 1;
        value
    }
}

impl<T> fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("cap", &self.cap())
            .field("head", &self.head)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_around() {
        let mut ring = Ring::new(3);
        for round in 0..10 {
            ring.push(round * 2);
            ring.push(round * 2 + 1);
            assert_eq!(ring.len(), 2);
            assert_eq!(ring.pop(), round * 2);
            assert_eq!(ring.pop(), round * 2 + 1);
            assert!(ring.is_empty());
        }
    }

    #[test]
    fn test_full_and_empty() {
        let mut ring = Ring::new(2);
        assert_eq!(ring.try_pop(), None);
        ring.push('a');
        ring.push('b');
        assert!(ring.is_full());
        assert_eq!(ring.try_push('c'), Err('c'));
        assert_eq!(ring.try_pop(), Some('a'));
        ring.push('c');
        assert_eq!(ring.pop(), 'b');
        assert_eq!(ring.pop(), 'c');
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn test_misuse_panics() {
        let mut ring = Ring::new(1);
        ring.push(1);
        assert!(panic_hook::recover_safe(|| ring.push(2)).is_err());

        let mut ring = Ring::<u8>::new(1);
        assert!(panic_hook::recover_safe(|| ring.pop()).is_err());

        assert!(panic_hook::recover_safe(|| Ring::<u8>::new(0)).is_err());
    }

    #[test]
    fn test_drop_remaining() {
        use std::rc::Rc;

        let value = Rc::new(());
        let mut ring = Ring::new(4);
        ring.push(Rc::clone(&value));
        ring.push(Rc::clone(&value));
        drop(ring.pop());
        assert_eq!(Rc::strong_count(&value), 2);
        drop(ring);
        assert_eq!(Rc::strong_count(&value), 1);
    }
}
