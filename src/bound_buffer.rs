use std::time::Duration;

use crate::error::{AddError, WaitError};
use crate::sync::CancelToken;

/// A fixed-capacity FIFO queue shared between producer and consumer threads.
///
/// `add` blocks while the buffer is full and `remove` blocks while it is
/// empty. Values come out in the order they went in, each exactly once.
///
/// A blocking call that gives up, because its [`CancelToken`] fired or its
/// timeout elapsed, leaves the buffer exactly as it found it; an add hands
/// its value back inside the [`AddError`].
///
/// Implementations differ only in how they coordinate; see
/// [`MonitorBuffer`] and [`SemaphoreBuffer`].
///
/// [`MonitorBuffer`]: crate::MonitorBuffer
/// [`SemaphoreBuffer`]: crate::SemaphoreBuffer
pub trait BoundBuffer<T>: Send + Sync {
    /// Maximum number of values the buffer holds.
    fn capacity(&self) -> usize;

    /// Number of values currently held.
    ///
    /// Inaccurate in the presence of concurrent method invocations, but always
    /// within `0..=capacity()`.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Appends `value`, waiting for a free slot until `cancel` fires.
    fn add(&self, value: T, cancel: &CancelToken) -> Result<(), AddError<T>>;

    /// Removes the oldest value, waiting for one until `cancel` fires.
    fn remove(&self, cancel: &CancelToken) -> Result<T, WaitError>;

    /// Removes the oldest value if there is one right now.
    fn try_remove(&self) -> Option<T>;

    /// Appends `value` if there is a free slot right now, or hands it back.
    fn try_add(&self, value: T) -> Result<(), T>;

    /// Appends `value`, waiting for a free slot at most `timeout`.
    fn add_timeout(&self, value: T, timeout: Duration) -> Result<(), AddError<T>>;

    /// Removes the oldest value, waiting for one at most `timeout`.
    fn remove_timeout(&self, timeout: Duration) -> Result<T, WaitError>;

    /// Appends `value`, waiting for a free slot for as long as it takes.
    fn put(&self, value: T);

    /// Removes the oldest value, waiting for one for as long as it takes.
    fn take(&self) -> T;
}
