//! Concurrent multiple-producer multiple-consumer bounded buffers.
//!
//! Both buffers implement [`BoundBuffer`] over the same [`Ring`] storage and
//! are interchangeable; they differ only in how producers and consumers wait
//! for each other.
//!
//! * [`MonitorBuffer`]: one mutex and one condition variable. Every waiter
//!   re-checks its condition after waking.
//! * [`SemaphoreBuffer`]: a free-slot semaphore, a filled-slot semaphore and a
//!   mutual-exclusion semaphore. A permit in hand is the condition.
//!
//! Here's a visualization of a buffer of capacity 4 holding 2 values `a` and
//! `b`.
//!
//! ```text
//!    ___
//!   | a | <- head (remove, try_remove)
//!   | b |
//!   |   | <- tail (add, try_add)
//!   |   |
//!    ¯¯¯
//! ```
//!
//! [`BoundBuffer`]: crate::BoundBuffer
//! [`Ring`]: crate::util::buffer::Ring

mod monitor;
mod semaphore;

pub use self::monitor::MonitorBuffer;
pub use self::semaphore::SemaphoreBuffer;
