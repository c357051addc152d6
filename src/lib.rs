//! Blocking bounded buffers for producer/consumer threads.
//!
//! A bounded buffer is a fixed-capacity FIFO queue: [`add`] blocks while it is
//! full and [`remove`] blocks while it is empty. This crate builds the same
//! [`BoundBuffer`] contract two ways:
//!
//! * [`MonitorBuffer`] guards its storage with one mutex and parks producers and
//!   consumers on one shared condition variable, re-checking after every
//!   wake-up.
//! * [`SemaphoreBuffer`] counts free and filled slots with two semaphores and
//!   guards its storage with a third, binary one.
//!
//! Blocking calls take a [`CancelToken`]; firing it makes them give up without
//! touching the buffer. Timed and non-blocking variants follow the same rule.
//!
//! ```
//! use boundbuf::{BoundBuffer, CancelToken, SemaphoreBuffer, WaitError};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let buf = Arc::new(SemaphoreBuffer::<u32>::new(5));
//! let cancel = CancelToken::new();
//!
//! let consumer = {
//!     let (buf, cancel) = (buf.clone(), cancel.clone());
//!     thread::spawn(move || {
//!         let mut sum = 0;
//!         while let Ok(v) = buf.remove(&cancel) {
//!             sum += v;
//!         }
//!         sum
//!     })
//! };
//!
//! for i in 1..=100 {
//!     buf.put(i);
//! }
//! while !buf.is_empty() {
//!     thread::yield_now();
//! }
//! cancel.cancel();
//! assert_eq!(consumer.join().unwrap(), 5050);
//! assert_eq!(buf.remove(&cancel), Err(WaitError::Cancelled));
//! ```
//!
//! [`add`]: BoundBuffer::add
//! [`remove`]: BoundBuffer::remove

#[macro_use]
extern crate quick_error;
#[macro_use]
extern crate serde_derive;

pub mod bound_buffer;
pub mod config;
pub mod error;
pub mod sync;
pub mod util;

pub use crate::bound_buffer::BoundBuffer;
pub use crate::config::{BufferConfig, Strategy};
pub use crate::error::{AddError, WaitError};
pub use crate::sync::{CancelToken, Semaphore, SemaphorePermit};
pub use crate::util::mp::{MonitorBuffer, SemaphoreBuffer};
