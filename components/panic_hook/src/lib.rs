//! Panic hooks for multi-threaded tests.
//!
//! A test that spawns producers and consumers around a blocking queue can hang
//! forever when one side panics: the survivor stays parked waiting for an
//! element or a free slot that will never come. [`set_exit_hook`] turns any
//! panic on any thread into a process exit instead, so the failure is reported
//! rather than swallowed by a hung test run.
//!
//! Panics that a test provokes on purpose go through [`recover_safe`], which
//! mutes the hook on the current thread for the duration of the call.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::sync::Once;
use std::thread;

static INSTALL: Once = Once::new();

thread_local! {
    static MUTED: Cell<bool> = Cell::new(false);
}

/// Mutes the hook on the current thread.
pub fn mute() {
    MUTED.with(|m| m.set(true));
}

/// Unmutes the hook on the current thread.
pub fn unmute() {
    MUTED.with(|m| m.set(false));
}

fn is_muted() -> bool {
    MUTED.with(Cell::get)
}

/// Installs a hook that prints the panic and exits the process.
///
/// Calling it more than once is harmless; only the first call installs.
pub fn set_exit_hook() {
    INSTALL.call_once(|| {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if is_muted() {
                return;
            }
            default_hook(info);
            let name = thread::current()
                .name()
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| "<unnamed>".to_owned());
            eprintln!("thread {} panicked, exiting", name);
            process::exit(1);
        }))
    });
}

/// Runs `f` and catches its panic without printing it or exiting.
pub fn recover_safe<F, R>(f: F) -> thread::Result<R>
where
    F: FnOnce() -> R,
{
    mute();
    let res = panic::catch_unwind(AssertUnwindSafe(f));
    unmute();
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recover_safe() {
        set_exit_hook();
        let res = recover_safe(|| panic!("expected"));
        assert!(res.is_err());
        assert_eq!(recover_safe(|| 7).unwrap(), 7);
        assert!(!is_muted());
    }
}
