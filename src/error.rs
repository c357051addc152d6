use std::error;
use std::fmt;

quick_error! {
    /// Why a blocking call gave up without touching the buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum WaitError {
        Cancelled {
            display("blocking wait was cancelled")
        }
        TimedOut {
            display("blocking wait timed out")
        }
    }
}

/// An error returned from a blocking add that gave up.
///
/// The value that could not be added is handed back.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AddError<T> {
    reason: WaitError,
    value: T,
}

impl<T> AddError<T> {
    pub(crate) fn new(reason: WaitError, value: T) -> Self {
        AddError { reason, value }
    }

    pub fn reason(&self) -> WaitError {
        self.reason
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason == WaitError::Cancelled
    }

    pub fn is_timeout(&self) -> bool {
        self.reason == WaitError::TimedOut
    }

    /// Returns the value that was not added.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> fmt::Debug for AddError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddError")
            .field("reason", &self.reason)
            .finish()
    }
}

impl<T> fmt::Display for AddError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value not added: {}", self.reason)
    }
}

impl<T> error::Error for AddError<T> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.reason)
    }
}
