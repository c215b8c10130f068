//! Caller-supplied deadlines for engine and repository operations
//!
//! Operations are bounded sequences of store round trips; the deadline is
//! checked before each trip rather than cancelling one in flight. What an
//! expiry means depends on where it lands: before the primary write it
//! fails the operation, during cascade cleanup it turns the result into a
//! partial success (see the engine).

use crate::error::{GraphError, GraphResult};
use std::time::Duration;
use tokio::time::Instant;

/// An absolute point in time after which an operation should stop
/// starting new store round trips.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline; round trips are never cut short.
    pub fn none() -> Self {
        Self(None)
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        self.0.map(|at| Instant::now() >= at).unwrap_or(false)
    }

    /// Fail with `DeadlineExceeded` if the deadline has passed.
    pub fn check(&self) -> GraphResult<()> {
        if self.expired() {
            Err(GraphError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_deadline_never_expires() {
        assert!(!Deadline::none().expired());
        assert!(Deadline::none().check().is_ok());
    }

    #[test]
    fn zero_timeout_expires_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.expired());
        assert!(matches!(
            deadline.check(),
            Err(GraphError::DeadlineExceeded)
        ));
    }
}
