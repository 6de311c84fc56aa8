use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Bounds a single call: an optional deadline and an optional cancel flag.
///
/// ```rust
/// use std::time::Duration;
/// use deepl_client::Context;
///
/// let ctx = Context::with_timeout(Duration::from_secs(5));
/// assert!(!ctx.is_done());
///
/// let (ctx, handle) = Context::cancellable();
/// handle.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: Option<Arc<AtomicBool>>,
}

/// Cancels the [`Context`] it was created with
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Mark the context as cancelled
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Context {
    /// No deadline, never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// Expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: None,
        }
    }

    /// A context without deadline plus the handle that cancels it
    pub fn cancellable() -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let ctx = Self {
            deadline: None,
            cancelled: Some(flag.clone()),
        };
        (ctx, CancelHandle(flag))
    }

    /// Same cancel flag, with a deadline added
    pub fn and_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Time left before the deadline. `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the cancel handle was used
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Cancelled or expired
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    /// Pulls the deadline in so that at most `limit` is left
    pub(crate) fn limited(mut self, limit: Option<Duration>) -> Self {
        if let Some(limit) = limit {
            let cap = Instant::now() + limit;
            self.deadline = Some(self.deadline.map_or(cap, |deadline| deadline.min(cap)));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_never_done() {
        let ctx = Context::background();
        assert_eq!(ctx.remaining(), None);
        assert!(!ctx.is_done());
    }

    #[test]
    fn test_past_deadline_is_expired() {
        let ctx = Context::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_cancel_is_shared_by_clones() {
        let (ctx, handle) = Context::cancellable();
        let copy = ctx.clone().and_timeout(Duration::from_secs(60));
        assert!(!copy.is_done());

        handle.cancel();
        assert!(ctx.is_cancelled());
        assert!(copy.is_done());
    }

    #[test]
    fn test_limited_keeps_shortest_deadline() {
        let second = Duration::from_secs(1);
        let minute = Duration::from_secs(60);

        let ctx = Context::with_timeout(minute).limited(Some(second));
        assert!(ctx.remaining().is_some_and(|left| left <= second));

        let ctx = Context::with_timeout(second).limited(Some(minute));
        assert!(ctx.remaining().is_some_and(|left| left <= second));

        assert_eq!(Context::background().limited(None).remaining(), None);
        assert!(Context::background().limited(Some(second)).remaining().is_some());
    }

    #[test]
    fn test_limited_keeps_cancel_flag() {
        let (ctx, handle) = Context::cancellable();
        let ctx = ctx.limited(Some(Duration::from_secs(60)));
        handle.cancel();
        assert!(ctx.is_done());
    }
}
