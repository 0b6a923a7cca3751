//! Keep-alive token held across track transitions
//!
//! Platforms that suspend the process when nothing is audible (mobile, laptop
//! power management) must stay awake between "track ended" and "next track
//! audible". The orchestrator holds the token for at most the configured
//! timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Wake-lock style collaborator
pub trait KeepAlive: Send + Sync {
    fn acquire(&self);
    fn release(&self);
}

/// Keep-alive for platforms without power management
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopKeepAlive;

impl KeepAlive for NoopKeepAlive {
    fn acquire(&self) {}
    fn release(&self) {}
}

/// Held/released state of the keep-alive token with its expiry
pub(crate) struct KeepAliveGuard {
    inner: Arc<dyn KeepAlive>,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl KeepAliveGuard {
    pub(crate) fn new(inner: Arc<dyn KeepAlive>, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            deadline: None,
        }
    }

    /// Acquire (or extend) the token
    pub(crate) fn acquire(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.inner.acquire();
        }
        self.deadline = Some(now + self.timeout);
    }

    pub(crate) fn release(&mut self) {
        if self.deadline.take().is_some() {
            self.inner.release();
        }
    }

    /// Release the token if its deadline passed; returns whether it did
    pub(crate) fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                debug!("keep-alive timed out");
                self.release();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn is_held(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Default)]
    struct Counting(AtomicI32);

    impl KeepAlive for Counting {
        fn acquire(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn release(&self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn acquire_is_not_reentrant() {
        let counter = Arc::new(Counting::default());
        let mut guard = KeepAliveGuard::new(counter.clone(), Duration::from_secs(5));
        let now = Instant::now();

        guard.acquire(now);
        guard.acquire(now + Duration::from_secs(1));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(guard.deadline(), Some(now + Duration::from_secs(6)));

        guard.release();
        guard.release();
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
        assert!(!guard.is_held());
    }

    #[test]
    fn expires_only_after_deadline() {
        let counter = Arc::new(Counting::default());
        let mut guard = KeepAliveGuard::new(counter.clone(), Duration::from_secs(5));
        let now = Instant::now();
        guard.acquire(now);

        assert!(!guard.expire(now + Duration::from_secs(4)));
        assert!(guard.expire(now + Duration::from_secs(5)));
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
        assert!(!guard.expire(now + Duration::from_secs(10)));
    }
}
