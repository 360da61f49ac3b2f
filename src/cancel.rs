//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

/// Flag a host raises to abort a running kernel.
///
/// Share it through an `Arc` between the thread that owns the invocation and
/// the one that may cancel it. Kernels poll it at most once per candidate.
#[derive(Debug, Default)]
pub struct CancellationFlag {
    cancelled: AtomicBool,
}

impl CancellationFlag {
    /// Creates a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::CancellationFlag;
    use std::sync::Arc;

    #[test]
    fn cancel_is_visible_across_threads() {
        let flag = Arc::new(CancellationFlag::new());
        assert!(!flag.is_cancelled());
        let remote = Arc::clone(&flag);
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(flag.is_cancelled());
    }
}
