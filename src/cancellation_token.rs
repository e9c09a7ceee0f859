use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The simplest implementation of an inter-thread cancelation token
/// possible.  The scan loop checks it once per cycle; the Ctrl+C handler
/// flips it from the signal thread.
#[derive(Clone)]
pub struct CancellationToken {
    canceled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancelation token.  Clone it to pass it to another thread
    pub fn new() -> CancellationToken {
        let canceled = Arc::new(AtomicBool::new(false));

        CancellationToken { canceled }
    }

    /// Flips the state of the token to canceled
    #[inline]
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    /// Checks if the token has been canceled
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();

        assert!(!token.is_canceled());
        clone.cancel();
        assert!(token.is_canceled());
    }
}
