//! Cancellation and progress handles.
//!
//! The pipeline only stores these on the descriptor; the transport polls the
//! signal and invokes the callbacks.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    /// A signal that has not been aborted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`AbortSignal::abort`] has been called on any clone.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Transfer progress reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Bytes transferred so far.
    pub loaded_bytes: u64,
}

/// Callback receiving [`ProgressEvent`]s.
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(ProgressEvent) + Send + Sync>);

impl ProgressCallback {
    /// Wrap a callback.
    pub fn new(callback: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    /// Deliver an event.
    pub fn notify(&self, event: ProgressEvent) {
        (self.0)(event);
    }

    /// Returns `true` if both handles wrap the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressCallback(..)")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU64;

    use super::*;

    #[test]
    fn abort_is_shared_by_clones() {
        let signal = AbortSignal::new();
        let copy = signal.clone();
        assert!(!copy.is_aborted());
        signal.abort();
        assert!(copy.is_aborted());
    }

    #[test]
    fn progress_callback_notifies() {
        let seen = Arc::new(AtomicU64::new(0));
        let sink = Arc::clone(&seen);
        let callback = ProgressCallback::new(move |event| {
            sink.store(event.loaded_bytes, Ordering::SeqCst);
        });

        callback.clone().notify(ProgressEvent { loaded_bytes: 512 });
        assert_eq!(seen.load(Ordering::SeqCst), 512);
        assert!(callback.ptr_eq(&callback.clone()));
    }
}
