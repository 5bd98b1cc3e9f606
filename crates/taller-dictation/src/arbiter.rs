//! Exclusive ownership of the microphone.
//!
//! Controllers that share an arbiter never record at the same time. A lease
//! is held for the whole session and released when it is dropped.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::DictationError;

#[derive(Debug, Clone)]
pub struct MicrophoneArbiter {
    permits: Arc<Semaphore>,
}

impl Default for MicrophoneArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrophoneArbiter {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Take the microphone, or fail with `Busy` if another session holds it.
    pub fn try_acquire(&self) -> Result<MicrophoneLease, DictationError> {
        Arc::clone(&self.permits)
            .try_acquire_owned()
            .map(|permit| MicrophoneLease { _permit: permit })
            .map_err(|_| DictationError::Busy)
    }

    pub fn is_available(&self) -> bool {
        self.permits.available_permits() > 0
    }
}

/// Proof of microphone ownership; dropping it frees the device.
#[derive(Debug)]
pub struct MicrophoneLease {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_owner() {
        let arbiter = MicrophoneArbiter::new();
        let lease = arbiter.try_acquire().unwrap();
        assert!(!arbiter.is_available());
        assert_eq!(arbiter.try_acquire().unwrap_err(), DictationError::Busy);

        drop(lease);
        assert!(arbiter.is_available());
        assert!(arbiter.try_acquire().is_ok());
    }

    #[test]
    fn test_clones_share_the_device() {
        let page_a = MicrophoneArbiter::new();
        let page_b = page_a.clone();
        let _lease = page_a.try_acquire().unwrap();
        assert!(page_b.try_acquire().is_err());
    }

    #[test]
    fn test_independent_arbiters_do_not_block() {
        let a = MicrophoneArbiter::new();
        let b = MicrophoneArbiter::new();
        let _lease = a.try_acquire().unwrap();
        assert!(b.try_acquire().is_ok());
    }
}
