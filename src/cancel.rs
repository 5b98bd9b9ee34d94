//! Cooperative cancellation
//!
//! A [`CancelToken`] is threaded through every mutating operation. It is
//! checked before the registry write that ends each create/remove path, so a
//! cancelled operation never leaves a registry entry without its backing
//! directory and git metadata.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// Returns `Err(Error::Canceled)` once the token has been tripped.
    pub fn check(&self) -> Result<()> {
        if self.is_canceled() {
            Err(Error::Canceled)
        } else {
            Ok(())
        }
    }

    /// Trip this token on Ctrl-C / SIGTERM.
    ///
    /// Only one handler can be installed per process.
    pub fn install_signal_handler(&self) -> anyhow::Result<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            tracing::warn!("interrupt received, finishing current step");
            token.cancel();
        })?;
        Ok(())
    }
}
