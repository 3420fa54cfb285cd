//! Provider lifecycle tracking.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

use crate::error::CacheError;
use crate::result::CacheResult;

/// Lifecycle state of a provider instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderState {
    /// Options are being validated and the backend handle prepared.
    Constructing,
    /// Accepting operations.
    Ready,
    /// Backend handle released; every operation fails.
    Disposed,
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructing => write!(f, "constructing"),
            Self::Ready => write!(f, "ready"),
            Self::Disposed => write!(f, "disposed"),
        }
    }
}

const CONSTRUCTING: u8 = 0;
const READY: u8 = 1;
const DISPOSED: u8 = 2;

/// Atomic state cell shared by every provider implementation.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    /// A lifecycle in the `Constructing` state.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(CONSTRUCTING),
        }
    }

    /// Current state.
    pub fn state(&self) -> ProviderState {
        match self.state.load(Ordering::Acquire) {
            CONSTRUCTING => ProviderState::Constructing,
            READY => ProviderState::Ready,
            _ => ProviderState::Disposed,
        }
    }

    /// Move from `Constructing` to `Ready`.
    pub fn mark_ready(&self) {
        let _ = self
            .state
            .compare_exchange(CONSTRUCTING, READY, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Fail with `InvalidOperation` unless the provider is `Ready`.
    pub fn ensure_ready(&self, provider: &str) -> CacheResult<()> {
        match self.state() {
            ProviderState::Ready => Ok(()),
            state => Err(CacheError::invalid_operation(format!(
                "Cache provider '{provider}' is {state}"
            ))),
        }
    }

    /// Move to `Disposed`. Returns `true` only for the call that performed
    /// the transition.
    pub fn dispose(&self) -> bool {
        self.state.swap(DISPOSED, Ordering::AcqRel) != DISPOSED
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
