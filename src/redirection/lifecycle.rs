// src/redirection/lifecycle.rs
//! Redirection lifecycle
//!
//! ```text
//!            start()            stop()
//! Stopped ───────────▶ Started ────────▶ Stopped
//!    │                    │
//!    └──── dispose() ─────┴──────▶ Disposed (terminal)
//! ```
//!
//! `start` and `stop` are no-ops when the redirection is already in the
//! requested state, so the engine is never asked to splice twice.

use crate::engine::{EngineHandle, OriginalInvoker};
use crate::utils::errors::{RedirectError, Result};
use metrics::counter;
use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, trace, warn};

/// Lifecycle state of a redirection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectionState {
    Stopped,
    Started,
    Disposed,
}

impl fmt::Display for RedirectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectionState::Stopped => f.write_str("stopped"),
            RedirectionState::Started => f.write_str("started"),
            RedirectionState::Disposed => f.write_str("disposed"),
        }
    }
}

/// Start/stop/dispose contract shared by every redirection
pub trait Lifecycle {
    /// Begin diverting calls; no-op if already started
    fn start(&self) -> Result<()>;

    /// Stop diverting calls; no-op if already stopped
    fn stop(&self) -> Result<()>;

    /// Stop and release engine resources; idempotent
    fn dispose(&self) -> Result<()>;

    fn state(&self) -> RedirectionState;

    fn is_redirecting(&self) -> bool {
        self.state() == RedirectionState::Started
    }
}

struct SpliceSetInner {
    state: RedirectionState,
    handles: Vec<Box<dyn EngineHandle>>,
}

/// The engine handles behind one redirection, switched together
pub(crate) struct SpliceSet {
    label: String,
    inner: Mutex<SpliceSetInner>,
}

impl SpliceSet {
    pub(crate) fn new(label: String, handles: Vec<Box<dyn EngineHandle>>) -> Self {
        Self {
            label,
            inner: Mutex::new(SpliceSetInner {
                state: RedirectionState::Stopped,
                handles,
            }),
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn state(&self) -> RedirectionState {
        self.inner.lock().state
    }

    pub(crate) fn start(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.state {
            RedirectionState::Started => {
                trace!("Redirection {} already started", self.label);
                Ok(())
            }
            RedirectionState::Disposed => Err(disposed(&self.label)),
            RedirectionState::Stopped => {
                for i in 0..inner.handles.len() {
                    if let Err(e) = inner.handles[i].activate() {
                        // Leave no accessor half-spliced
                        for handle in inner.handles[..i].iter_mut().rev() {
                            if let Err(rollback) = handle.deactivate() {
                                warn!("Rollback of {} failed: {}", self.label, rollback);
                            }
                        }
                        return Err(e);
                    }
                }

                inner.state = RedirectionState::Started;
                counter!("redirect_activations_total").increment(1);
                debug!("Started redirection {}", self.label);
                Ok(())
            }
        }
    }

    pub(crate) fn stop(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.state {
            RedirectionState::Stopped => {
                trace!("Redirection {} already stopped", self.label);
                Ok(())
            }
            RedirectionState::Disposed => Err(disposed(&self.label)),
            RedirectionState::Started => {
                for handle in inner.handles.iter_mut() {
                    handle.deactivate()?;
                }

                inner.state = RedirectionState::Stopped;
                debug!("Stopped redirection {}", self.label);
                Ok(())
            }
        }
    }

    pub(crate) fn dispose(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if inner.state == RedirectionState::Disposed {
            return Ok(());
        }

        if inner.state == RedirectionState::Started {
            for handle in inner.handles.iter_mut() {
                handle.deactivate()?;
            }
            inner.state = RedirectionState::Stopped;
        }

        for handle in inner.handles.iter_mut() {
            handle.release()?;
        }
        inner.handles.clear();
        inner.state = RedirectionState::Disposed;

        debug!("Disposed redirection {}", self.label);
        Ok(())
    }

    /// Invoker for the original body behind handle `index`
    pub(crate) fn original_invoker(&self, index: usize) -> Result<OriginalInvoker> {
        let inner = self.inner.lock();
        if inner.state == RedirectionState::Disposed {
            return Err(disposed(&self.label));
        }

        inner
            .handles
            .get(index)
            .and_then(|h| h.original_invoker())
            .ok_or_else(|| {
                RedirectError::InterceptionFailed(format!(
                    "Engine cannot invoke the original of {}",
                    self.label
                ))
            })
    }
}

impl Drop for SpliceSet {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!("Failed to dispose redirection {} on drop: {}", self.label, e);
        }
    }
}

fn disposed(label: &str) -> RedirectError {
    debug!("Rejected lifecycle call on disposed redirection {}", label);
    RedirectError::RedirectionDisposed
}
