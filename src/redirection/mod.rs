// src/redirection/mod.rs
//! Redirections and their lifecycle
//!
//! - **Lifecycle**: Stopped/Started/Disposed state machine over engine handles
//! - **Method**: one method or constructor diverted to another
//! - **Accessor**: property and event accessor sets diverted together
//! - **Redirector**: the validated factory for all of the above
//!
//! Variant constructors are crate-private; callers go through [`Redirector`].

pub mod accessor;
pub mod lifecycle;
pub mod method;
pub mod redirector;

// Re-export commonly used types
pub use accessor::{EventRedirection, PropertyRedirection};
pub use lifecycle::{Lifecycle, RedirectionState};
pub use method::MethodRedirection;
pub use redirector::{Redirector, RedirectorConfig};

use crate::utils::errors::Result;

/// Any redirection produced by [`Redirector`]
#[derive(Debug)]
pub enum Redirection {
    Method(MethodRedirection),
    Property(PropertyRedirection),
    Event(EventRedirection),
}

impl Redirection {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Redirection::Method(_) => "method",
            Redirection::Property(_) => "property",
            Redirection::Event(_) => "event",
        }
    }

    pub fn as_method(&self) -> Option<&MethodRedirection> {
        match self {
            Redirection::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_method(self) -> Option<MethodRedirection> {
        match self {
            Redirection::Method(m) => Some(m),
            _ => None,
        }
    }

    fn lifecycle(&self) -> &dyn Lifecycle {
        match self {
            Redirection::Method(m) => m,
            Redirection::Property(p) => p,
            Redirection::Event(e) => e,
        }
    }
}

impl Lifecycle for Redirection {
    fn start(&self) -> Result<()> {
        self.lifecycle().start()
    }

    fn stop(&self) -> Result<()> {
        self.lifecycle().stop()
    }

    fn dispose(&self) -> Result<()> {
        self.lifecycle().dispose()
    }

    fn state(&self) -> RedirectionState {
        self.lifecycle().state()
    }
}
