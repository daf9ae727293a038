// src/engine/mod.rs
//! Interception engine boundary
//!
//! The engine is the component that actually rewrites a callable's entry
//! point. This crate only tells it *what* to splice and *when*:
//!
//! ```text
//! Redirector ── prepare_method(plan) ──────────▶ EngineHandle
//!            ── prepare_dispatch(original, key) ─▶ EngineHandle
//!
//! EngineHandle: activate ⇄ deactivate → release
//! ```
//!
//! Handles must tolerate redundant calls: activating an active handle or
//! releasing a released one is a no-op.

pub mod in_memory;

use crate::metadata::descriptor::MethodDescriptor;
use crate::observable::registry::{RedirectionRegistry, RegistryKey};
use crate::utils::errors::Result;
use crate::validation::method::MethodPlan;
use serde_json::Value;
use std::sync::Arc;

pub use in_memory::{EngineStats, InMemoryEngine, MethodBody};

/// Calls the original body of a redirected method, bypassing the splice
pub type OriginalInvoker = Arc<dyn Fn(Option<&Value>, &[Value]) -> Result<Value> + Send + Sync>;

/// Engine-side state for one spliced callable
pub trait EngineHandle: Send {
    /// Divert calls from the original to the target
    fn activate(&mut self) -> Result<()>;

    /// Restore the original entry point
    fn deactivate(&mut self) -> Result<()>;

    /// Free engine resources; the handle is unusable afterwards
    fn release(&mut self) -> Result<()>;

    /// Invoker for the original body, if the engine supports it
    fn original_invoker(&self) -> Option<OriginalInvoker> {
        None
    }
}

/// Low-level call interception
pub trait InterceptionEngine: Send + Sync {
    /// Prepare a splice from `plan.original()` to `plan.replacement()`
    fn prepare_method(&self, plan: &MethodPlan) -> Result<Box<dyn EngineHandle>>;

    /// Prepare a splice from `original` to the registry fan-out for `key`
    fn prepare_dispatch(&self, original: &MethodDescriptor, key: RegistryKey) -> Result<Box<dyn EngineHandle>>;

    /// Registry that dispatch splices look their keys up in
    fn registry(&self) -> Arc<RedirectionRegistry>;
}
