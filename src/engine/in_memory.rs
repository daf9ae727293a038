// src/engine/in_memory.rs
//! In-process interception engine
//!
//! Method bodies are registered as closures over JSON values and every call
//! goes through [`InMemoryEngine::call`], which honours active splices the
//! way a native engine would at a callable's entry point:
//!
//! - replacement splices remap arguments according to the shift mode
//! - dispatch splices build a [`RedirectionContext`] and fan it out through
//!   the registry, returning whatever return value the observers set

use crate::engine::{EngineHandle, InterceptionEngine, OriginalInvoker};
use crate::metadata::descriptor::MethodDescriptor;
use crate::observable::context::RedirectionContext;
use crate::observable::registry::{RedirectionRegistry, RegistryKey};
use crate::utils::errors::{RedirectError, Result};
use crate::validation::method::{MethodPlan, ShiftMode};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Body of a method known to the engine
pub type MethodBody = Arc<dyn Fn(Option<&Value>, &[Value]) -> Result<Value> + Send + Sync>;

/// Where an active splice sends its calls
#[derive(Clone)]
enum Splice {
    Replacement { slot: String, shift: ShiftMode },
    Dispatch { key: RegistryKey, original: Arc<MethodDescriptor> },
}

/// Engine call counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub prepared: u64,
    pub activations: u64,
    pub deactivations: u64,
    pub releases: u64,
}

struct EngineState {
    registry: Arc<RedirectionRegistry>,
    bodies: DashMap<String, MethodBody>,
    splices: DashMap<String, Splice>,
    prepared: AtomicU64,
    activations: AtomicU64,
    deactivations: AtomicU64,
    releases: AtomicU64,
}

impl EngineState {
    fn invoke_body(&self, slot: &str, target: Option<&Value>, args: &[Value]) -> Result<Value> {
        // Clone out of the map so the shard lock is not held during the call
        let body = self
            .bodies
            .get(slot)
            .map(|b| Arc::clone(b.value()))
            .ok_or_else(|| RedirectError::InterceptionFailed(format!("No body defined for {}", slot)))?;
        body(target, args)
    }
}

/// In-process interception engine
#[derive(Clone)]
pub struct InMemoryEngine {
    state: Arc<EngineState>,
}

impl InMemoryEngine {
    /// Create an engine dispatching observed calls through `registry`
    pub fn new(registry: Arc<RedirectionRegistry>) -> Self {
        Self {
            state: Arc::new(EngineState {
                registry,
                bodies: DashMap::new(),
                splices: DashMap::new(),
                prepared: AtomicU64::new(0),
                activations: AtomicU64::new(0),
                deactivations: AtomicU64::new(0),
                releases: AtomicU64::new(0),
            }),
        }
    }

    /// Register the body executed when `method` is called
    pub fn define<F>(&self, method: &MethodDescriptor, body: F)
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.state.bodies.insert(method.qualified_name(), Arc::new(body));
    }

    /// Check whether calls to `method` are currently diverted
    pub fn is_spliced(&self, method: &MethodDescriptor) -> bool {
        self.state.splices.contains_key(&method.qualified_name())
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            prepared: self.state.prepared.load(Ordering::Relaxed),
            activations: self.state.activations.load(Ordering::Relaxed),
            deactivations: self.state.deactivations.load(Ordering::Relaxed),
            releases: self.state.releases.load(Ordering::Relaxed),
        }
    }

    /// Call `method` the way client code would
    pub fn call(&self, method: &MethodDescriptor, target: Option<Value>, args: Vec<Value>) -> Result<Value> {
        let slot = method.qualified_name();
        let splice = self.state.splices.get(&slot).map(|s| s.value().clone());

        match splice {
            None => self.state.invoke_body(&slot, target.as_ref(), &args),
            Some(Splice::Replacement { slot: replacement, shift }) => {
                trace!("Diverting {} to {} ({})", slot, replacement, shift);
                let (target, args) = remap(shift, target, args)?;
                self.state.invoke_body(&replacement, target.as_ref(), &args)
            }
            Some(Splice::Dispatch { key, original }) => {
                trace!("Dispatching {} to observers under {}", slot, key);
                let context = RedirectionContext::new(original, target, args);
                self.state.registry.dispatch(key, &context)?;
                Ok(context.take_return_value().unwrap_or(Value::Null))
            }
        }
    }

    fn handle(&self, slot: String, splice: Splice) -> Box<dyn EngineHandle> {
        self.state.prepared.fetch_add(1, Ordering::Relaxed);
        Box::new(InMemoryHandle {
            state: Arc::clone(&self.state),
            slot,
            splice,
            active: false,
            released: false,
        })
    }
}

impl Default for InMemoryEngine {
    /// Engine bound to the process-wide registry
    fn default() -> Self {
        Self::new(RedirectionRegistry::global())
    }
}

impl InterceptionEngine for InMemoryEngine {
    fn prepare_method(&self, plan: &MethodPlan) -> Result<Box<dyn EngineHandle>> {
        debug!(
            "Preparing splice {} -> {}",
            plan.original().qualified_name(),
            plan.replacement().qualified_name()
        );
        Ok(self.handle(
            plan.original().qualified_name(),
            Splice::Replacement {
                slot: plan.replacement().qualified_name(),
                shift: plan.shift_mode(),
            },
        ))
    }

    fn prepare_dispatch(&self, original: &MethodDescriptor, key: RegistryKey) -> Result<Box<dyn EngineHandle>> {
        debug!("Preparing dispatch splice {} -> {}", original.qualified_name(), key);
        Ok(self.handle(
            original.qualified_name(),
            Splice::Dispatch {
                key,
                original: Arc::new(original.clone()),
            },
        ))
    }

    fn registry(&self) -> Arc<RedirectionRegistry> {
        Arc::clone(&self.state.registry)
    }
}

/// Move the receiver between the target slot and the argument list
fn remap(shift: ShiftMode, target: Option<Value>, mut args: Vec<Value>) -> Result<(Option<Value>, Vec<Value>)> {
    match shift {
        ShiftMode::Identity => Ok((target, args)),
        ShiftMode::InstanceToStatic => {
            args.insert(0, target.unwrap_or(Value::Null));
            Ok((None, args))
        }
        ShiftMode::StaticToInstance => {
            if args.is_empty() {
                return Err(RedirectError::InterceptionFailed(
                    "Static call is missing its receiver argument".to_string(),
                ));
            }
            let receiver = args.remove(0);
            Ok((Some(receiver), args))
        }
    }
}

struct InMemoryHandle {
    state: Arc<EngineState>,
    slot: String,
    splice: Splice,
    active: bool,
    released: bool,
}

impl EngineHandle for InMemoryHandle {
    fn activate(&mut self) -> Result<()> {
        if self.released {
            return Err(RedirectError::InterceptionFailed(format!(
                "Handle for {} was released",
                self.slot
            )));
        }
        if self.active {
            return Ok(());
        }

        match self.state.splices.entry(self.slot.clone()) {
            Entry::Occupied(_) => {
                return Err(RedirectError::InterceptionFailed(format!(
                    "{} is already spliced",
                    self.slot
                )))
            }
            Entry::Vacant(entry) => {
                entry.insert(self.splice.clone());
            }
        }

        self.active = true;
        self.state.activations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        self.state.splices.remove(&self.slot);
        self.active = false;
        self.state.deactivations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }

        self.deactivate()?;
        self.released = true;
        self.state.releases.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn original_invoker(&self) -> Option<OriginalInvoker> {
        let state = Arc::clone(&self.state);
        let slot = self.slot.clone();
        Some(Arc::new(move |target: Option<&Value>, args: &[Value]| {
            state.invoke_body(&slot, target, args)
        }))
    }
}
