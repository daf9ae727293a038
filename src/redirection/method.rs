// src/redirection/method.rs
//! Method redirection

use crate::engine::EngineHandle;
use crate::metadata::descriptor::MethodDescriptor;
use crate::redirection::lifecycle::{Lifecycle, RedirectionState, SpliceSet};
use crate::utils::errors::Result;
use crate::validation::method::{MethodPlan, ParameterMapping, ShiftMode};
use serde_json::Value;
use std::fmt;

/// Redirection of one method or constructor to another
pub struct MethodRedirection {
    plan: MethodPlan,
    splices: SpliceSet,
}

impl MethodRedirection {
    pub(crate) fn new(plan: MethodPlan, handle: Box<dyn EngineHandle>) -> Self {
        let label = format!(
            "{} -> {}",
            plan.original().qualified_name(),
            plan.replacement().qualified_name()
        );
        Self {
            plan,
            splices: SpliceSet::new(label, vec![handle]),
        }
    }

    pub fn original(&self) -> &MethodDescriptor {
        self.plan.original()
    }

    pub fn replacement(&self) -> &MethodDescriptor {
        self.plan.replacement()
    }

    pub fn shift_mode(&self) -> ShiftMode {
        self.plan.shift_mode()
    }

    pub fn mapping(&self) -> &ParameterMapping {
        self.plan.mapping()
    }

    pub fn plan(&self) -> &MethodPlan {
        &self.plan
    }

    /// Call the original body, even while calls are being redirected
    pub fn invoke_original(&self, target: Option<&Value>, args: &[Value]) -> Result<Value> {
        // The splice lock is released before running user code
        let invoker = self.splices.original_invoker(0)?;
        invoker(target, args)
    }
}

impl Lifecycle for MethodRedirection {
    fn start(&self) -> Result<()> {
        self.splices.start()
    }

    fn stop(&self) -> Result<()> {
        self.splices.stop()
    }

    fn dispose(&self) -> Result<()> {
        self.splices.dispose()
    }

    fn state(&self) -> RedirectionState {
        self.splices.state()
    }
}

impl fmt::Debug for MethodRedirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRedirection")
            .field("redirection", &self.splices.label())
            .field("shift", &self.plan.shift_mode())
            .field("state", &self.state())
            .finish()
    }
}
