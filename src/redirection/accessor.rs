// src/redirection/accessor.rs
//! Property and event redirections
//!
//! Both are a set of accessor splices switched as one unit.

use crate::engine::EngineHandle;
use crate::metadata::descriptor::{EventDescriptor, PropertyDescriptor};
use crate::redirection::lifecycle::{Lifecycle, RedirectionState, SpliceSet};
use crate::utils::errors::Result;
use crate::validation::accessor::{EventPlan, PropertyPlan};
use std::fmt;

/// Redirection of a property's accessors
pub struct PropertyRedirection {
    plan: PropertyPlan,
    splices: SpliceSet,
}

impl PropertyRedirection {
    pub(crate) fn new(plan: PropertyPlan, handles: Vec<Box<dyn EngineHandle>>) -> Self {
        let label = format!(
            "{}::{} -> {}::{}",
            plan.original().declaring_type,
            plan.original().name,
            plan.replacement().declaring_type,
            plan.replacement().name
        );
        Self {
            plan,
            splices: SpliceSet::new(label, handles),
        }
    }

    pub fn original(&self) -> &PropertyDescriptor {
        self.plan.original()
    }

    pub fn replacement(&self) -> &PropertyDescriptor {
        self.plan.replacement()
    }

    pub fn plan(&self) -> &PropertyPlan {
        &self.plan
    }
}

impl Lifecycle for PropertyRedirection {
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

impl fmt::Debug for PropertyRedirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRedirection")
            .field("redirection", &self.splices.label())
            .field("state", &self.state())
            .finish()
    }
}

/// Redirection of an event's accessors
pub struct EventRedirection {
    plan: EventPlan,
    splices: SpliceSet,
}

impl EventRedirection {
    pub(crate) fn new(plan: EventPlan, handles: Vec<Box<dyn EngineHandle>>) -> Self {
        let label = format!(
            "{}::{} -> {}::{}",
            plan.original().declaring_type,
            plan.original().name,
            plan.replacement().declaring_type,
            plan.replacement().name
        );
        Self {
            plan,
            splices: SpliceSet::new(label, handles),
        }
    }

    pub fn original(&self) -> &EventDescriptor {
        self.plan.original()
    }

    pub fn replacement(&self) -> &EventDescriptor {
        self.plan.replacement()
    }

    pub fn plan(&self) -> &EventPlan {
        &self.plan
    }
}

impl Lifecycle for EventRedirection {
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

impl fmt::Debug for EventRedirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRedirection")
            .field("redirection", &self.splices.label())
            .field("state", &self.state())
            .finish()
    }
}
