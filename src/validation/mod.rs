// src/validation/mod.rs
//! Signature compatibility validation
//!
//! Pure functions deciding whether one member may stand in for another:
//!
//! - **Method**: abstract/kind/return checks, shift mode, parameter mapping
//! - **Accessor**: property and event accessor sets
//! - **Expression**: resolved member references and member descriptors
//!
//! Rules are checked in a fixed order and the first violation is reported.

pub mod accessor;
pub mod expression;
pub mod method;

// Re-export commonly used types
pub use accessor::{validate_event, validate_property, EventPlan, PropertyPlan};
pub use expression::{validate_expression, validate_member, RedirectionPlan};
pub use method::{validate_method, MethodPlan, ParameterMapping, ShiftMode};
