// src/validation/expression.rs
//! Validation of symbolic member references

use crate::metadata::descriptor::MemberDescriptor;
use crate::metadata::expression::{AccessTarget, MemberExpression};
use crate::utils::errors::{RedirectError, Result};
use crate::validation::accessor::{validate_event, validate_property, EventPlan, PropertyPlan};
use crate::validation::method::{validate_method, MethodPlan};

/// Validated plan for any kind of member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectionPlan {
    Method(MethodPlan),
    Property(PropertyPlan),
    Event(EventPlan),
}

/// Validate two resolved member expressions
///
/// Two calls are checked as methods, two property or event accesses as
/// properties or events. Any other shape, or differing shapes, is rejected.
pub fn validate_expression(
    original: &MemberExpression,
    replacement: &MemberExpression,
) -> Result<RedirectionPlan> {
    use AccessTarget::{Event, Property};
    use MemberExpression::{Call, MemberAccess};

    match (original, replacement) {
        (Call(o), Call(r)) => validate_method(o, r).map(RedirectionPlan::Method),
        (MemberAccess(Property(o)), MemberAccess(Property(r))) => {
            validate_property(o, r).map(RedirectionPlan::Property)
        }
        (MemberAccess(Event(o)), MemberAccess(Event(r))) => {
            validate_event(o, r).map(RedirectionPlan::Event)
        }
        (o, r) => Err(RedirectError::UnsupportedExpression(format!(
            "cannot redirect {} to {}",
            o.shape(),
            r.shape()
        ))),
    }
}

/// Validate two member descriptors of the same kind
pub fn validate_member(
    original: &MemberDescriptor,
    replacement: &MemberDescriptor,
) -> Result<RedirectionPlan> {
    match (original, replacement) {
        (MemberDescriptor::Method(o), MemberDescriptor::Method(r)) => {
            validate_method(o, r).map(RedirectionPlan::Method)
        }
        (MemberDescriptor::Property(o), MemberDescriptor::Property(r)) => {
            validate_property(o, r).map(RedirectionPlan::Property)
        }
        (MemberDescriptor::Event(o), MemberDescriptor::Event(r)) => {
            validate_event(o, r).map(RedirectionPlan::Event)
        }
        (o, r) => Err(RedirectError::KindMismatch(format!(
            "cannot redirect {} '{}' to {} '{}'",
            o.kind_name(),
            o.name(),
            r.kind_name(),
            r.name()
        ))),
    }
}
