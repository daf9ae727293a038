// src/metadata/expression.rs
//! Symbolic member references
//!
//! A [`MemberExpression`] is what a caller hands over when it picks a member
//! by writing an expression instead of spelling out its metadata. Parsing
//! the expression happens outside this crate; only the resolved shape
//! arrives here.

use crate::metadata::descriptor::{EventDescriptor, MethodDescriptor, PropertyDescriptor};

/// Resolved target of a member-access expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessTarget {
    Property(PropertyDescriptor),
    Event(EventDescriptor),
    Field { name: String },
}

/// Resolved symbolic member reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberExpression {
    /// `obj.Method(..)` or `Type.Method(..)`
    Call(MethodDescriptor),

    /// `obj.Member` or `Type.Member`
    MemberAccess(AccessTarget),

    /// Any other expression shape (lambda, constant, binary, ...)
    Unsupported { shape: String },
}

impl MemberExpression {
    pub fn call(method: MethodDescriptor) -> Self {
        MemberExpression::Call(method)
    }

    pub fn property(property: PropertyDescriptor) -> Self {
        MemberExpression::MemberAccess(AccessTarget::Property(property))
    }

    pub fn event(event: EventDescriptor) -> Self {
        MemberExpression::MemberAccess(AccessTarget::Event(event))
    }

    /// Short name of the expression shape, used in error messages
    pub fn shape(&self) -> &str {
        match self {
            MemberExpression::Call(_) => "call",
            MemberExpression::MemberAccess(AccessTarget::Property(_)) => "property access",
            MemberExpression::MemberAccess(AccessTarget::Event(_)) => "event access",
            MemberExpression::MemberAccess(AccessTarget::Field { .. }) => "field access",
            MemberExpression::Unsupported { shape } => shape,
        }
    }
}
