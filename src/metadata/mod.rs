// src/metadata/mod.rs
//! Member metadata
//!
//! The redirection layer never inspects callables directly. Everything it
//! knows arrives as descriptors from the reflection collaborator:
//!
//! - **Descriptors**: methods, constructors, properties, events
//! - **Expressions**: resolved symbolic member references
//! - **Provider**: path → descriptor lookup
//! - **Plan**: YAML/JSON documents describing redirections

pub mod descriptor;
pub mod expression;
pub mod plan;
pub mod provider;

// Re-export commonly used types
pub use descriptor::{
    CallableKind, EventDescriptor, MemberDescriptor, MethodDescriptor, Parameter,
    PropertyDescriptor, TypeRef,
};
pub use expression::{AccessTarget, MemberExpression};
pub use plan::{PlannedRedirection, RedirectPlan};
pub use provider::{MetadataCatalog, MetadataProvider};
