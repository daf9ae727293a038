// src/lib.rs
//! Sentra Lab Call Redirection Library
//!
//! Redirects invocations of one callable member (method, constructor,
//! property or event accessor) to another with a compatible signature, and
//! optionally exposes every redirected invocation to subscribers.
//!
//! # Architecture
//!
//! The library is structured into several key modules:
//!
//! - **metadata**: member descriptors, expressions, plans
//! - **validation**: signature compatibility and parameter shift modes
//! - **engine**: interception engine boundary and in-memory engine
//! - **redirection**: lifecycle state machine and the `Redirector` factory
//! - **observable**: registry and pub/sub fan-out of intercepted calls
//! - **observability**: tracing and metrics setup
//! - **utils**: configuration and errors
//!
//! # Example
//!
//! ```rust
//! use sentra_lab_redirect::{
//!     InMemoryEngine, Lifecycle, MethodDescriptor, RedirectionRegistry, Redirector, ShiftMode,
//! };
//! use std::sync::Arc;
//!
//! let registry = Arc::new(RedirectionRegistry::new());
//! let engine = Arc::new(InMemoryEngine::new(Arc::clone(&registry)));
//! let redirector = Redirector::new(engine);
//!
//! let original = MethodDescriptor::instance("Obj", "Get").with_param("int").returning("int");
//! let replacement = MethodDescriptor::static_method("Hooks", "Get")
//!     .with_param("Obj")
//!     .with_param("int")
//!     .returning("int");
//!
//! let redirection = redirector.redirect_method(&original, &replacement)?;
//! assert_eq!(redirection.shift_mode(), ShiftMode::InstanceToStatic);
//! redirection.start()?;
//! assert!(redirection.is_redirecting());
//! # Ok::<(), sentra_lab_redirect::RedirectError>(())
//! ```

// Public module exports
pub mod engine;
pub mod metadata;
pub mod observability;
pub mod observable;
pub mod redirection;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use engine::{EngineHandle, InMemoryEngine, InterceptionEngine};
pub use metadata::{
    EventDescriptor, MemberDescriptor, MemberExpression, MethodDescriptor, Parameter,
    PropertyDescriptor, TypeRef,
};
pub use observable::{ObservableRedirection, RedirectionContext, RedirectionRegistry, Subscription};
pub use redirection::{Lifecycle, Redirection, RedirectionState, Redirector};
pub use utils::config::RedirectConfig;
pub use utils::errors::{RedirectError, Result};
pub use validation::{MethodPlan, ShiftMode};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
