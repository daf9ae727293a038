// src/observable/mod.rs
//! Observable redirections
//!
//! - **Context**: payload describing one intercepted invocation
//! - **Registry**: key → observable lookup used by the engine
//! - **Observable Redirection**: pub/sub multiplexer over a method redirection
//!
//! # Flow
//!
//! ```text
//! Redirector::observe(original)
//!     │  key = registry.next_key()
//!     │  engine.prepare_dispatch(original, key)
//!     ▼
//! ObservableRedirection ── subscribe ──▶ start splice
//!     │
//! intercepted call → registry.dispatch(key, ctx) → observers (in order)
//! ```

pub mod context;
pub mod observable_redirection;
pub mod registry;

// Re-export commonly used types
pub use context::RedirectionContext;
pub use observable_redirection::{ObservableEntry, ObservableRedirection, RedirectionObserver, Subscription};
pub use registry::{RedirectionRegistry, RegistryKey};
