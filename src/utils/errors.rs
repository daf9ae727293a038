// src/utils/errors.rs
//! Error types for the redirection layer
//!
//! Validation errors are raised synchronously by the [`Redirector`] entry
//! points; lifecycle errors come from the interception engine unchanged.
//!
//! [`Redirector`]: crate::redirection::Redirector

use std::fmt;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RedirectError>;

/// Which side of a redirection a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    Replacement,
    Both,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Original => f.write_str("original"),
            Side::Replacement => f.write_str("replacement"),
            Side::Both => f.write_str("original and replacement"),
        }
    }
}

/// Signature rule that a pair of members violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureRule {
    /// Effective return types differ
    ReturnType,

    /// Property or event value types differ
    ValueType,

    /// The explicit receiver parameter does not match the declaring type
    ReceiverParameter,

    /// Parameter counts differ once the shift mode is applied
    ParameterCount,

    /// Parameter types differ at the given original index
    ParameterType(usize),

    /// `in`/`out` flags differ at the given original index
    ParameterFlags(usize),

    /// Accessors disagree on being static
    Staticness,
}

impl fmt::Display for SignatureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureRule::ReturnType => f.write_str("return type"),
            SignatureRule::ValueType => f.write_str("value type"),
            SignatureRule::ReceiverParameter => f.write_str("receiver parameter"),
            SignatureRule::ParameterCount => f.write_str("parameter count"),
            SignatureRule::ParameterType(i) => write!(f, "parameter {} type", i),
            SignatureRule::ParameterFlags(i) => write!(f, "parameter {} in/out flags", i),
            SignatureRule::Staticness => f.write_str("static modifier"),
        }
    }
}

/// Redirection errors
#[derive(Error, Debug)]
pub enum RedirectError {
    #[error("Missing required argument: {0}")]
    NullArgument(String),

    #[error("The {side} member '{member}' is abstract and cannot be intercepted")]
    AbstractMember { side: Side, member: String },

    #[error("Member kind mismatch: {0}")]
    KindMismatch(String),

    #[error("Incompatible signature ({side}, {rule}): {detail}")]
    IncompatibleSignature {
        side: Side,
        rule: SignatureRule,
        detail: String,
    },

    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("Interception failed: {0}")]
    InterceptionFailed(String),

    #[error("Redirection has been disposed")]
    RedirectionDisposed,

    #[error("No observable redirection registered under key {0}")]
    ObservableNotFound(u64),

    #[error("Observer failed: {0}")]
    ObserverFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Plan error: {0}")]
    PlanError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RedirectError {
    pub(crate) fn incompatible(side: Side, rule: SignatureRule, detail: impl Into<String>) -> Self {
        RedirectError::IncompatibleSignature {
            side,
            rule,
            detail: detail.into(),
        }
    }

    /// True for errors raised by signature validation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RedirectError::NullArgument(_)
                | RedirectError::AbstractMember { .. }
                | RedirectError::KindMismatch(_)
                | RedirectError::IncompatibleSignature { .. }
                | RedirectError::UnsupportedExpression(_)
        )
    }
}

impl From<config::ConfigError> for RedirectError {
    fn from(err: config::ConfigError) -> Self {
        RedirectError::ConfigError(err.to_string())
    }
}
