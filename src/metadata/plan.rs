// src/metadata/plan.rs
//! Redirect plans
//!
//! A plan is a YAML or JSON document listing member descriptors and the
//! redirections to build between them:
//!
//! ```yaml
//! members:
//!   Obj::Get:
//!     member: method
//!     name: Get
//!     declaring_type: Obj
//!     parameters: [{ type: int }]
//!     return_type: int
//! redirections:
//!   - name: get-hook
//!     original: Obj::Get
//!     replacement: Hooks::Get
//! ```

use crate::metadata::provider::MetadataCatalog;
use crate::utils::errors::{RedirectError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One redirection requested by a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRedirection {
    pub name: String,
    pub original: String,
    pub replacement: String,
}

/// Redirect plan document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedirectPlan {
    #[serde(default)]
    pub members: MetadataCatalog,

    #[serde(default)]
    pub redirections: Vec<PlannedRedirection>,
}

impl RedirectPlan {
    /// Load a plan, picking the format from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let plan = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&text)?,
            other => {
                return Err(RedirectError::PlanError(format!(
                    "Unsupported plan format: {:?}",
                    other
                )))
            }
        };

        info!(
            "Loaded redirect plan {:?}: {} members, {} redirections",
            path,
            plan.members.len(),
            plan.redirections.len()
        );
        Ok(plan)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| RedirectError::PlanError(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| RedirectError::PlanError(e.to_string()))
    }
}
