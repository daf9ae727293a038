// src/metadata/provider.rs
//! Metadata resolution
//!
//! Looks up member descriptors by path (`Type::Member`). The production
//! provider lives with the reflection collaborator; [`MetadataCatalog`] is
//! the in-memory one used by plans and tests.

use crate::metadata::descriptor::MemberDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Source of member descriptors
pub trait MetadataProvider {
    /// Resolve a member path, `None` if the member does not exist
    fn resolve(&self, path: &str) -> Option<MemberDescriptor>;
}

/// In-memory member catalog keyed by path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataCatalog {
    members: HashMap<String, MemberDescriptor>,
}

impl MetadataCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, member: MemberDescriptor) {
        self.members.insert(path.into(), member);
    }

    pub fn with_member(mut self, path: impl Into<String>, member: MemberDescriptor) -> Self {
        self.insert(path, member);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl MetadataProvider for MetadataCatalog {
    fn resolve(&self, path: &str) -> Option<MemberDescriptor> {
        let found = self.members.get(path).cloned();
        if found.is_none() {
            debug!("Member path not found in catalog: {}", path);
        }
        found
    }
}
