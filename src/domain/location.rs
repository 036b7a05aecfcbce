//! Storage locations.

use serde::{Deserialize, Serialize};

use super::code::Code;
use super::reference::ReferenceHolder;

/// A physical or logical storage location ("storage").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique identity.
    pub code: Code,
    /// Display name.
    pub name: String,
    /// Optional free-form address.
    pub address: Option<String>,
}

impl Location {
    /// Construct a new location.
    pub fn new(code: Code, name: impl Into<String>, address: Option<String>) -> Self {
        Self {
            code,
            name: name.into(),
            address,
        }
    }
}

impl ReferenceHolder for Location {
    fn references(&self) -> Vec<Code> {
        Vec::new()
    }

    fn rewrite_references(&mut self, _old: Code, _new: Code) -> bool {
        false
    }
}
