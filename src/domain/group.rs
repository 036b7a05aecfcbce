//! Item groups ("nomenclature categories").

use serde::{Deserialize, Serialize};

use super::code::Code;
use super::reference::ReferenceHolder;

/// A named grouping of items, e.g. "Ingredients" or "Tools".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identity.
    pub code: Code,
    /// Non-empty, trimmed display name.
    pub name: String,
}

impl Group {
    /// Construct a new group, trimming the supplied name.
    pub fn new(code: Code, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into().trim().to_string(),
        }
    }
}

impl ReferenceHolder for Group {
    fn references(&self) -> Vec<Code> {
        Vec::new()
    }

    fn rewrite_references(&mut self, _old: Code, _new: Code) -> bool {
        false
    }
}
