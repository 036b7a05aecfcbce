//! Items ("nomenclature") — the things that move through storage locations.

use serde::{Deserialize, Serialize};

use super::code::Code;
use super::reference::ReferenceHolder;

/// A catalog item: a named thing, belonging to a [`Group`](super::group::Group)
/// and measured in a declared [`Unit`](super::unit::Unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identity.
    pub code: Code,
    /// Display name.
    pub name: String,
    /// The group this item belongs to.
    pub group: Code,
    /// The unit this item's quantities are declared in.
    pub unit: Code,
}

impl Item {
    /// Construct a new item.
    pub fn new(code: Code, name: impl Into<String>, group: Code, unit: Code) -> Self {
        Self {
            code,
            name: name.into(),
            group,
            unit,
        }
    }
}

impl ReferenceHolder for Item {
    fn references(&self) -> Vec<Code> {
        vec![self.group, self.unit]
    }

    fn rewrite_references(&mut self, old: Code, new: Code) -> bool {
        let mut changed = false;
        if self.group == old {
            self.group = new;
            changed = true;
        }
        if self.unit == old {
            self.unit = new;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_replaces_matching_group() {
        let group = Code::new();
        let other_group = Code::new();
        let unit = Code::new();
        let mut item = Item::new(Code::new(), "flour", group, unit);
        assert!(item.rewrite_references(group, other_group));
        assert_eq!(item.group, other_group);
        assert_eq!(item.unit, unit);
    }

    #[test]
    fn rewrite_is_noop_for_unrelated_code() {
        let group = Code::new();
        let unit = Code::new();
        let mut item = Item::new(Code::new(), "flour", group, unit);
        assert!(!item.rewrite_references(Code::new(), Code::new()));
    }
}
