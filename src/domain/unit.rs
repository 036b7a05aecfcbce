//! Units of measure and their conversion tree.
//!
//! Units form a rooted tree per independent measurement family: the root
//! carries no parent and a factor of 1; every other unit carries a positive
//! integer factor, the count of parent units per this unit (e.g. `kilogram`
//! with parent `gram` has factor 1000).

use serde::{Deserialize, Serialize};

use super::code::Code;
use crate::error::{CatalogError, Result};

/// Recursion depth guard for parent-chain walks. Cycles or pathologically
/// deep chains turn into an error instead of a stack overflow.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identity.
    pub code: Code,
    /// Display name.
    pub name: String,
    /// Count of parent units per this unit. Must be positive.
    pub factor: u32,
    /// Parent unit in the conversion tree, or `None` at the root.
    pub parent: Option<Code>,
}

impl Unit {
    /// Construct a root unit (no parent, factor 1).
    pub fn root(code: Code, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            factor: 1,
            parent: None,
        }
    }

    /// Construct a child unit with the given parent and factor.
    pub fn child(code: Code, name: impl Into<String>, factor: u32, parent: Code) -> Self {
        Self {
            code,
            name: name.into(),
            factor,
            parent: Some(parent),
        }
    }
}

/// Anything that can resolve a unit [`Code`] to the [`Unit`] it names.
///
/// Implemented by the repository; kept generic here so the conversion tree
/// has no hard dependency on the repository's concrete storage layout.
pub trait UnitLookup {
    /// Look up a unit by code.
    fn unit(&self, code: Code) -> Option<Unit>;
}

/// Follow parent links from `start` until a unit with no parent is found.
pub fn root<L: UnitLookup>(lookup: &L, start: Code) -> Result<Unit> {
    let mut current = lookup
        .unit(start)
        .ok_or_else(|| CatalogError::integrity(format!("unit {start} not found")))?;
    let mut depth = 0usize;
    while let Some(parent_code) = current.parent {
        depth += 1;
        if depth > MAX_CHAIN_DEPTH {
            return Err(CatalogError::integrity(format!(
                "unit {start} has a parent chain deeper than {MAX_CHAIN_DEPTH} (cycle?)"
            )));
        }
        current = lookup
            .unit(parent_code)
            .ok_or_else(|| CatalogError::integrity(format!("unit {parent_code} not found")))?;
    }
    Ok(current)
}

/// Convert a quantity expressed in unit `start` to the root unit of its tree.
pub fn to_root<L: UnitLookup>(lookup: &L, start: Code, quantity: f64) -> Result<f64> {
    let mut current = lookup
        .unit(start)
        .ok_or_else(|| CatalogError::integrity(format!("unit {start} not found")))?;
    let mut acc = quantity;
    let mut depth = 0usize;
    loop {
        match current.parent {
            None => return Ok(acc),
            Some(parent_code) => {
                depth += 1;
                if depth > MAX_CHAIN_DEPTH {
                    return Err(CatalogError::integrity(format!(
                        "unit {start} has a parent chain deeper than {MAX_CHAIN_DEPTH} (cycle?)"
                    )));
                }
                acc *= current.factor as f64;
                current = lookup.unit(parent_code).ok_or_else(|| {
                    CatalogError::integrity(format!("unit {parent_code} not found"))
                })?;
            }
        }
    }
}

/// Convert a quantity expressed in the root unit back into unit `target`.
pub fn from_root<L: UnitLookup>(lookup: &L, target: Code, quantity: f64) -> Result<f64> {
    // Accumulate the cumulative factor from target to root, then divide once.
    let mut current = lookup
        .unit(target)
        .ok_or_else(|| CatalogError::integrity(format!("unit {target} not found")))?;
    let mut cumulative_factor = 1.0f64;
    let mut depth = 0usize;
    loop {
        match current.parent {
            None => return Ok(quantity / cumulative_factor),
            Some(parent_code) => {
                depth += 1;
                if depth > MAX_CHAIN_DEPTH {
                    return Err(CatalogError::integrity(format!(
                        "unit {target} has a parent chain deeper than {MAX_CHAIN_DEPTH} (cycle?)"
                    )));
                }
                cumulative_factor *= current.factor as f64;
                current = lookup.unit(parent_code).ok_or_else(|| {
                    CatalogError::integrity(format!("unit {parent_code} not found"))
                })?;
            }
        }
    }
}

/// Convert a quantity from unit `from` to unit `to`, via their shared root.
///
/// Both units must belong to the same measurement family (share a root);
/// this is not checked here since callers generally convert within one
/// item's declared unit tree.
pub fn convert<L: UnitLookup>(lookup: &L, from: Code, to: Code, quantity: f64) -> Result<f64> {
    let at_root = to_root(lookup, from, quantity)?;
    from_root(lookup, to, at_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapLookup(HashMap<Code, Unit>);

    impl UnitLookup for MapLookup {
        fn unit(&self, code: Code) -> Option<Unit> {
            self.0.get(&code).cloned()
        }
    }

    fn gram_kilogram() -> (MapLookup, Code, Code) {
        let gram_code = Code::new();
        let kg_code = Code::new();
        let gram = Unit::root(gram_code, "gram");
        let kg = Unit::child(kg_code, "kilogram", 1000, gram_code);
        let mut map = HashMap::new();
        map.insert(gram_code, gram);
        map.insert(kg_code, kg);
        (MapLookup(map), gram_code, kg_code)
    }

    #[test]
    fn to_root_converts_kilogram_to_gram() {
        let (lookup, _gram, kg) = gram_kilogram();
        let grams = to_root(&lookup, kg, 0.1).unwrap();
        assert!((grams - 100.0).abs() < 1e-9);
    }

    #[test]
    fn root_of_root_is_identity() {
        let (lookup, gram, _kg) = gram_kilogram();
        let grams = to_root(&lookup, gram, 50.0).unwrap();
        assert!((grams - 50.0).abs() < 1e-9);
    }

    #[test]
    fn round_trip_within_tolerance() {
        let (lookup, _gram, kg) = gram_kilogram();
        for q in [0.001, 1.0, 123.456, 1e6] {
            let at_root = to_root(&lookup, kg, q).unwrap();
            let back = from_root(&lookup, kg, at_root).unwrap();
            let rel_err = (back - q).abs() / q.abs().max(1e-12);
            assert!(rel_err < 1e-9, "q={q} back={back}");
        }
    }

    #[test]
    fn cycle_is_rejected() {
        let a_code = Code::new();
        let b_code = Code::new();
        let a = Unit::child(a_code, "a", 2, b_code);
        let b = Unit::child(b_code, "b", 2, a_code);
        let mut map = HashMap::new();
        map.insert(a_code, a);
        map.insert(b_code, b);
        let lookup = MapLookup(map);
        assert!(to_root(&lookup, a_code, 1.0).is_err());
    }
}
