//! The closed set of entity kinds the repository buckets by.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which bucket an entity lives in. Mirrors the repository's eight named
/// buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Units of measure.
    Unit,
    /// Item groups.
    Group,
    /// Catalog items.
    Item,
    /// Storage locations.
    Location,
    /// Stock movements.
    Movement,
    /// Recipes.
    Recipe,
    /// Turnover-cache records.
    TurnoverCache,
    /// Anything not otherwise classified.
    Misc,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unit => "unit",
            Self::Group => "group",
            Self::Item => "item",
            Self::Location => "location",
            Self::Movement => "movement",
            Self::Recipe => "recipe",
            Self::TurnoverCache => "turnover_cache",
            Self::Misc => "misc",
        };
        write!(f, "{s}")
    }
}

impl FromStr for EntityKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unit" => Ok(Self::Unit),
            "group" => Ok(Self::Group),
            "item" => Ok(Self::Item),
            "location" => Ok(Self::Location),
            "movement" => Ok(Self::Movement),
            "recipe" => Ok(Self::Recipe),
            "turnover_cache" => Ok(Self::TurnoverCache),
            "misc" => Ok(Self::Misc),
            _ => Err(()),
        }
    }
}

impl EntityKind {
    /// Parse one of the four reference-service-facing kind names
    /// (`item`, `group`, `unit`, `location`). Other kinds are not reachable
    /// through the reference service's CRUD façade.
    pub fn from_reference_kind(s: &str) -> Option<Self> {
        match s {
            "item" => Some(Self::Item),
            "group" => Some(Self::Group),
            "unit" => Some(Self::Unit),
            "location" => Some(Self::Location),
            _ => None,
        }
    }

    /// All eight bucket kinds, as their lowercase singular names.
    pub fn all_names() -> [&'static str; 8] {
        ["unit", "group", "item", "location", "movement", "recipe", "turnover_cache", "misc"]
    }

    /// All eight bucket kinds, in repository iteration order.
    pub fn all() -> [Self; 8] {
        [
            Self::Unit,
            Self::Group,
            Self::Item,
            Self::Location,
            Self::Movement,
            Self::Recipe,
            Self::TurnoverCache,
            Self::Misc,
        ]
    }
}
