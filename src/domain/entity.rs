//! The [`Entity`] sum type: every concrete kind the repository can hold.

use serde::{Deserialize, Serialize};

use super::code::Code;
use super::group::Group;
use super::item::Item;
use super::kind::EntityKind;
use super::location::Location;
use super::movement::Movement;
use super::recipe::Recipe;
use super::reference::ReferenceHolder;
use super::turnover_cache::TurnoverCacheRecord;
use super::unit::Unit;

/// A tagged union over every entity kind the repository stores.
///
/// Lets the repository, the event bus, and the integrity sweep treat
/// heterogeneous entities uniformly without reflection: matching on the
/// variant recovers the concrete type when one is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Entity {
    /// A unit of measure.
    Unit(Unit),
    /// An item group.
    Group(Group),
    /// A catalog item.
    Item(Item),
    /// A storage location.
    Location(Location),
    /// A stock movement.
    Movement(Movement),
    /// A recipe.
    Recipe(Recipe),
    /// A turnover-cache record.
    TurnoverCache(TurnoverCacheRecord),
}

impl Entity {
    /// This entity's unique code, regardless of kind.
    pub fn code(&self) -> Code {
        match self {
            Self::Unit(u) => u.code,
            Self::Group(g) => g.code,
            Self::Item(i) => i.code,
            Self::Location(l) => l.code,
            Self::Movement(m) => m.code,
            Self::Recipe(r) => r.code,
            Self::TurnoverCache(t) => t.code,
        }
    }

    /// Which bucket this entity belongs in.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Unit(_) => EntityKind::Unit,
            Self::Group(_) => EntityKind::Group,
            Self::Item(_) => EntityKind::Item,
            Self::Location(_) => EntityKind::Location,
            Self::Movement(_) => EntityKind::Movement,
            Self::Recipe(_) => EntityKind::Recipe,
            Self::TurnoverCache(_) => EntityKind::TurnoverCache,
        }
    }

    /// Borrow as an [`Item`] if this entity is one.
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Item(i) => Some(i),
            _ => None,
        }
    }

    /// Borrow as a [`Unit`] if this entity is one.
    pub fn as_unit(&self) -> Option<&Unit> {
        match self {
            Self::Unit(u) => Some(u),
            _ => None,
        }
    }

    /// Borrow as a [`Group`] if this entity is one.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Borrow as a [`Location`] if this entity is one.
    pub fn as_location(&self) -> Option<&Location> {
        match self {
            Self::Location(l) => Some(l),
            _ => None,
        }
    }

    /// Borrow as a [`Movement`] if this entity is one.
    pub fn as_movement(&self) -> Option<&Movement> {
        match self {
            Self::Movement(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow as a [`Recipe`] if this entity is one.
    pub fn as_recipe(&self) -> Option<&Recipe> {
        match self {
            Self::Recipe(r) => Some(r),
            _ => None,
        }
    }

    /// Borrow as a [`TurnoverCacheRecord`] if this entity is one.
    pub fn as_turnover_cache(&self) -> Option<&TurnoverCacheRecord> {
        match self {
            Self::TurnoverCache(t) => Some(t),
            _ => None,
        }
    }
}

impl ReferenceHolder for Entity {
    fn references(&self) -> Vec<Code> {
        match self {
            Self::Unit(u) => u.parent.into_iter().collect(),
            Self::Group(g) => g.references(),
            Self::Item(i) => i.references(),
            Self::Location(l) => l.references(),
            Self::Movement(m) => m.references(),
            Self::Recipe(r) => r.references(),
            Self::TurnoverCache(t) => t.references(),
        }
    }

    fn rewrite_references(&mut self, old: Code, new: Code) -> bool {
        match self {
            Self::Unit(u) => {
                if u.parent == Some(old) {
                    u.parent = Some(new);
                    true
                } else {
                    false
                }
            }
            Self::Group(g) => g.rewrite_references(old, new),
            Self::Item(i) => i.rewrite_references(old, new),
            Self::Location(l) => l.rewrite_references(old, new),
            Self::Movement(m) => m.rewrite_references(old, new),
            Self::Recipe(r) => r.rewrite_references(old, new),
            Self::TurnoverCache(t) => t.rewrite_references(old, new),
        }
    }
}

impl From<Unit> for Entity {
    fn from(u: Unit) -> Self {
        Self::Unit(u)
    }
}

impl From<Group> for Entity {
    fn from(g: Group) -> Self {
        Self::Group(g)
    }
}

impl From<Item> for Entity {
    fn from(i: Item) -> Self {
        Self::Item(i)
    }
}

impl From<Location> for Entity {
    fn from(l: Location) -> Self {
        Self::Location(l)
    }
}

impl From<Movement> for Entity {
    fn from(m: Movement) -> Self {
        Self::Movement(m)
    }
}

impl From<Recipe> for Entity {
    fn from(r: Recipe) -> Self {
        Self::Recipe(r)
    }
}

impl From<TurnoverCacheRecord> for Entity {
    fn from(t: TurnoverCacheRecord) -> Self {
        Self::TurnoverCache(t)
    }
}
