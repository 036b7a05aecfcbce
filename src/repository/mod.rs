//! # Repository
//!
//! The single in-memory source of truth during a run: eight named buckets
//! (units, groups, items, locations, movements, recipes, turnover-cache,
//! misc), each an ordered sequence of entities of that kind.
//!
//! The repository enforces single-writer semantics by guarding all eight
//! buckets behind one [`parking_lot::RwLock`] — callers wrap a whole
//! request in one lock acquisition rather than locking per bucket, which
//! keeps cross-bucket invariants (like "every reference resolves") checkable
//! without a second round of coordination.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::unit::{Unit, UnitLookup};
use crate::domain::{Code, Entity, EntityKind};

/// The eight-bucket in-memory entity store.
pub struct Repository {
    buckets: RwLock<HashMap<EntityKind, Vec<Entity>>>,
}

impl Repository {
    /// An empty repository with all eight buckets present (possibly empty).
    pub fn new() -> Self {
        let mut buckets = HashMap::new();
        for kind in EntityKind::all() {
            buckets.insert(kind, Vec::new());
        }
        Self {
            buckets: RwLock::new(buckets),
        }
    }

    /// Snapshot of one bucket's contents, in stable iteration order.
    pub fn bucket(&self, kind: EntityKind) -> Vec<Entity> {
        self.buckets
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Append an entity to the bucket matching its own kind.
    pub fn append(&self, entity: Entity) {
        let kind = entity.kind();
        self.buckets.write().entry(kind).or_default().push(entity);
    }

    /// Remove the entity with the given code from `kind`'s bucket. Returns
    /// the removed entity, if any.
    pub fn remove(&self, kind: EntityKind, code: Code) -> Option<Entity> {
        let mut buckets = self.buckets.write();
        let bucket = buckets.entry(kind).or_default();
        let index = bucket.iter().position(|e| e.code() == code)?;
        Some(bucket.remove(index))
    }

    /// Replace `old`'s slot (matched by code, within `old`'s own kind) with
    /// `new`, preserving position. If `old` is absent, `new` is appended.
    pub fn replace(&self, old: &Entity, new: Entity) {
        let mut buckets = self.buckets.write();
        let bucket = buckets.entry(old.kind()).or_default();
        match bucket.iter().position(|e| e.code() == old.code()) {
            Some(index) => bucket[index] = new,
            None => bucket.push(new),
        }
    }

    /// Find an entity by code within a specific bucket.
    pub fn find(&self, kind: EntityKind, code: Code) -> Option<Entity> {
        self.buckets
            .read()
            .get(&kind)
            .and_then(|bucket| bucket.iter().find(|e| e.code() == code).cloned())
    }

    /// Find an entity by code across every bucket. Used to enforce global
    /// code uniqueness across entity kinds.
    pub fn find_anywhere(&self, code: Code) -> Option<Entity> {
        let buckets = self.buckets.read();
        for kind in EntityKind::all() {
            if let Some(bucket) = buckets.get(&kind) {
                if let Some(found) = bucket.iter().find(|e| e.code() == code) {
                    return Some(found.clone());
                }
            }
        }
        None
    }

    /// Every entity held by the repository, across all buckets. Used by the
    /// integrity sweep, which must examine every entity's reference fields.
    pub fn all_entities(&self) -> Vec<Entity> {
        let buckets = self.buckets.read();
        EntityKind::all()
            .into_iter()
            .flat_map(|kind| buckets.get(&kind).cloned().unwrap_or_default())
            .collect()
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitLookup for Repository {
    fn unit(&self, code: Code) -> Option<Unit> {
        self.find(EntityKind::Unit, code)
            .and_then(|e| e.as_unit().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Group;

    #[test]
    fn append_then_find_round_trips() {
        let repo = Repository::new();
        let code = Code::new();
        let group = Group::new(code, "Ingredients");
        repo.append(Entity::Group(group.clone()));
        let found = repo.find(EntityKind::Group, code).unwrap();
        assert_eq!(found.as_group().unwrap(), &group);
    }

    #[test]
    fn remove_drops_the_entity() {
        let repo = Repository::new();
        let code = Code::new();
        repo.append(Entity::Group(Group::new(code, "Ingredients")));
        assert!(repo.remove(EntityKind::Group, code).is_some());
        assert!(repo.find(EntityKind::Group, code).is_none());
    }

    #[test]
    fn replace_preserves_position() {
        let repo = Repository::new();
        let a = Code::new();
        let b = Code::new();
        let old = Group::new(a, "A");
        repo.append(Entity::Group(old.clone()));
        repo.append(Entity::Group(Group::new(b, "B")));
        let new_a = Group::new(a, "A-renamed");
        repo.replace(&Entity::Group(old), Entity::Group(new_a.clone()));
        let bucket = repo.bucket(EntityKind::Group);
        assert_eq!(bucket[0].as_group().unwrap(), &new_a);
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn find_anywhere_crosses_buckets() {
        let repo = Repository::new();
        let code = Code::new();
        repo.append(Entity::Location(crate::domain::Location::new(
            code, "Main", None,
        )));
        assert!(repo.find(EntityKind::Group, code).is_none());
        assert!(repo.find_anywhere(code).is_some());
    }
}
