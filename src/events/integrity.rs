//! Referential-integrity subscriber.
//!
//! Every entity is conceptually "also a subscriber" per the design this
//! system follows, but giving each of the few thousand catalog entities its
//! own long-lived subscriber registration would mean shared mutable
//! ownership of repository-owned data — awkward in Rust and unnecessary at
//! catalog scale. Instead, a single subscriber performs the sweep the
//! design calls for: on `update_dependencies` it rewrites every holder's
//! back-reference; on `check_dependencies` it fails if any holder still
//! references the deletion target. Cost is O(entities × fields) per
//! mutation, same as the per-entity model, and acceptable at this scale.

use std::sync::Arc;

use super::{EventKind, EventPayload, Subscriber};
use crate::domain::ReferenceHolder;
use crate::error::{CatalogError, Result};
use crate::repository::Repository;

/// The sole referential-integrity subscriber, registered once at startup.
pub struct IntegritySubscriber {
    repo: Arc<Repository>,
}

impl IntegritySubscriber {
    /// Build a subscriber over the given repository.
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    fn update_dependencies(&self, old_code: crate::domain::Code, new_code: crate::domain::Code) {
        for entity in self.repo.all_entities() {
            let mut rewritten = entity.clone();
            if rewritten.rewrite_references(old_code, new_code) {
                self.repo.replace(&entity, rewritten);
            }
        }
    }

    fn check_dependencies(&self, target_code: crate::domain::Code) -> Result<()> {
        for entity in self.repo.all_entities() {
            if entity.code() == target_code {
                continue;
            }
            if entity.references().contains(&target_code) {
                return Err(CatalogError::veto(
                    entity.code().to_string(),
                    format!(
                        "{} still references {target_code}",
                        entity.kind()
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl Subscriber for IntegritySubscriber {
    fn handle(&self, event: EventKind, payload: &EventPayload) -> Result<()> {
        match (event, payload) {
            (EventKind::UpdateDependencies, EventPayload::UpdateDependencies { old, new }) => {
                self.update_dependencies(old.code(), new.code());
                Ok(())
            }
            (EventKind::CheckDependencies, EventPayload::CheckDependencies { target }) => {
                self.check_dependencies(target.code())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Entity, Group, Item, Unit};
    use crate::domain::{Code, EntityKind};

    fn setup() -> (Arc<Repository>, IntegritySubscriber) {
        let repo = Arc::new(Repository::new());
        let sub = IntegritySubscriber::new(repo.clone());
        (repo, sub)
    }

    #[test]
    fn update_dependencies_rewrites_every_holder() {
        let (repo, sub) = setup();
        let group_code = Code::new();
        let new_group_code = Code::new();
        let unit_code = Code::new();
        repo.append(Entity::Unit(Unit::root(unit_code, "gram")));
        repo.append(Entity::Group(Group::new(group_code, "Ingredients")));
        let item_a = Code::new();
        let item_b = Code::new();
        repo.append(Entity::Item(Item::new(item_a, "flour", group_code, unit_code)));
        repo.append(Entity::Item(Item::new(item_b, "sugar", group_code, unit_code)));

        let old = Entity::Group(Group::new(group_code, "Ingredients"));
        let new = Entity::Group(Group::new(new_group_code, "Ingredients Renamed"));
        sub.handle(
            EventKind::UpdateDependencies,
            &EventPayload::UpdateDependencies { old, new },
        )
        .unwrap();

        let a = repo.find(EntityKind::Item, item_a).unwrap();
        let b = repo.find(EntityKind::Item, item_b).unwrap();
        assert_eq!(a.as_item().unwrap().group, new_group_code);
        assert_eq!(b.as_item().unwrap().group, new_group_code);
    }

    #[test]
    fn check_dependencies_vetoes_when_referenced() {
        let (repo, sub) = setup();
        let group_code = Code::new();
        let unit_code = Code::new();
        repo.append(Entity::Unit(Unit::root(unit_code, "gram")));
        let group = Group::new(group_code, "Ingredients");
        repo.append(Entity::Group(group.clone()));
        repo.append(Entity::Item(Item::new(
            Code::new(),
            "flour",
            group_code,
            unit_code,
        )));

        let result = sub.handle(
            EventKind::CheckDependencies,
            &EventPayload::CheckDependencies {
                target: Entity::Group(group),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn check_dependencies_passes_when_unreferenced() {
        let (repo, sub) = setup();
        let group_code = Code::new();
        let group = Group::new(group_code, "Unused");
        repo.append(Entity::Group(group.clone()));

        let result = sub.handle(
            EventKind::CheckDependencies,
            &EventPayload::CheckDependencies {
                target: Entity::Group(group),
            },
        );
        assert!(result.is_ok());
    }
}
