//! # Reference Service
//!
//! A typed façade over the event bus for add/change/remove of the four
//! reference kinds (`item`, `group`, `unit`, `location`). All three
//! operations are atomic at the bus-call granularity: if the bus raises,
//! the repository is left unchanged.

use std::str::FromStr;
use std::sync::Arc;

use super::attrs::{self, Attrs};
use crate::domain::{Code, Entity, EntityKind, Group, Item, Location, Unit};
use crate::error::{CatalogError, Result};
use crate::events::{EventBus, EventKind, EventPayload};
use crate::repository::Repository;

/// Façade over add/change/remove for the four reference entity kinds.
pub struct ReferenceService {
    repo: Arc<Repository>,
    bus: Arc<EventBus>,
}

impl ReferenceService {
    /// Build a reference service over the given repository and bus.
    pub fn new(repo: Arc<Repository>, bus: Arc<EventBus>) -> Self {
        Self { repo, bus }
    }

    /// Add a new entity of `kind`, built from `attrs`. Assigns a new code
    /// unless the caller supplied `unique_code`; a supplied code that
    /// already exists anywhere in the repository is an error (resolving
    /// the source's silent-duplicate behavior against invariant 6, which
    /// requires codes to be globally unique).
    pub fn add(&self, kind: &str, attrs: &Attrs) -> Result<Entity> {
        let entity_kind = EntityKind::from_reference_kind(kind)
            .ok_or_else(|| CatalogError::operation(format!("unknown reference kind {kind:?}")))?;

        let code = match attrs::optional_string(attrs, "unique_code") {
            Some(raw) => {
                let code = Code::from_str(&raw).map_err(|_| {
                    CatalogError::argument(format!("unique_code {raw:?} is not a valid code"))
                })?;
                if self.repo.find_anywhere(code).is_some() {
                    return Err(CatalogError::operation(format!(
                        "a reference with code {code} already exists"
                    )));
                }
                code
            }
            None => Code::new(),
        };

        let entity = self.build_entity(entity_kind, code, attrs)?;
        self.repo.append(entity.clone());
        self.bus.fire(
            EventKind::AddReference,
            &EventPayload::Entity(entity.clone()),
        )?;
        tracing::info!(kind = %entity_kind, code = %code, "reference added");
        Ok(entity)
    }

    /// Change an existing entity of `kind` identified by `code`, merging
    /// `attrs` over its current fields. Fires `update_dependencies` so
    /// every holder rewrites its back-references before the replacement is
    /// committed.
    pub fn change(&self, kind: &str, code: Code, attrs: &Attrs) -> Result<Entity> {
        let entity_kind = EntityKind::from_reference_kind(kind)
            .ok_or_else(|| CatalogError::operation(format!("unknown reference kind {kind:?}")))?;

        let old = self
            .repo
            .find(entity_kind, code)
            .ok_or_else(|| CatalogError::operation(format!("no {kind} with code {code}")))?;

        let new = self.merge_entity(&old, attrs)?;

        self.bus.fire(
            EventKind::UpdateDependencies,
            &EventPayload::UpdateDependencies {
                old: old.clone(),
                new: new.clone(),
            },
        )?;

        self.repo.remove(entity_kind, code);
        self.repo.append(new.clone());
        self.bus
            .fire(EventKind::ChangeReference, &EventPayload::Entity(new.clone()))?;
        tracing::info!(kind = %entity_kind, code = %code, "reference changed");
        Ok(new)
    }

    /// Remove an entity of `kind` identified by `code`. Fires
    /// `check_dependencies` first; any subscriber veto aborts the whole
    /// operation with that error and leaves the repository untouched.
    pub fn remove(&self, kind: &str, code: Code) -> Result<()> {
        let entity_kind = EntityKind::from_reference_kind(kind)
            .ok_or_else(|| CatalogError::operation(format!("unknown reference kind {kind:?}")))?;

        let target = self
            .repo
            .find(entity_kind, code)
            .ok_or_else(|| CatalogError::operation(format!("no {kind} with code {code}")))?;

        self.bus.fire(
            EventKind::CheckDependencies,
            &EventPayload::CheckDependencies {
                target: target.clone(),
            },
        )?;

        self.repo.remove(entity_kind, code);
        self.bus
            .fire(EventKind::RemoveReference, &EventPayload::Entity(target))?;
        tracing::info!(kind = %entity_kind, code = %code, "reference removed");
        Ok(())
    }

    fn build_entity(&self, kind: EntityKind, code: Code, attrs: &Attrs) -> Result<Entity> {
        match kind {
            EntityKind::Group => {
                let name = attrs::required_string(attrs, "name")?;
                Ok(Entity::Group(Group::new(code, name)))
            }
            EntityKind::Location => {
                let name = attrs::required_string(attrs, "name")?;
                let address = attrs::optional_string(attrs, "address");
                Ok(Entity::Location(Location::new(code, name, address)))
            }
            EntityKind::Unit => {
                let name = attrs::required_string(attrs, "name")?;
                match attrs::optional_code(attrs, "parent")? {
                    None => Ok(Entity::Unit(Unit::root(code, name))),
                    Some(parent) => {
                        self.require_exists(EntityKind::Unit, parent)?;
                        let factor = attrs::required_positive_u32(attrs, "factor")?;
                        Ok(Entity::Unit(Unit::child(code, name, factor, parent)))
                    }
                }
            }
            EntityKind::Item => {
                let name = attrs::required_string(attrs, "name")?;
                let group = attrs::required_code(attrs, "group")?;
                let unit = attrs::required_code(attrs, "unit")?;
                self.require_exists(EntityKind::Group, group)?;
                self.require_exists(EntityKind::Unit, unit)?;
                Ok(Entity::Item(Item::new(code, name, group, unit)))
            }
            other => Err(CatalogError::operation(format!(
                "{other} is not a reference kind"
            ))),
        }
    }

    fn merge_entity(&self, old: &Entity, attrs: &Attrs) -> Result<Entity> {
        let code = old.code();
        match old {
            Entity::Group(g) => {
                let name = attrs::optional_string(attrs, "name").unwrap_or_else(|| g.name.clone());
                Ok(Entity::Group(Group::new(code, name)))
            }
            Entity::Location(l) => {
                let name = attrs::optional_string(attrs, "name").unwrap_or_else(|| l.name.clone());
                let address = if attrs.contains_key("address") {
                    attrs::optional_string(attrs, "address")
                } else {
                    l.address.clone()
                };
                Ok(Entity::Location(Location::new(code, name, address)))
            }
            Entity::Unit(u) => {
                let name = attrs::optional_string(attrs, "name").unwrap_or_else(|| u.name.clone());
                let factor = if attrs.contains_key("factor") {
                    attrs::required_positive_u32(attrs, "factor")?
                } else {
                    u.factor
                };
                let parent = if attrs.contains_key("parent") {
                    attrs::optional_code(attrs, "parent")?
                } else {
                    u.parent
                };
                Ok(Entity::Unit(Unit {
                    code,
                    name,
                    factor,
                    parent,
                }))
            }
            Entity::Item(i) => {
                let name = attrs::optional_string(attrs, "name").unwrap_or_else(|| i.name.clone());
                let group = if attrs.contains_key("group") {
                    let g = attrs::required_code(attrs, "group")?;
                    self.require_exists(EntityKind::Group, g)?;
                    g
                } else {
                    i.group
                };
                let unit = if attrs.contains_key("unit") {
                    let u = attrs::required_code(attrs, "unit")?;
                    self.require_exists(EntityKind::Unit, u)?;
                    u
                } else {
                    i.unit
                };
                Ok(Entity::Item(Item::new(code, name, group, unit)))
            }
            other => Err(CatalogError::operation(format!(
                "{} is not a reference kind",
                other.kind()
            ))),
        }
    }

    fn require_exists(&self, kind: EntityKind, code: Code) -> Result<()> {
        if self.repo.find(kind, code).is_some() {
            Ok(())
        } else {
            Err(CatalogError::integrity(format!("{kind} {code} does not exist")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup() -> (ReferenceService, Arc<Repository>, Arc<EventBus>) {
        let repo = Arc::new(Repository::new());
        let bus = Arc::new(EventBus::new());
        bus.subscribe(Arc::new(crate::events::integrity::IntegritySubscriber::new(
            repo.clone(),
        )));
        let service = ReferenceService::new(repo.clone(), bus.clone());
        (service, repo, bus)
    }

    fn obj(value: serde_json::Value) -> Attrs {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn add_assigns_a_code_when_absent() {
        let (service, _repo, _bus) = setup();
        let entity = service.add("group", &obj(json!({"name": "Ingredients"}))).unwrap();
        assert_eq!(entity.as_group().unwrap().name, "Ingredients");
    }

    #[test]
    fn add_rejects_a_duplicate_supplied_code() {
        let (service, _repo, _bus) = setup();
        let code = Code::new();
        service
            .add(
                "group",
                &obj(json!({"name": "A", "unique_code": code.to_string()})),
            )
            .unwrap();
        let result = service.add(
            "group",
            &obj(json!({"name": "B", "unique_code": code.to_string()})),
        );
        assert!(result.is_err());
    }

    #[test]
    fn change_rewrites_every_dependent_item() {
        let (service, repo, _bus) = setup();
        let unit = service.add("unit", &obj(json!({"name": "gram"}))).unwrap();
        let group = service.add("group", &obj(json!({"name": "Ingredients"}))).unwrap();
        let item1 = service
            .add(
                "item",
                &obj(json!({"name": "flour", "group": group.code().to_string(), "unit": unit.code().to_string()})),
            )
            .unwrap();
        let item2 = service
            .add(
                "item",
                &obj(json!({"name": "sugar", "group": group.code().to_string(), "unit": unit.code().to_string()})),
            )
            .unwrap();

        service
            .change("group", group.code(), &obj(json!({"name": "Dry Goods"})))
            .unwrap();

        let groups = repo.bucket(EntityKind::Group);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].as_group().unwrap().name, "Dry Goods");

        let items = repo.bucket(EntityKind::Item);
        for item_code in [item1.code(), item2.code()] {
            let item = items.iter().find(|e| e.code() == item_code).unwrap();
            assert_eq!(item.as_item().unwrap().group, groups[0].code());
        }
    }

    #[test]
    fn remove_is_vetoed_when_referenced_by_a_recipe() {
        let (service, repo, _bus) = setup();
        let unit = service.add("unit", &obj(json!({"name": "gram"}))).unwrap();
        let group = service.add("group", &obj(json!({"name": "Ingredients"}))).unwrap();
        let item = service
            .add(
                "item",
                &obj(json!({"name": "flour", "group": group.code().to_string(), "unit": unit.code().to_string()})),
            )
            .unwrap();

        repo.append(Entity::Recipe(crate::domain::Recipe::new(
            Code::new(),
            "Bread",
            "3h",
            4,
            vec![],
            vec![crate::domain::RecipeComponent {
                item: item.code(),
                unit: unit.code(),
                value: 500,
            }],
        )));

        let result = service.remove("item", item.code());
        assert!(result.is_err());
        assert!(repo.find(EntityKind::Item, item.code()).is_some());
    }
}
