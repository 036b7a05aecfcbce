//! Explicit per-entity field descriptors for the filter engine.
//!
//! Rather than reflect over struct fields at runtime, every field the
//! filter engine can address is listed here by name, per entity kind. A
//! `/`-separated path (e.g. `group/name`) resolves one segment against the
//! current entity and, if the segment names a reference field, looks that
//! entity up in the repository and recurses into the remaining path.

use crate::domain::{Entity, EntityKind};
use crate::repository::Repository;

/// Resolve a `/`-separated field path against an entity, returning its
/// string form, or `None` if any segment is unknown or any referenced
/// entity is missing from the repository.
pub fn resolve(repo: &Repository, entity: &Entity, path: &str) -> Option<String> {
    let (head, rest) = match path.split_once('/') {
        Some((h, r)) => (h, Some(r)),
        None => (path, None),
    };

    match (entity, head) {
        (_, "unique_code") => Some(entity.code().to_string()),

        (Entity::Group(g), "name") if rest.is_none() => Some(g.name.clone()),

        (Entity::Location(l), "name") if rest.is_none() => Some(l.name.clone()),
        (Entity::Location(l), "address") if rest.is_none() => {
            l.address.clone()
        }

        (Entity::Unit(u), "name") if rest.is_none() => Some(u.name.clone()),
        (Entity::Unit(u), "factor") if rest.is_none() => Some(u.factor.to_string()),
        (Entity::Unit(u), "parent") => {
            let parent_code = u.parent?;
            let parent = repo.find(EntityKind::Unit, parent_code)?;
            match rest {
                Some(path) => resolve(repo, &parent, path),
                None => Some(parent.code().to_string()),
            }
        }

        (Entity::Item(i), "name") if rest.is_none() => Some(i.name.clone()),
        (Entity::Item(i), "group") => {
            let group = repo.find(EntityKind::Group, i.group)?;
            match rest {
                Some(path) => resolve(repo, &group, path),
                None => Some(group.code().to_string()),
            }
        }
        (Entity::Item(i), "unit") => {
            let unit = repo.find(EntityKind::Unit, i.unit)?;
            match rest {
                Some(path) => resolve(repo, &unit, path),
                None => Some(unit.code().to_string()),
            }
        }

        (Entity::Movement(m), "quantity") if rest.is_none() => Some(m.quantity.to_string()),
        (Entity::Movement(m), "timestamp") if rest.is_none() => {
            Some(m.timestamp.to_rfc3339())
        }
        (Entity::Movement(m), "unit_label") if rest.is_none() => Some(m.unit_label.clone()),
        (Entity::Movement(m), "item") => {
            let item = repo.find(EntityKind::Item, m.item)?;
            match rest {
                Some(path) => resolve(repo, &item, path),
                None => Some(item.code().to_string()),
            }
        }
        (Entity::Movement(m), "location") => {
            let location = repo.find(EntityKind::Location, m.location)?;
            match rest {
                Some(path) => resolve(repo, &location, path),
                None => Some(location.code().to_string()),
            }
        }

        (Entity::Recipe(r), "name") if rest.is_none() => Some(r.name.clone()),
        (Entity::Recipe(r), "cooking_time") if rest.is_none() => Some(r.cooking_time.clone()),
        (Entity::Recipe(r), "portions") if rest.is_none() => Some(r.portions.to_string()),

        (Entity::TurnoverCache(t), "debit_turnover") if rest.is_none() => {
            Some(t.debit_total.to_string())
        }
        (Entity::TurnoverCache(t), "credit_turnover") if rest.is_none() => {
            Some(t.credit_total.to_string())
        }

        // `period` and `storage` pseudo-fields are consumed directly by the
        // OSV service's filter extraction (see
        // `crate::services::osv_service`) and never reach generic
        // resolution.
        _ => None,
    }
}

/// Top-level field names addressable for `kind`, for API discovery
/// (`GET /api/filters/{kind}`). Nested paths (e.g. `group/name`) are not
/// enumerated here; only the first segment is listed.
pub fn known_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Group => &["unique_code", "name"],
        EntityKind::Location => &["unique_code", "name", "address"],
        EntityKind::Unit => &["unique_code", "name", "factor", "parent"],
        EntityKind::Item => &["unique_code", "name", "group", "unit"],
        EntityKind::Movement => &[
            "unique_code",
            "quantity",
            "timestamp",
            "unit_label",
            "item",
            "location",
        ],
        EntityKind::Recipe => &["unique_code", "name", "cooking_time", "portions"],
        EntityKind::TurnoverCache => &["unique_code", "debit_turnover", "credit_turnover"],
        EntityKind::Misc => &["unique_code"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Code, Group, Item, Unit};

    #[test]
    fn resolves_nested_group_name() {
        let repo = Repository::new();
        let group_code = Code::new();
        let unit_code = Code::new();
        repo.append(Entity::Group(Group::new(group_code, "Ingredients")));
        repo.append(Entity::Unit(Unit::root(unit_code, "gram")));
        let item = Entity::Item(Item::new(Code::new(), "flour", group_code, unit_code));

        assert_eq!(
            resolve(&repo, &item, "group/name"),
            Some("Ingredients".to_string())
        );
        assert_eq!(resolve(&repo, &item, "name"), Some("flour".to_string()));
    }

    #[test]
    fn missing_segment_resolves_to_none() {
        let repo = Repository::new();
        let item = Entity::Item(Item::new(Code::new(), "flour", Code::new(), Code::new()));
        assert_eq!(resolve(&repo, &item, "group/name"), None);
        assert_eq!(resolve(&repo, &item, "nonexistent"), None);
    }
}
