// Integration tests for the catalog engine's documented scenarios

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;

    use catalog_engine::domain::{Code, Entity, EntityKind, Movement};
    use catalog_engine::events::integrity::IntegritySubscriber;
    use catalog_engine::events::EventBus;
    use catalog_engine::repository::Repository;
    use catalog_engine::services::{
        BalanceService, OsvService, ReferenceService, TurnoverCacheService,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    struct Harness {
        repo: Arc<Repository>,
        bus: Arc<EventBus>,
        reference: ReferenceService,
    }

    fn harness() -> Harness {
        let repo = Arc::new(Repository::new());
        let bus = Arc::new(EventBus::new());
        bus.subscribe(Arc::new(IntegritySubscriber::new(repo.clone())));
        let reference = ReferenceService::new(repo.clone(), bus.clone());
        Harness {
            repo,
            bus,
            reference,
        }
    }

    fn obj(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().unwrap().clone()
    }

    fn movement(item: Code, location: Code, ts: chrono::DateTime<Utc>, qty: f64) -> Entity {
        Entity::Movement(Movement::new(Code::new(), ts, item, location, qty, "g").unwrap())
    }

    #[test]
    fn s1_unit_conversion_in_osv_report() {
        let h = harness();
        let gram = h
            .reference
            .add("unit", &obj(json!({"name": "gram"})))
            .unwrap();
        let kilogram = h
            .reference
            .add(
                "unit",
                &obj(json!({"name": "kilogram", "parent": gram.code().to_string(), "factor": 1000})),
            )
            .unwrap();
        let group = h
            .reference
            .add("group", &obj(json!({"name": "Ingredients"})))
            .unwrap();
        let flour = h
            .reference
            .add(
                "item",
                &obj(json!({
                    "name": "flour",
                    "group": group.code().to_string(),
                    "unit": kilogram.code().to_string(),
                })),
            )
            .unwrap();
        let main = h
            .reference
            .add("location", &obj(json!({"name": "main"})))
            .unwrap();

        // Movements are stored canonically in the unit tree's root (gram).
        h.repo.append(movement(
            flour.code(),
            main.code(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            100.0,
        ));
        h.repo.append(movement(
            flour.code(),
            main.code(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            -50.0,
        ));

        let osv = OsvService::new(h.repo.clone());
        let rows = osv
            .generate(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap(),
                main.code(),
            )
            .unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.unit_name, "kilogram");
        assert!((row.opening - 0.0).abs() < 1e-9);
        assert!((row.inflow - 0.1).abs() < 1e-9);
        assert!((row.outflow - 0.05).abs() < 1e-9);
        assert!((row.closing - 0.05).abs() < 1e-9);
    }

    #[test]
    fn s2_cutoff_change_is_stable_across_requeries() {
        let h = harness();
        let item = Code::new();
        let location = Code::new();
        h.repo.append(movement(
            item,
            location,
            Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            100.0,
        ));
        h.repo.append(movement(
            item,
            location,
            Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
            -40.0,
        ));
        h.repo.append(movement(
            item,
            location,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            20.0,
        ));

        let cache = Arc::new(TurnoverCacheService::new(h.repo.clone()));
        let balance = BalanceService::new(h.repo.clone(), cache.clone(), h.bus.clone());

        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = cache.recompute(cutoff);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].debit_total, 100.0);
        assert_eq!(records[0].credit_total, 40.0);

        let target = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let rows = balance
            .calculate(target, Some(location), Some(cutoff))
            .unwrap();
        assert!((rows[0].balance - 80.0).abs() < 1e-9);

        let earlier_cutoff = Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap();
        cache.recompute(earlier_cutoff);
        let rows_again = balance
            .calculate(target, Some(location), Some(earlier_cutoff))
            .unwrap();
        assert!((rows_again[0].balance - 80.0).abs() < 1e-9);
    }

    #[test]
    fn s3_change_reference_rewrites_every_dependent_item() {
        let h = harness();
        let unit = h
            .reference
            .add("unit", &obj(json!({"name": "gram"})))
            .unwrap();
        let group = h
            .reference
            .add("group", &obj(json!({"name": "Ingredients"})))
            .unwrap();
        let item1 = h
            .reference
            .add(
                "item",
                &obj(json!({"name": "flour", "group": group.code().to_string(), "unit": unit.code().to_string()})),
            )
            .unwrap();
        let item2 = h
            .reference
            .add(
                "item",
                &obj(json!({"name": "sugar", "group": group.code().to_string(), "unit": unit.code().to_string()})),
            )
            .unwrap();

        h.reference
            .change("group", group.code(), &obj(json!({"name": "Dry Goods"})))
            .unwrap();

        let groups = h.repo.bucket(EntityKind::Group);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].as_group().unwrap().name, "Dry Goods");

        for code in [item1.code(), item2.code()] {
            let item = h.repo.find(EntityKind::Item, code).unwrap();
            let item_group = h
                .repo
                .find(EntityKind::Group, item.as_item().unwrap().group)
                .unwrap();
            assert_eq!(item_group.as_group().unwrap().name, "Dry Goods");
        }
    }

    #[test]
    fn s4_delete_veto_when_item_is_a_recipe_component() {
        use catalog_engine::domain::{Recipe, RecipeComponent};

        let h = harness();
        let unit = h
            .reference
            .add("unit", &obj(json!({"name": "gram"})))
            .unwrap();
        let group = h
            .reference
            .add("group", &obj(json!({"name": "Ingredients"})))
            .unwrap();
        let item = h
            .reference
            .add(
                "item",
                &obj(json!({"name": "flour", "group": group.code().to_string(), "unit": unit.code().to_string()})),
            )
            .unwrap();

        h.repo.append(Entity::Recipe(Recipe::new(
            Code::new(),
            "Bread",
            "3h",
            4,
            vec![],
            vec![RecipeComponent {
                item: item.code(),
                unit: unit.code(),
                value: 500,
            }],
        )));

        let result = h.reference.remove("item", item.code());
        assert!(result.is_err());
        assert!(h.repo.find(EntityKind::Item, item.code()).is_some());
    }

    #[test]
    fn s5_nested_field_filter_preserves_order() {
        use catalog_engine::domain::{Group, Item};
        use catalog_engine::filters::{apply, Filter, FilterOp};

        let h = harness();
        let ingredients = Code::new();
        let tools = Code::new();
        let unit = Code::new();
        h.repo
            .append(Entity::Group(Group::new(ingredients, "Ingredients")));
        h.repo.append(Entity::Group(Group::new(tools, "Tools")));
        let flour = Entity::Item(Item::new(Code::new(), "Flour", ingredients, unit));
        let whisk = Entity::Item(Item::new(Code::new(), "Whisk", tools, unit));
        let salt = Entity::Item(Item::new(Code::new(), "Salt", ingredients, unit));
        h.repo.append(flour.clone());
        h.repo.append(whisk);
        h.repo.append(salt.clone());

        let items = h.repo.bucket(EntityKind::Item);
        let filters = vec![Filter::new("group/name", "ingred", FilterOp::Like)];
        let result = apply(&h.repo, &items, &filters);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].as_item().unwrap().name, "Flour");
        assert_eq!(result[1].as_item().unwrap().name, "Salt");
    }

    #[test]
    fn s6_cache_persists_and_restores_identically() {
        let h = harness();
        let item = Code::new();
        let location = Code::new();
        h.repo.append(movement(
            item,
            location,
            Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            100.0,
        ));

        let cache = TurnoverCacheService::new(h.repo.clone());
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        cache.recompute(cutoff);
        let before = cache.records_at(cutoff);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        cache.save_to_file(&path).unwrap();

        for entity in h.repo.bucket(EntityKind::TurnoverCache) {
            h.repo.remove(EntityKind::TurnoverCache, entity.code());
        }
        assert!(cache.is_empty());

        cache.load_from_file(&path).unwrap();
        let after = cache.records_at(cutoff);
        assert_eq!(before, after);
    }
}
