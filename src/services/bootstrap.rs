//! # Recipe Bootstrap Loader
//!
//! Reads a bootstrap document (units, groups, items, and one default recipe
//! over them) and creates every entity through [`ReferenceService`], so the
//! usual validation and event-firing paths run exactly as they would for any
//! other caller. Codes given in the DTOs are adopted verbatim.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::reference_service::ReferenceService;
use crate::domain::{Code, Recipe, RecipeComponent};
use crate::error::{CatalogError, Result};
use crate::repository::Repository;

/// One `ranges` entry: a unit of measure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub factor: Option<u32>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// One `categories` entry: an item group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
}

/// One `nomenclatures` entry: an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDto {
    pub id: String,
    pub name: String,
    pub group_id: String,
    pub unit_id: String,
}

/// One `composition` entry: a recipe ingredient line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionDto {
    pub nomenclature_id: String,
    pub range_id: String,
    pub value: u32,
}

/// The `default_receipt` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cooking_time: String,
    #[serde(default)]
    pub portions: u32,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub ranges: Vec<UnitDto>,
    #[serde(default)]
    pub categories: Vec<GroupDto>,
    #[serde(default)]
    pub nomenclatures: Vec<ItemDto>,
    #[serde(default)]
    pub composition: Vec<CompositionDto>,
}

/// Top-level bootstrap document: `{ "default_receipt": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapDocument {
    pub default_receipt: RecipeDto,
}

fn parse_code(raw: &str, what: &str) -> Result<Code> {
    raw.parse::<Code>()
        .map_err(|_| CatalogError::argument(format!("{what} id {raw:?} is not a valid code")))
}

/// Load a bootstrap document from `path` and create every entity it
/// describes through `reference_service`, in dependency order: units first
/// (roots before children, by making two passes), then groups, then items,
/// then the recipe itself.
pub fn load_from_file(path: impl AsRef<Path>, reference_service: &ReferenceService, repo: &Repository) -> Result<()> {
    let json_text = std::fs::read_to_string(path)?;
    let document: BootstrapDocument = serde_json::from_str(&json_text)?;
    load(&document, reference_service, repo)
}

/// Load a parsed bootstrap document.
pub fn load(document: &BootstrapDocument, reference_service: &ReferenceService, repo: &Repository) -> Result<()> {
    let recipe_dto = &document.default_receipt;

    // Units: roots (no parent) before children, in one extra pass, so a
    // child's parent already exists when it is created.
    let (roots, children): (Vec<_>, Vec<_>) = recipe_dto
        .ranges
        .iter()
        .partition(|u| u.parent_id.is_none());
    for unit in roots.into_iter().chain(children) {
        let mut attrs = json!({
            "name": unit.name,
            "unique_code": unit.id,
        });
        if let Some(parent_id) = &unit.parent_id {
            attrs["parent"] = json!(parent_id);
            attrs["factor"] = json!(unit.factor.unwrap_or(1));
        }
        reference_service.add("unit", attrs.as_object().unwrap())?;
    }

    for group in &recipe_dto.categories {
        reference_service.add(
            "group",
            json!({"name": group.name, "unique_code": group.id})
                .as_object()
                .unwrap(),
        )?;
    }

    for item in &recipe_dto.nomenclatures {
        reference_service.add(
            "item",
            json!({
                "name": item.name,
                "unique_code": item.id,
                "group": item.group_id,
                "unit": item.unit_id,
            })
            .as_object()
            .unwrap(),
        )?;
    }

    let mut components = Vec::with_capacity(recipe_dto.composition.len());
    for composition in &recipe_dto.composition {
        components.push(RecipeComponent {
            item: parse_code(&composition.nomenclature_id, "nomenclature")?,
            unit: parse_code(&composition.range_id, "range")?,
            value: composition.value,
        });
    }

    let steps = recipe_dto
        .steps
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let recipe = Recipe::new(
        Code::new(),
        if recipe_dto.name.is_empty() {
            "untitled recipe".to_string()
        } else {
            recipe_dto.name.clone()
        },
        recipe_dto.cooking_time.clone(),
        recipe_dto.portions,
        steps,
        components,
    );
    repo.append(crate::domain::Entity::Recipe(recipe));

    tracing::info!(
        units = recipe_dto.ranges.len(),
        groups = recipe_dto.categories.len(),
        items = recipe_dto.nomenclatures.len(),
        "bootstrap document loaded"
    );
    Ok(())
}
