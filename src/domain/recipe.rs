//! Recipes and their components.

use serde::{Deserialize, Serialize};

use super::code::Code;
use super::reference::ReferenceHolder;

/// One ingredient line within a [`Recipe`]: an item, the unit it's measured
/// in for this recipe, and a positive integer value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeComponent {
    /// The item used.
    pub item: Code,
    /// The unit the `value` is expressed in.
    pub unit: Code,
    /// Positive integer amount.
    pub value: u32,
}

/// A recipe: ordered steps over a list of components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identity.
    pub code: Code,
    /// Display name.
    pub name: String,
    /// Free-form cooking-time description (e.g. "45 min").
    pub cooking_time: String,
    /// Positive integer number of portions this recipe yields.
    pub portions: u32,
    /// Ordered preparation steps.
    pub steps: Vec<String>,
    /// Ingredient lines.
    pub components: Vec<RecipeComponent>,
}

impl Recipe {
    /// Construct a new recipe.
    pub fn new(
        code: Code,
        name: impl Into<String>,
        cooking_time: impl Into<String>,
        portions: u32,
        steps: Vec<String>,
        components: Vec<RecipeComponent>,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            cooking_time: cooking_time.into(),
            portions,
            steps,
            components,
        }
    }
}

impl ReferenceHolder for Recipe {
    fn references(&self) -> Vec<Code> {
        self.components
            .iter()
            .flat_map(|c| [c.item, c.unit])
            .collect()
    }

    /// The recipe examines its own component list — this is the "nested
    /// recipe components are rewritten by the recipe itself" case from the
    /// integrity sweep's design.
    fn rewrite_references(&mut self, old: Code, new: Code) -> bool {
        let mut changed = false;
        for component in &mut self.components {
            if component.item == old {
                component.item = new;
                changed = true;
            }
            if component.unit == old {
                component.unit = new;
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_sweeps_every_component() {
        let flour = Code::new();
        let replacement = Code::new();
        let unit = Code::new();
        let mut recipe = Recipe::new(
            Code::new(),
            "Bread",
            "3 hours",
            4,
            vec!["mix".into(), "bake".into()],
            vec![
                RecipeComponent {
                    item: flour,
                    unit,
                    value: 500,
                },
                RecipeComponent {
                    item: flour,
                    unit,
                    value: 10,
                },
            ],
        );
        assert!(recipe.rewrite_references(flour, replacement));
        assert!(recipe.components.iter().all(|c| c.item == replacement));
    }
}
