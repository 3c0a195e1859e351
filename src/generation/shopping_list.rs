//! Shopping list generation boundary.
//!
//! The generator receives every ingredient of a meal plan, already scaled to
//! the entry servings, and returns a merged, categorised list. Its answer is
//! checked here against the closed category vocabulary and the exclusion
//! policy before anything is stored.

use crate::{
    entities::{ShoppingCategory, Units},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;
use tracing::debug;

/// Pantry staples never put on a generated list
pub const EXCLUDED_ITEMS: [&str; 5] = ["salt", "pepper", "oil", "olive oil", "water"];

/// Whether an item name falls under the exclusion policy. Modifiers after a
/// comma are ignored, so "Pepper, freshly ground" is excluded but
/// "Red pepper" is not.
#[must_use]
pub fn is_excluded(name: &str) -> bool {
    let head = name.split(',').next().unwrap_or(name).trim().to_lowercase();
    EXCLUDED_ITEMS.contains(&head.as_str())
}

/// One scaled ingredient of a meal plan entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreliminaryItem {
    /// Ingredient name, possibly pluralised by scaling
    pub name: String,
    /// Scaled quantity text
    pub quantity: String,
    /// Recipe the ingredient belongs to
    pub recipe_id: i64,
}

/// Everything the shopping list generator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListRequest {
    /// Scaled ingredients of every entry in the plan
    pub items: Vec<PreliminaryItem>,
    /// Measurement system for the merged quantities
    pub units: Units,
}

/// System message for shopping list generation
pub const SHOPPING_LIST_SYSTEM_PROMPT: &str = "Generate a shopping list in JSON format.";

impl ShoppingListRequest {
    /// User message sent to the generator.
    ///
    /// # Errors
    /// Returns an error if the items cannot be serialised.
    pub fn prompt(&self) -> Result<String> {
        let categories: Vec<&str> = ShoppingCategory::ALL.iter().map(|c| c.label()).collect();
        let items = serde_json::to_string_pretty(&self.items)?;
        Ok(format!(
            "For each item in the shopping list:\n\
             1. Where necessary, adjust the item name to be shopping-appropriate, e.g. \"carrots, julienned\" becomes \"carrots\", \"steamed rice\" becomes \"rice\".\n\
             2. Merge items that are the same product, adding up their quantities.\n\
             3. Where necessary, adjust the quantity to be shopping-appropriate and ensure it is in {units} units.\n\
             4. Set the category to exactly one of: {categories}.\n\
             5. Keep the recipe_id of the item; use null for merged items from several recipes.\n\
             6. Remove the item entirely if it is one of: {excluded}.\n\n\
             Shopping list:\n{items}",
            units = self.units,
            categories = categories.join(", "),
            excluded = EXCLUDED_ITEMS.join(", "),
        ))
    }
}

/// One item as returned by the generator, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedItem {
    /// Shopping-appropriate item name
    pub name: String,
    /// Merged quantity
    pub quantity: String,
    /// Category label or key
    pub category: String,
    /// Originating recipe, if the item came from a single recipe
    pub recipe_id: Option<i64>,
}

/// The generator's full answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedShoppingList {
    /// Items in the order the generator returned them
    pub items: Vec<GeneratedItem>,
}

/// A validated item ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItemDraft {
    /// Item name
    pub name: String,
    /// Quantity text
    pub quantity: String,
    /// Category from the closed vocabulary
    pub category: ShoppingCategory,
    /// Originating recipe
    pub recipe_id: Option<i64>,
}

impl GeneratedShoppingList {
    /// Validates every item and drops excluded ones.
    ///
    /// `recipe_ids` is the set of recipes in the source plan; an item pointing
    /// anywhere else is rejected.
    ///
    /// # Errors
    /// Returns a validation error for a blank name, a category outside the
    /// vocabulary or an unknown recipe id.
    pub fn into_drafts(self, recipe_ids: &HashSet<i64>) -> Result<Vec<ShoppingItemDraft>> {
        let mut drafts = Vec::with_capacity(self.items.len());
        for item in self.items {
            let name = item.name.trim();
            if name.is_empty() {
                return Err(Error::validation("Generated shopping item has no name"));
            }
            if is_excluded(name) {
                debug!(name, "dropping excluded item");
                continue;
            }
            let category = ShoppingCategory::parse(&item.category).ok_or_else(|| {
                Error::validation(format!(
                    "Unknown category '{}' for item '{name}'",
                    item.category
                ))
            })?;
            if let Some(recipe_id) = item.recipe_id {
                if !recipe_ids.contains(&recipe_id) {
                    return Err(Error::validation(format!(
                        "Item '{name}' refers to recipe {recipe_id}, which is not in the meal plan"
                    )));
                }
            }
            drafts.push(ShoppingItemDraft {
                name: name.to_string(),
                quantity: item.quantity.trim().to_string(),
                category,
                recipe_id: item.recipe_id,
            });
        }
        Ok(drafts)
    }
}

/// Parses the generator's JSON answer.
///
/// # Errors
/// Returns a validation error if the text is not a shopping list.
pub fn parse_shopping_list_json(text: &str) -> Result<GeneratedShoppingList> {
    serde_json::from_str(text)
        .map_err(|e| Error::validation(format!("Invalid shopping list format: {e}")))
}

/// JSON schema for structured shopping list output.
#[must_use]
pub fn shopping_list_schema() -> Value {
    let categories: Vec<&str> = ShoppingCategory::ALL.iter().map(|c| c.label()).collect();
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["items"],
        "properties": {
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "quantity", "category", "recipe_id"],
                    "properties": {
                        "name": { "type": "string" },
                        "quantity": { "type": "string" },
                        "category": { "type": "string", "enum": categories },
                        "recipe_id": { "type": ["integer", "null"] }
                    }
                }
            }
        }
    })
}
