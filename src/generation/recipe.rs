//! Recipe generation boundary: requests, drafts and their validation.
//!
//! A [`RecipeDraft`] is the structured shape exchanged with the recipe
//! generator and with recipe JSON files. Nothing reaches the database without
//! passing [`RecipeDraft::validate`].

use crate::{
    core::user::validate_servings,
    entities::Units,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Longest dish idea accepted on a generation request
pub const MAX_DISH_IDEA_LEN: usize = 255;

/// What the user asked the generator for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRequest {
    /// Free-text description of the dish (e.g. "spicy lentil soup")
    pub dish_idea: String,
    /// Extra guidance for the generator
    pub notes: String,
    /// Dietary preferences copied from the requesting user
    pub dietary_preferences: String,
    /// Servings to generate for
    pub servings: i32,
    /// Measurement system for quantities
    pub units: Units,
}

impl RecipeRequest {
    /// Checks the dish idea and servings.
    ///
    /// # Errors
    /// Returns a validation error if the dish idea is blank or longer than
    /// 255 characters, or servings are outside 1..=12.
    pub fn validate(&self) -> Result<()> {
        let idea = self.dish_idea.trim();
        if idea.is_empty() {
            return Err(Error::validation("Dish idea cannot be empty"));
        }
        if idea.chars().count() > MAX_DISH_IDEA_LEN {
            return Err(Error::validation(format!(
                "Dish idea must be at most {MAX_DISH_IDEA_LEN} characters"
            )));
        }
        validate_servings(self.servings)
    }

    /// User message sent to the generator.
    #[must_use]
    pub fn prompt(&self) -> String {
        let mut lines = vec![
            "Make me a recipe based on the following guidelines:".to_string(),
            String::new(),
            format!("Dish idea: {}", self.dish_idea.trim()),
        ];
        if !self.notes.trim().is_empty() {
            lines.push(format!("Notes: {}", self.notes.trim()));
        }
        if !self.dietary_preferences.trim().is_empty() {
            lines.push(format!(
                "Dietary preferences: {}",
                self.dietary_preferences.trim()
            ));
        }
        lines.push(format!("Servings: {}", self.servings));
        lines.push(
            "Place ingredient modifiers like \"diced\" after the item name (e.g. \"Carrots, diced\")"
                .to_string(),
        );
        lines.push(format!(
            "Provide quantities in {} units; teaspoons and tablespoons are acceptable",
            self.units
        ));
        lines.push("Group instructions into a limited number of instruction sections".to_string());
        lines.join("\n")
    }
}

/// System message for recipe generation
pub const RECIPE_SYSTEM_PROMPT: &str =
    "You are an experienced home cook. Generate a detailed recipe in JSON format.";

/// One ingredient line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftIngredient {
    /// Item name, modifiers after a comma (e.g. "Carrots, diced")
    pub name: String,
    /// Quantity text (e.g. "2 cups"); may be empty for "to taste" items
    pub quantity: String,
}

/// One instruction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftStep {
    /// Step text
    pub text: String,
}

/// A titled group of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSection {
    /// Section heading (e.g. "Make the sauce")
    pub section_title: String,
    /// Steps in order
    pub steps: Vec<DraftStep>,
}

/// A complete recipe as produced by the generator or read from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    /// Dish name
    pub title: String,
    /// Short description
    pub description: String,
    /// Servings the quantities are written for
    pub servings: i32,
    /// Ingredients in order
    pub ingredients: Vec<DraftIngredient>,
    /// Instruction sections in order
    pub instructions: Vec<DraftSection>,
}

impl RecipeDraft {
    /// Checks that the draft can be stored.
    ///
    /// # Errors
    /// Returns a validation error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Recipe title cannot be empty"));
        }
        if self.servings < 1 {
            return Err(Error::validation(format!(
                "Recipe servings must be at least 1, got {}",
                self.servings
            )));
        }
        if self.ingredients.is_empty() {
            return Err(Error::validation("Recipe must have at least one ingredient"));
        }
        if let Some(index) = self
            .ingredients
            .iter()
            .position(|i| i.name.trim().is_empty())
        {
            return Err(Error::validation(format!(
                "Ingredient {} has no name",
                index + 1
            )));
        }
        for (index, section) in self.instructions.iter().enumerate() {
            if section.section_title.trim().is_empty() {
                return Err(Error::validation(format!(
                    "Instruction section {} has no title",
                    index + 1
                )));
            }
            if section.steps.iter().any(|s| s.text.trim().is_empty()) {
                return Err(Error::validation(format!(
                    "Instruction section '{}' has an empty step",
                    section.section_title.trim()
                )));
            }
        }
        Ok(())
    }
}

/// Parses and validates recipe JSON.
///
/// # Errors
/// Returns a validation error if the text is not JSON of the draft shape or the
/// draft fails [`RecipeDraft::validate`].
pub fn parse_recipe_json(text: &str) -> Result<RecipeDraft> {
    let draft: RecipeDraft = serde_json::from_str(text)
        .map_err(|e| Error::validation(format!("Invalid recipe format: {e}")))?;
    draft.validate()?;
    Ok(draft)
}

/// JSON schema for structured recipe output.
#[must_use]
pub fn recipe_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["title", "description", "servings", "ingredients", "instructions"],
        "properties": {
            "title": { "type": "string" },
            "description": { "type": "string" },
            "servings": { "type": "integer" },
            "ingredients": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "quantity"],
                    "properties": {
                        "name": { "type": "string" },
                        "quantity": { "type": "string" }
                    }
                }
            },
            "instructions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["section_title", "steps"],
                    "properties": {
                        "section_title": { "type": "string" },
                        "steps": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["text"],
                                "properties": { "text": { "type": "string" } }
                            }
                        }
                    }
                }
            }
        }
    })
}
