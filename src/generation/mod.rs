//! AI collaborators for recipe and shopping list generation.
//!
//! The core only talks to the [`RecipeGenerator`] and [`ShoppingListGenerator`]
//! traits; [`openai::OpenAiClient`] is the production implementation.

pub mod files;
pub mod openai;
pub mod recipe;
pub mod shopping_list;

use crate::errors::Result;
use recipe::{RecipeDraft, RecipeRequest};
use shopping_list::{GeneratedShoppingList, ShoppingListRequest};
use std::future::Future;

/// Turns a dish idea into a structured recipe.
pub trait RecipeGenerator {
    /// Generates a recipe. The result is validated by the caller.
    fn generate_recipe(
        &self,
        request: &RecipeRequest,
    ) -> impl Future<Output = Result<RecipeDraft>> + Send;
}

/// Merges and categorises a meal plan's ingredients into a shopping list.
pub trait ShoppingListGenerator {
    /// Generates a shopping list. The result is validated by the caller.
    fn generate_shopping_list(
        &self,
        request: &ShoppingListRequest,
    ) -> impl Future<Output = Result<GeneratedShoppingList>> + Send;
}
