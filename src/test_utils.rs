//! Shared test utilities for the meal planner.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and fake AI collaborators.

use crate::{
    config::settings::PlannerSettings,
    core::{
        meal_plan::{self, MealPlanDetail},
        recipe, templates::MealPlanTemplate, user,
    },
    entities::{self, RecipeStatus},
    errors::Result,
    generation::{
        RecipeGenerator, ShoppingListGenerator,
        recipe::{DraftIngredient, DraftSection, DraftStep, RecipeDraft, RecipeRequest},
        shopping_list::{GeneratedItem, GeneratedShoppingList, ShoppingListRequest},
    },
};
use sea_orm::DatabaseConnection;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with default planner settings.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::get_or_create_user(db, username, &PlannerSettings::default()).await
}

/// Builds a recipe draft with one "Method" section of two steps.
///
/// # Defaults
/// * `description`: `"A test recipe"`
pub fn sample_draft(title: &str, servings: i32, ingredients: &[(&str, &str)]) -> RecipeDraft {
    RecipeDraft {
        title: title.to_string(),
        description: "A test recipe".to_string(),
        servings,
        ingredients: ingredients
            .iter()
            .map(|(name, quantity)| DraftIngredient {
                name: (*name).to_string(),
                quantity: (*quantity).to_string(),
            })
            .collect(),
        instructions: vec![DraftSection {
            section_title: "Method".to_string(),
            steps: vec![
                DraftStep {
                    text: "Prepare the ingredients.".to_string(),
                },
                DraftStep {
                    text: "Cook and serve.".to_string(),
                },
            ],
        }],
    }
}

/// Creates a published test recipe owned by `owner`.
pub async fn create_test_recipe(
    db: &DatabaseConnection,
    owner: &entities::user::Model,
    title: &str,
    servings: i32,
    ingredients: &[(&str, &str)],
) -> Result<entities::recipe::Model> {
    recipe::create_recipe(
        db,
        owner,
        &sample_draft(title, servings, ingredients),
        RecipeStatus::Published,
    )
    .await
}

/// Recipe generator that echoes the request back as a sample draft.
#[derive(Debug, Default)]
pub struct FakeRecipeGenerator;

impl RecipeGenerator for FakeRecipeGenerator {
    async fn generate_recipe(&self, request: &RecipeRequest) -> Result<RecipeDraft> {
        let idea = request.dish_idea.trim();
        let mut title = idea.to_string();
        if let Some(first) = title.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Ok(sample_draft(
            &title,
            request.servings,
            &[("onion", "1"), ("stock", "500 ml")],
        ))
    }
}

/// Shopping list generator that passes items through unchanged under a
/// single category and remembers the last request it saw.
#[derive(Debug)]
pub struct FakeShoppingListGenerator {
    category: String,
    last_request: Mutex<Option<ShoppingListRequest>>,
}

impl Default for FakeShoppingListGenerator {
    fn default() -> Self {
        Self::with_category("Pantry")
    }
}

impl FakeShoppingListGenerator {
    /// Generator answering every item with `category`, valid or not.
    pub fn with_category(category: &str) -> Self {
        Self {
            category: category.to_string(),
            last_request: Mutex::new(None),
        }
    }

    /// The most recent request, if the generator has been called.
    pub fn last_request(&self) -> Option<ShoppingListRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

impl ShoppingListGenerator for FakeShoppingListGenerator {
    async fn generate_shopping_list(
        &self,
        request: &ShoppingListRequest,
    ) -> Result<GeneratedShoppingList> {
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        Ok(GeneratedShoppingList {
            items: request
                .items
                .iter()
                .map(|item| GeneratedItem {
                    name: item.name.clone(),
                    quantity: item.quantity.clone(),
                    category: self.category.clone(),
                    recipe_id: Some(item.recipe_id),
                })
                .collect(),
        })
    }
}

/// Sets up a complete test environment with a weekday meal plan holding one
/// recipe in its first group.
/// Returns (db, user, recipe, plan) with the plan reloaded from the database.
///
/// The recipe serves 2 and its first ingredient is `("carrot", "2 cups")`.
pub async fn setup_with_meal_plan() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::recipe::Model,
    MealPlanDetail,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test_user").await?;
    let recipe = create_test_recipe(
        &db,
        &user,
        "Carrot Soup",
        2,
        &[("carrot", "2 cups"), ("onion", "1"), ("salt", "")],
    )
    .await?;
    let plan =
        meal_plan::create_meal_plan(&db, &user, None, MealPlanTemplate::Weekday).await?;
    meal_plan::add_recipe_to_group(&db, plan.groups[0].group.id, recipe.id, None).await?;
    let plan = meal_plan::get_meal_plan_detail(&db, plan.meal_plan.id).await?;
    Ok((db, user, recipe, plan))
}
