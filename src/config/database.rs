//! Database configuration module for the meal planner.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so foreign keys and their `ON DELETE`
//! behaviour follow the relations declared on each entity. The ordering and
//! uniqueness invariants that span several columns are added as explicit
//! unique indexes.

use crate::entities::{
    Ingredient, IngredientColumn, InstructionSection, InstructionSectionColumn, InstructionStep,
    InstructionStepColumn, MealGroup, MealGroupColumn, MealPlan, MealPlanRecipe,
    MealPlanRecipeColumn, Recipe, SavedRecipe, SavedRecipeColumn, ShoppingItem, ShoppingList,
    User,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Fallback used when `DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/meal_planner.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(parent) = sqlite_file_parent(&database_url) {
        std::fs::create_dir_all(parent)?;
    }
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Directory holding the database file of a file-backed `SQLite` URL.
fn sqlite_file_parent(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let path = rest.trim_start_matches("//").split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .if_not_exists()
            .name("idx_ingredients_recipe_position")
            .table(Ingredient)
            .col(IngredientColumn::RecipeId)
            .col(IngredientColumn::Position)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_instruction_sections_recipe_position")
            .table(InstructionSection)
            .col(InstructionSectionColumn::RecipeId)
            .col(InstructionSectionColumn::Position)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_instruction_steps_section_position")
            .table(InstructionStep)
            .col(InstructionStepColumn::SectionId)
            .col(InstructionStepColumn::Position)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_meal_groups_plan_position")
            .table(MealGroup)
            .col(MealGroupColumn::MealPlanId)
            .col(MealGroupColumn::Position)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_meal_plan_recipes_group_position")
            .table(MealPlanRecipe)
            .col(MealPlanRecipeColumn::MealGroupId)
            .col(MealPlanRecipeColumn::Position)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_meal_plan_recipes_group_recipe")
            .table(MealPlanRecipe)
            .col(MealPlanRecipeColumn::MealGroupId)
            .col(MealPlanRecipeColumn::RecipeId)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_saved_recipes_user_recipe")
            .table(SavedRecipe)
            .col(SavedRecipeColumn::UserId)
            .col(SavedRecipeColumn::RecipeId)
            .unique()
            .to_owned(),
    ]
}

/// Creates all necessary database tables and indexes, skipping any that already exist.
///
/// Parents are created before children so the generated foreign keys always
/// reference an existing table.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Recipe).await?;
    create_table(db, &schema, Ingredient).await?;
    create_table(db, &schema, InstructionSection).await?;
    create_table(db, &schema, InstructionStep).await?;
    create_table(db, &schema, SavedRecipe).await?;
    create_table(db, &schema, MealPlan).await?;
    create_table(db, &schema, MealGroup).await?;
    create_table(db, &schema, MealPlanRecipe).await?;
    create_table(db, &schema, ShoppingList).await?;
    create_table(db, &schema, ShoppingItem).await?;

    for index in unique_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}
