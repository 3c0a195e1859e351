//! Ingredient editing. Every mutation recomputes the owning recipe's digest
//! inside its own transaction.

use super::{
    digest::recompute_ingredients_digest,
    ordering::{insertion_index, position_at, renumber},
    recipe::{load_ingredients, require_recipe, touch_recipe},
};
use crate::{
    entities::{Ingredient, ingredient},
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*};
use tracing::instrument;

async fn require_ingredient<C>(db: &C, ingredient_id: i64) -> Result<ingredient::Model>
where
    C: ConnectionTrait,
{
    Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or(Error::IngredientNotFound { id: ingredient_id })
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Ingredient name cannot be empty"));
    }
    Ok(())
}

async fn finish(txn: DatabaseTransaction, recipe_id: i64) -> Result<()> {
    recompute_ingredients_digest(&txn, recipe_id).await?;
    touch_recipe(&txn, recipe_id).await?;
    txn.commit().await?;
    Ok(())
}

/// A recipe's ingredients in position order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_ingredients(
    db: &DatabaseConnection,
    recipe_id: i64,
) -> Result<Vec<ingredient::Model>> {
    load_ingredients(db, recipe_id).await
}

/// Appends an ingredient to a recipe.
///
/// # Errors
/// Returns an error if the name is blank, the recipe does not exist or the
/// insert fails.
#[instrument(skip(db))]
pub async fn add_ingredient(
    db: &DatabaseConnection,
    recipe_id: i64,
    name: String,
    quantity: String,
) -> Result<ingredient::Model> {
    validate_name(&name)?;

    let txn = db.begin().await?;
    require_recipe(&txn, recipe_id).await?;
    let count = Ingredient::find()
        .filter(ingredient::Column::RecipeId.eq(recipe_id))
        .count(&txn)
        .await?;

    let ingredient = ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        name: Set(name.trim().to_string()),
        quantity: Set(quantity.trim().to_string()),
        position: Set(position_at(usize::try_from(count).unwrap_or(usize::MAX))?),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    finish(txn, recipe_id).await?;
    Ok(ingredient)
}

/// Changes an ingredient's name and quantity.
///
/// # Errors
/// Returns an error if the name is blank, the ingredient does not exist or the
/// update fails.
#[instrument(skip(db))]
pub async fn update_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i64,
    name: String,
    quantity: String,
) -> Result<ingredient::Model> {
    validate_name(&name)?;

    let txn = db.begin().await?;
    let existing = require_ingredient(&txn, ingredient_id).await?;
    let recipe_id = existing.recipe_id;

    let mut active: ingredient::ActiveModel = existing.into();
    active.name = Set(name.trim().to_string());
    active.quantity = Set(quantity.trim().to_string());
    active.updated_at = Set(chrono::Utc::now());
    let ingredient = active.update(&txn).await?;

    finish(txn, recipe_id).await?;
    Ok(ingredient)
}

/// Removes an ingredient and closes the gap in positions.
///
/// # Errors
/// Returns an error if the ingredient does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_ingredient(db: &DatabaseConnection, ingredient_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = require_ingredient(&txn, ingredient_id).await?;
    let recipe_id = existing.recipe_id;

    Ingredient::delete_by_id(ingredient_id).exec(&txn).await?;
    let remaining: Vec<i64> = load_ingredients(&txn, recipe_id)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();
    renumber::<Ingredient, _>(
        &txn,
        ingredient::Column::Id,
        ingredient::Column::Position,
        &remaining,
    )
    .await?;

    finish(txn, recipe_id).await
}

/// Moves an ingredient to a 1-based position within its recipe, shifting the
/// others. Positions past the end move it to the end.
///
/// Returns the recipe's ingredients in their new order.
///
/// # Errors
/// Returns an error if the ingredient does not exist or an update fails.
#[instrument(skip(db))]
pub async fn move_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i64,
    new_position: i32,
) -> Result<Vec<ingredient::Model>> {
    let txn = db.begin().await?;
    let existing = require_ingredient(&txn, ingredient_id).await?;
    let recipe_id = existing.recipe_id;

    let mut ids: Vec<i64> = load_ingredients(&txn, recipe_id)
        .await?
        .into_iter()
        .map(|i| i.id)
        .filter(|id| *id != ingredient_id)
        .collect();
    ids.insert(insertion_index(new_position, ids.len()), ingredient_id);
    renumber::<Ingredient, _>(&txn, ingredient::Column::Id, ingredient::Column::Position, &ids)
        .await?;

    let ingredients = load_ingredients(&txn, recipe_id).await?;
    finish(txn, recipe_id).await?;
    Ok(ingredients)
}
