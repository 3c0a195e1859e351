//! Content digests and shopping-list staleness.
//!
//! A recipe's `ingredients_digest` hashes its servings and ordered
//! `(name, quantity)` pairs. A shopping list's `content_digest` hashes the
//! `(recipe digest, servings)` pairs of every entry in its source meal plan.
//! Both are SHA-256 over canonical JSON (object keys sorted), hex encoded.
//!
//! Each cached field has a single writer: [`recompute_ingredients_digest`] for
//! recipes and [`refresh_content_digest`] for shopping lists. Checking for
//! staleness ([`is_out_of_sync`]) never writes.

use crate::{
    entities::{
        Ingredient, MealGroup, MealPlanRecipe, Recipe, ShoppingList, ingredient, meal_group,
        meal_plan_recipe, recipe, shopping_list,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*, sea_query::Expr};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// One `(recipe digest, servings)` pair contributing to a shopping list digest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DigestSource {
    /// The referenced recipe's `ingredients_digest`
    pub recipe_digest: String,
    /// Servings recorded on the meal plan entry
    pub servings: i32,
}

// The payload structs below are the canonical form: fields are declared in
// sorted key order and serialized compactly, so no map ordering is involved.

#[derive(Serialize)]
struct IngredientPayload<'a> {
    name: &'a str,
    quantity: &'a str,
}

#[derive(Serialize)]
struct RecipePayload<'a> {
    ingredients: Vec<IngredientPayload<'a>>,
    servings: i32,
}

#[derive(Serialize)]
struct SourcePayload<'a> {
    recipe_digest: &'a str,
    servings: i32,
}

fn canonical_json<T: Serialize>(payload: &T) -> String {
    // Serializing plain structs of strings and integers cannot fail.
    serde_json::to_string(payload).unwrap_or_default()
}

fn sha256_hex(canonical: &str) -> String {
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

fn recipe_payload<'a, I>(servings: i32, ingredients: I) -> RecipePayload<'a>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    RecipePayload {
        ingredients: ingredients
            .into_iter()
            .map(|(name, quantity)| IngredientPayload { name, quantity })
            .collect(),
        servings,
    }
}

/// Digest of a recipe's scalable content. `ingredients` must already be in
/// position order.
#[must_use]
pub fn compute_ingredients_digest<'a, I>(servings: i32, ingredients: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    sha256_hex(&canonical_json(&recipe_payload(servings, ingredients)))
}

/// Digest of stored ingredient rows, ordered by their `position`.
#[must_use]
pub fn ingredients_digest(servings: i32, ingredients: &[ingredient::Model]) -> String {
    let mut ordered: Vec<&ingredient::Model> = ingredients.iter().collect();
    ordered.sort_by_key(|i| i.position);
    compute_ingredients_digest(
        servings,
        ordered.iter().map(|i| (i.name.as_str(), i.quantity.as_str())),
    )
}

/// Digest over a multiset of sources. Sources are sorted first, so the layout
/// of the meal plan does not affect the result.
#[must_use]
pub fn compute_content_digest(sources: &[DigestSource]) -> String {
    let mut sorted = sources.to_vec();
    sorted.sort();
    let entries: Vec<SourcePayload<'_>> = sorted
        .iter()
        .map(|s| SourcePayload {
            recipe_digest: &s.recipe_digest,
            servings: s.servings,
        })
        .collect();
    sha256_hex(&canonical_json(&entries))
}

/// Recomputes a recipe's ingredients digest and stores it if it changed.
///
/// Call this once after every mutation of a recipe's ingredients or servings,
/// inside the same transaction as the mutation.
#[instrument(skip(db))]
pub async fn recompute_ingredients_digest<C>(db: &C, recipe_id: i64) -> Result<String>
where
    C: ConnectionTrait,
{
    let recipe = Recipe::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or(Error::RecipeNotFound { id: recipe_id })?;

    let ingredients = Ingredient::find()
        .filter(ingredient::Column::RecipeId.eq(recipe_id))
        .order_by_asc(ingredient::Column::Position)
        .all(db)
        .await?;

    let digest = ingredients_digest(recipe.servings, &ingredients);
    if digest != recipe.ingredients_digest {
        // Column-only update: the caller decides whether `updated_at` moves.
        Recipe::update_many()
            .col_expr(recipe::Column::IngredientsDigest, Expr::value(digest.clone()))
            .filter(recipe::Column::Id.eq(recipe_id))
            .exec(db)
            .await?;
        debug!(recipe_id, %digest, "ingredients digest updated");
    }
    Ok(digest)
}

/// Collects the `(recipe digest, servings)` pairs for every entry of a meal
/// plan. A missing plan contributes nothing.
pub async fn collect_digest_sources<C>(db: &C, meal_plan_id: Option<i64>) -> Result<Vec<DigestSource>>
where
    C: ConnectionTrait,
{
    let Some(meal_plan_id) = meal_plan_id else {
        return Ok(Vec::new());
    };

    let group_ids: Vec<i64> = MealGroup::find()
        .filter(meal_group::Column::MealPlanId.eq(meal_plan_id))
        .all(db)
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect();
    if group_ids.is_empty() {
        return Ok(Vec::new());
    }

    let entries = MealPlanRecipe::find()
        .filter(meal_plan_recipe::Column::MealGroupId.is_in(group_ids))
        .all(db)
        .await?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_digests: HashMap<i64, String> = Recipe::find()
        .filter(recipe::Column::Id.is_in(entries.iter().map(|e| e.recipe_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|r| (r.id, r.ingredients_digest))
        .collect();

    entries
        .into_iter()
        .map(|entry| {
            let recipe_digest = recipe_digests
                .get(&entry.recipe_id)
                .cloned()
                .ok_or(Error::RecipeNotFound {
                    id: entry.recipe_id,
                })?;
            Ok(DigestSource {
                recipe_digest,
                servings: entry.servings,
            })
        })
        .collect()
}

/// Digest a meal plan would give a shopping list generated from it right now.
pub async fn meal_plan_content_digest<C>(db: &C, meal_plan_id: Option<i64>) -> Result<String>
where
    C: ConnectionTrait,
{
    let sources = collect_digest_sources(db, meal_plan_id).await?;
    Ok(compute_content_digest(&sources))
}

async fn require_shopping_list<C>(db: &C, shopping_list_id: i64) -> Result<shopping_list::Model>
where
    C: ConnectionTrait,
{
    ShoppingList::find_by_id(shopping_list_id)
        .one(db)
        .await?
        .ok_or(Error::ShoppingListNotFound {
            id: shopping_list_id,
        })
}

/// Recomputes a shopping list's content digest without storing it.
pub async fn recompute_content_digest<C>(db: &C, shopping_list_id: i64) -> Result<String>
where
    C: ConnectionTrait,
{
    let list = require_shopping_list(db, shopping_list_id).await?;
    meal_plan_content_digest(db, list.meal_plan_id).await
}

/// Whether the recipes behind a shopping list changed since its digest was stored.
///
/// Read-only: the stored digest is left untouched, so the answer stays `true`
/// until [`refresh_content_digest`] is called.
#[instrument(skip(db))]
pub async fn is_out_of_sync<C>(db: &C, shopping_list_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let list = require_shopping_list(db, shopping_list_id).await?;
    let current = meal_plan_content_digest(db, list.meal_plan_id).await?;
    Ok(current != list.content_digest)
}

/// Recomputes a shopping list's content digest and stores it.
#[instrument(skip(db))]
pub async fn refresh_content_digest<C>(db: &C, shopping_list_id: i64) -> Result<String>
where
    C: ConnectionTrait,
{
    let list = require_shopping_list(db, shopping_list_id).await?;
    let digest = meal_plan_content_digest(db, list.meal_plan_id).await?;
    if digest != list.content_digest {
        ShoppingList::update_many()
            .col_expr(
                shopping_list::Column::ContentDigest,
                Expr::value(digest.clone()),
            )
            .filter(shopping_list::Column::Id.eq(shopping_list_id))
            .exec(db)
            .await?;
        debug!(shopping_list_id, %digest, "content digest refreshed");
    }
    Ok(digest)
}
