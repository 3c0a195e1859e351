//! Meal plan business logic - plans, their groups and the recipes placed in them.
//!
//! A plan owns ordered meal groups; each group holds ordered entries that
//! point at recipes with their own servings. A recipe appears at most once per
//! group. Positions are 1-based and contiguous within their parent.

use super::{
    ordering::{insertion_index, position_at, renumber},
    recipe::{ScaledIngredient, load_ingredients, require_recipe, scale_lines},
    templates::MealPlanTemplate,
};
use crate::{
    entities::{
        MealGroup, MealPlan, MealPlanRecipe, Recipe, meal_group, meal_plan, meal_plan_recipe,
        recipe, user,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::collections::HashMap;
use tracing::{info, instrument};

/// A recipe placed in a meal group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealPlanEntry {
    /// The entry row
    pub entry: meal_plan_recipe::Model,
    /// The referenced recipe
    pub recipe: recipe::Model,
}

/// A group with its entries in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealGroupDetail {
    /// The group row
    pub group: meal_group::Model,
    /// Entries ordered by position
    pub entries: Vec<MealPlanEntry>,
}

/// A meal plan with its groups in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealPlanDetail {
    /// The plan row
    pub meal_plan: meal_plan::Model,
    /// Groups ordered by position
    pub groups: Vec<MealGroupDetail>,
}

impl MealPlanDetail {
    /// Number of entries across all groups.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }
}

/// State after toggling a recipe in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Whether the recipe is in the group afterwards
    pub in_group: bool,
    /// Whether the recipe is in any group of the plan afterwards
    pub in_plan: bool,
    /// Entries in the whole plan afterwards
    pub plan_recipe_count: u64,
}

/// Name given to a plan created without one, e.g. "7 Mar Meal Plan".
#[must_use]
pub fn default_meal_plan_name(now: DateTime<Utc>) -> String {
    format!("{} Meal Plan", now.format("%-d %b"))
}

fn validate_name(name: &str, what: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation(format!("{what} name cannot be empty")));
    }
    Ok(name.to_string())
}

async fn require_meal_plan<C>(db: &C, meal_plan_id: i64) -> Result<meal_plan::Model>
where
    C: ConnectionTrait,
{
    MealPlan::find_by_id(meal_plan_id)
        .one(db)
        .await?
        .ok_or(Error::MealPlanNotFound { id: meal_plan_id })
}

async fn require_group<C>(db: &C, group_id: i64) -> Result<meal_group::Model>
where
    C: ConnectionTrait,
{
    MealGroup::find_by_id(group_id)
        .one(db)
        .await?
        .ok_or(Error::MealGroupNotFound { id: group_id })
}

async fn require_entry<C>(db: &C, entry_id: i64) -> Result<meal_plan_recipe::Model>
where
    C: ConnectionTrait,
{
    MealPlanRecipe::find_by_id(entry_id)
        .one(db)
        .await?
        .ok_or(Error::MealPlanRecipeNotFound { id: entry_id })
}

async fn group_ids<C>(db: &C, meal_plan_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    Ok(MealGroup::find()
        .filter(meal_group::Column::MealPlanId.eq(meal_plan_id))
        .order_by_asc(meal_group::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect())
}

async fn entry_ids<C>(db: &C, group_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    Ok(MealPlanRecipe::find()
        .filter(meal_plan_recipe::Column::MealGroupId.eq(group_id))
        .order_by_asc(meal_plan_recipe::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|e| e.id)
        .collect())
}

async fn renumber_entries<C>(db: &C, ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    renumber::<MealPlanRecipe, _>(
        db,
        meal_plan_recipe::Column::Id,
        meal_plan_recipe::Column::Position,
        ids,
    )
    .await
}

async fn touch_meal_plan<C>(db: &C, meal_plan_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    MealPlan::update_many()
        .col_expr(meal_plan::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(meal_plan::Column::Id.eq(meal_plan_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Number of entries across every group of a plan.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn count_plan_recipes<C>(db: &C, meal_plan_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    MealPlanRecipe::find()
        .inner_join(MealGroup)
        .filter(meal_group::Column::MealPlanId.eq(meal_plan_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Creates a plan and its template groups.
///
/// # Errors
/// Returns an error if a supplied name is blank or an insert fails.
#[instrument(skip(db, owner), fields(owner = owner.id))]
pub async fn create_meal_plan(
    db: &DatabaseConnection,
    owner: &user::Model,
    name: Option<String>,
    template: MealPlanTemplate,
) -> Result<MealPlanDetail> {
    let now = Utc::now();
    let name = match name {
        Some(name) => validate_name(&name, "Meal plan")?,
        None => default_meal_plan_name(now),
    };

    let txn = db.begin().await?;
    let plan = meal_plan::ActiveModel {
        user_id: Set(owner.id),
        name: Set(name),
        created_at: Set(now),
        updated_at: Set(now),
        last_viewed_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut groups = Vec::with_capacity(template.meal_groups().len());
    for (index, group_name) in template.meal_groups().iter().enumerate() {
        let group = meal_group::ActiveModel {
            meal_plan_id: Set(plan.id),
            name: Set((*group_name).to_string()),
            position: Set(position_at(index)?),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        groups.push(MealGroupDetail {
            group,
            entries: Vec::new(),
        });
    }
    txn.commit().await?;

    info!(meal_plan_id = plan.id, template = %template, "created meal plan");
    Ok(MealPlanDetail {
        meal_plan: plan,
        groups,
    })
}

/// Retrieves a meal plan by ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_meal_plan_by_id(
    db: &DatabaseConnection,
    meal_plan_id: i64,
) -> Result<Option<meal_plan::Model>> {
    MealPlan::find_by_id(meal_plan_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a plan with its groups, entries and their recipes.
///
/// # Errors
/// Returns an error if the plan does not exist or a query fails.
pub async fn get_meal_plan_detail(
    db: &DatabaseConnection,
    meal_plan_id: i64,
) -> Result<MealPlanDetail> {
    let meal_plan = require_meal_plan(db, meal_plan_id).await?;
    let groups = MealGroup::find()
        .filter(meal_group::Column::MealPlanId.eq(meal_plan_id))
        .order_by_asc(meal_group::Column::Position)
        .all(db)
        .await?;

    let entries = MealPlanRecipe::find()
        .filter(meal_plan_recipe::Column::MealGroupId.is_in(groups.iter().map(|g| g.id)))
        .order_by_asc(meal_plan_recipe::Column::Position)
        .find_also_related(Recipe)
        .all(db)
        .await?;

    let mut by_group: HashMap<i64, Vec<MealPlanEntry>> = HashMap::new();
    for (entry, recipe) in entries {
        let recipe = recipe.ok_or(Error::RecipeNotFound {
            id: entry.recipe_id,
        })?;
        by_group
            .entry(entry.meal_group_id)
            .or_default()
            .push(MealPlanEntry { entry, recipe });
    }

    let groups = groups
        .into_iter()
        .map(|group| {
            let entries = by_group.remove(&group.id).unwrap_or_default();
            MealGroupDetail { group, entries }
        })
        .collect();

    Ok(MealPlanDetail { meal_plan, groups })
}

/// The user's plans, most recently viewed first; never-viewed plans follow,
/// most recently modified first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_meal_plans(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<meal_plan::Model>> {
    MealPlan::find()
        .filter(meal_plan::Column::UserId.eq(user_id))
        .order_by_desc(meal_plan::Column::LastViewedAt)
        .order_by_desc(meal_plan::Column::UpdatedAt)
        .order_by_desc(meal_plan::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The plan the user looked at last, if any.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn most_recent_meal_plan(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<meal_plan::Model>> {
    Ok(list_meal_plans(db, user_id).await?.into_iter().next())
}

/// Records that the plan was opened.
///
/// # Errors
/// Returns an error if the plan does not exist or the update fails.
pub async fn mark_meal_plan_viewed(
    db: &DatabaseConnection,
    meal_plan_id: i64,
) -> Result<meal_plan::Model> {
    let plan = require_meal_plan(db, meal_plan_id).await?;
    let mut active: meal_plan::ActiveModel = plan.into();
    active.last_viewed_at = Set(Some(Utc::now()));
    active.update(db).await.map_err(Into::into)
}

/// Renames a plan.
///
/// # Errors
/// Returns an error if the name is blank, the plan does not exist or the
/// update fails.
pub async fn rename_meal_plan(
    db: &DatabaseConnection,
    meal_plan_id: i64,
    name: String,
) -> Result<meal_plan::Model> {
    let name = validate_name(&name, "Meal plan")?;
    let plan = require_meal_plan(db, meal_plan_id).await?;
    let mut active: meal_plan::ActiveModel = plan.into();
    active.name = Set(name);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a plan with its groups and entries. Shopping lists generated from
/// it are kept and lose their link to the plan.
///
/// # Errors
/// Returns an error if the plan does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_meal_plan(db: &DatabaseConnection, meal_plan_id: i64) -> Result<()> {
    require_meal_plan(db, meal_plan_id).await?;
    MealPlan::delete_by_id(meal_plan_id).exec(db).await?;
    info!(meal_plan_id, "deleted meal plan");
    Ok(())
}

/// Appends a named group to a plan.
///
/// # Errors
/// Returns an error if the name is blank, the plan does not exist or the
/// insert fails.
pub async fn add_meal_group(
    db: &DatabaseConnection,
    meal_plan_id: i64,
    name: String,
) -> Result<meal_group::Model> {
    let name = validate_name(&name, "Meal group")?;

    let txn = db.begin().await?;
    require_meal_plan(&txn, meal_plan_id).await?;
    let existing = group_ids(&txn, meal_plan_id).await?;
    let group = meal_group::ActiveModel {
        meal_plan_id: Set(meal_plan_id),
        name: Set(name),
        position: Set(position_at(existing.len())?),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    touch_meal_plan(&txn, meal_plan_id).await?;
    txn.commit().await?;
    Ok(group)
}

/// Renames a group.
///
/// # Errors
/// Returns an error if the name is blank, the group does not exist or the
/// update fails.
pub async fn rename_meal_group(
    db: &DatabaseConnection,
    group_id: i64,
    name: String,
) -> Result<meal_group::Model> {
    let name = validate_name(&name, "Meal group")?;
    let group = require_group(db, group_id).await?;
    let mut active: meal_group::ActiveModel = group.into();
    active.name = Set(name);
    active.update(db).await.map_err(Into::into)
}

/// Deletes a group with its entries and renumbers the remaining groups.
///
/// # Errors
/// Returns an error if the group does not exist or the delete fails.
pub async fn delete_meal_group(db: &DatabaseConnection, group_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let group = require_group(&txn, group_id).await?;
    MealGroup::delete_by_id(group_id).exec(&txn).await?;

    let remaining = group_ids(&txn, group.meal_plan_id).await?;
    renumber::<MealGroup, _>(
        &txn,
        meal_group::Column::Id,
        meal_group::Column::Position,
        &remaining,
    )
    .await?;
    touch_meal_plan(&txn, group.meal_plan_id).await?;
    txn.commit().await?;
    Ok(())
}

async fn insert_entry<C>(
    db: &C,
    group: &meal_group::Model,
    recipe: &recipe::Model,
    servings: i32,
) -> Result<meal_plan_recipe::Model>
where
    C: ConnectionTrait,
{
    let existing = entry_ids(db, group.id).await?;
    let entry = meal_plan_recipe::ActiveModel {
        meal_group_id: Set(group.id),
        recipe_id: Set(recipe.id),
        servings: Set(servings),
        position: Set(position_at(existing.len())?),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    touch_meal_plan(db, group.meal_plan_id).await?;
    Ok(entry)
}

async fn find_entry<C>(
    db: &C,
    group_id: i64,
    recipe_id: i64,
) -> Result<Option<meal_plan_recipe::Model>>
where
    C: ConnectionTrait,
{
    MealPlanRecipe::find()
        .filter(meal_plan_recipe::Column::MealGroupId.eq(group_id))
        .filter(meal_plan_recipe::Column::RecipeId.eq(recipe_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Appends a recipe to a group. Servings default to the recipe's own.
///
/// # Errors
/// Returns an error if:
/// - `servings` is below 1
/// - The group or recipe does not exist
/// - The recipe is already in the group ([`Error::DuplicateMealPlanRecipe`])
/// - The insert fails
#[instrument(skip(db))]
pub async fn add_recipe_to_group(
    db: &DatabaseConnection,
    group_id: i64,
    recipe_id: i64,
    servings: Option<i32>,
) -> Result<meal_plan_recipe::Model> {
    if let Some(servings) = servings {
        validate_entry_servings(servings)?;
    }

    let txn = db.begin().await?;
    let group = require_group(&txn, group_id).await?;
    let recipe = require_recipe(&txn, recipe_id).await?;
    if find_entry(&txn, group_id, recipe_id).await?.is_some() {
        return Err(Error::DuplicateMealPlanRecipe {
            group_id,
            recipe_id,
        });
    }

    let entry = insert_entry(&txn, &group, &recipe, servings.unwrap_or(recipe.servings)).await?;
    txn.commit().await?;
    Ok(entry)
}

/// Adds the recipe to the group, or removes it if it is already there.
///
/// # Errors
/// Returns an error if the group or recipe does not exist or a write fails.
#[instrument(skip(db))]
pub async fn toggle_recipe_in_group(
    db: &DatabaseConnection,
    group_id: i64,
    recipe_id: i64,
) -> Result<ToggleOutcome> {
    let txn = db.begin().await?;
    let group = require_group(&txn, group_id).await?;
    let recipe = require_recipe(&txn, recipe_id).await?;

    let in_group = if let Some(existing) = find_entry(&txn, group_id, recipe_id).await? {
        MealPlanRecipe::delete_by_id(existing.id).exec(&txn).await?;
        renumber_entries(&txn, &entry_ids(&txn, group_id).await?).await?;
        touch_meal_plan(&txn, group.meal_plan_id).await?;
        false
    } else {
        insert_entry(&txn, &group, &recipe, recipe.servings).await?;
        true
    };

    let in_plan = MealPlanRecipe::find()
        .inner_join(MealGroup)
        .filter(meal_group::Column::MealPlanId.eq(group.meal_plan_id))
        .filter(meal_plan_recipe::Column::RecipeId.eq(recipe_id))
        .count(&txn)
        .await?
        > 0;
    let plan_recipe_count = count_plan_recipes(&txn, group.meal_plan_id).await?;
    txn.commit().await?;

    Ok(ToggleOutcome {
        in_group,
        in_plan,
        plan_recipe_count,
    })
}

/// Removes an entry and closes the gap in its group. Returns the plan's
/// remaining entry count.
///
/// # Errors
/// Returns an error if the entry does not exist or the delete fails.
pub async fn remove_meal_plan_recipe(db: &DatabaseConnection, entry_id: i64) -> Result<u64> {
    let txn = db.begin().await?;
    let entry = require_entry(&txn, entry_id).await?;
    let group = require_group(&txn, entry.meal_group_id).await?;

    MealPlanRecipe::delete_by_id(entry_id).exec(&txn).await?;
    renumber_entries(&txn, &entry_ids(&txn, group.id).await?).await?;
    touch_meal_plan(&txn, group.meal_plan_id).await?;

    let remaining = count_plan_recipes(&txn, group.meal_plan_id).await?;
    txn.commit().await?;
    Ok(remaining)
}

/// Moves an entry to a 1-based position in a group of the same plan. Both the
/// source and target groups stay contiguous.
///
/// # Errors
/// Returns an error if:
/// - The entry or target group does not exist
/// - The target group belongs to another plan
/// - The target group already holds the same recipe
/// - An update fails
#[instrument(skip(db))]
pub async fn move_meal_plan_recipe(
    db: &DatabaseConnection,
    entry_id: i64,
    to_group_id: i64,
    to_position: i32,
) -> Result<meal_plan_recipe::Model> {
    let txn = db.begin().await?;
    let entry = require_entry(&txn, entry_id).await?;
    let from_group = require_group(&txn, entry.meal_group_id).await?;
    let to_group = require_group(&txn, to_group_id).await?;

    if from_group.meal_plan_id != to_group.meal_plan_id {
        return Err(Error::validation(
            "Meal plan recipes can only move within the same meal plan",
        ));
    }

    if from_group.id != to_group.id {
        if find_entry(&txn, to_group.id, entry.recipe_id).await?.is_some() {
            return Err(Error::DuplicateMealPlanRecipe {
                group_id: to_group.id,
                recipe_id: entry.recipe_id,
            });
        }
        // Position 0 is never used by a settled row.
        MealPlanRecipe::update_many()
            .col_expr(meal_plan_recipe::Column::MealGroupId, Expr::value(to_group.id))
            .col_expr(meal_plan_recipe::Column::Position, Expr::value(0))
            .filter(meal_plan_recipe::Column::Id.eq(entry_id))
            .exec(&txn)
            .await?;
        renumber_entries(&txn, &entry_ids(&txn, from_group.id).await?).await?;
    }

    let mut ids: Vec<i64> = entry_ids(&txn, to_group.id)
        .await?
        .into_iter()
        .filter(|id| *id != entry_id)
        .collect();
    ids.insert(insertion_index(to_position, ids.len()), entry_id);
    renumber_entries(&txn, &ids).await?;
    touch_meal_plan(&txn, to_group.meal_plan_id).await?;

    let moved = require_entry(&txn, entry_id).await?;
    txn.commit().await?;
    Ok(moved)
}

fn validate_entry_servings(servings: i32) -> Result<()> {
    if servings < 1 {
        return Err(Error::validation(format!(
            "Servings must be at least 1, got {servings}"
        )));
    }
    Ok(())
}

/// Changes how many servings an entry is cooked for.
///
/// # Errors
/// Returns an error if `servings` is below 1, the entry does not exist or the
/// update fails.
pub async fn set_meal_plan_recipe_servings(
    db: &DatabaseConnection,
    entry_id: i64,
    servings: i32,
) -> Result<meal_plan_recipe::Model> {
    validate_entry_servings(servings)?;
    let entry = require_entry(db, entry_id).await?;
    let mut active: meal_plan_recipe::ActiveModel = entry.into();
    active.servings = Set(servings);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// The entry's recipe ingredients scaled to the entry's servings.
///
/// # Errors
/// Returns an error if the entry or its recipe does not exist or a query fails.
pub async fn scaled_entry_ingredients(
    db: &DatabaseConnection,
    entry_id: i64,
) -> Result<Vec<ScaledIngredient>> {
    let entry = require_entry(db, entry_id).await?;
    let recipe = require_recipe(db, entry.recipe_id).await?;
    let ingredients = load_ingredients(db, recipe.id).await?;
    Ok(scale_lines(&ingredients, recipe.servings, entry.servings))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_recipe, create_test_user, setup_test_db};
    use chrono::TimeZone;

    fn layout(detail: &MealPlanDetail) -> Vec<Vec<(i64, i32)>> {
        detail
            .groups
            .iter()
            .map(|g| {
                g.entries
                    .iter()
                    .map(|e| (e.recipe.id, e.entry.position))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_default_meal_plan_name() {
        let date = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(default_meal_plan_name(date), "7 Mar Meal Plan");
    }

    #[tokio::test]
    async fn test_create_from_templates() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;

        let weekday = create_meal_plan(&db, &owner, None, MealPlanTemplate::Weekday).await?;
        assert!(weekday.meal_plan.name.ends_with("Meal Plan"));
        let names: Vec<&str> = weekday.groups.iter().map(|g| g.group.name.as_str()).collect();
        assert_eq!(names[0], "Monday");
        assert_eq!(names[6], "Sunday");
        assert_eq!(weekday.groups[6].group.position, 7);

        let blank = create_meal_plan(
            &db,
            &owner,
            Some("Party".to_string()),
            MealPlanTemplate::Blank,
        )
        .await?;
        assert_eq!(blank.meal_plan.name, "Party");
        assert!(blank.groups.is_empty());

        let reloaded = get_meal_plan_detail(&db, weekday.meal_plan.id).await?;
        assert_eq!(reloaded.groups.len(), 7);
        assert_eq!(reloaded.groups[3].group.name, "Thursday");
        assert_eq!(reloaded.entry_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_recipe_defaults_and_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let recipe = create_test_recipe(&db, &owner, "Chili", 6, &[("beans", "2 cans")]).await?;
        let plan = create_meal_plan(&db, &owner, None, MealPlanTemplate::MealType).await?;
        let dinners = plan.groups[2].group.id;

        let entry = add_recipe_to_group(&db, dinners, recipe.id, None).await?;
        assert_eq!(entry.servings, 6);
        assert_eq!(entry.position, 1);

        let duplicate = add_recipe_to_group(&db, dinners, recipe.id, Some(2)).await;
        assert!(matches!(
            duplicate,
            Err(Error::DuplicateMealPlanRecipe { .. })
        ));

        let lunches = plan.groups[1].group.id;
        let custom = add_recipe_to_group(&db, lunches, recipe.id, Some(2)).await?;
        assert_eq!(custom.servings, 2);

        let zero = add_recipe_to_group(&db, plan.groups[0].group.id, recipe.id, Some(0)).await;
        assert!(matches!(zero, Err(Error::Validation { .. })));
        assert_eq!(count_plan_recipes(&db, plan.meal_plan.id).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_reports_group_and_plan_state() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let recipe = create_test_recipe(&db, &owner, "Tacos", 4, &[("tortilla", "8")]).await?;
        let plan = create_meal_plan(&db, &owner, None, MealPlanTemplate::Weekday).await?;
        let monday = plan.groups[0].group.id;
        let tuesday = plan.groups[1].group.id;

        let added = toggle_recipe_in_group(&db, monday, recipe.id).await?;
        assert_eq!(
            added,
            ToggleOutcome {
                in_group: true,
                in_plan: true,
                plan_recipe_count: 1
            }
        );

        toggle_recipe_in_group(&db, tuesday, recipe.id).await?;
        let removed = toggle_recipe_in_group(&db, monday, recipe.id).await?;
        assert_eq!(
            removed,
            ToggleOutcome {
                in_group: false,
                in_plan: true,
                plan_recipe_count: 1
            }
        );

        let removed = toggle_recipe_in_group(&db, tuesday, recipe.id).await?;
        assert!(!removed.in_plan);
        assert_eq!(removed.plan_recipe_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_move_within_and_across_groups() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let a = create_test_recipe(&db, &owner, "A", 2, &[("x", "1")]).await?;
        let b = create_test_recipe(&db, &owner, "B", 2, &[("x", "1")]).await?;
        let c = create_test_recipe(&db, &owner, "C", 2, &[("x", "1")]).await?;
        let plan = create_meal_plan(&db, &owner, None, MealPlanTemplate::MealType).await?;
        let first = plan.groups[0].group.id;
        let second = plan.groups[1].group.id;

        let entry_a = add_recipe_to_group(&db, first, a.id, None).await?;
        add_recipe_to_group(&db, first, b.id, None).await?;
        let entry_c = add_recipe_to_group(&db, first, c.id, None).await?;

        move_meal_plan_recipe(&db, entry_c.id, first, 1).await?;
        let detail = get_meal_plan_detail(&db, plan.meal_plan.id).await?;
        assert_eq!(layout(&detail)[0], vec![(c.id, 1), (a.id, 2), (b.id, 3)]);

        let moved = move_meal_plan_recipe(&db, entry_a.id, second, 5).await?;
        assert_eq!(moved.meal_group_id, second);
        assert_eq!(moved.position, 1);
        let detail = get_meal_plan_detail(&db, plan.meal_plan.id).await?;
        assert_eq!(layout(&detail)[0], vec![(c.id, 1), (b.id, 2)]);
        assert_eq!(layout(&detail)[1], vec![(a.id, 1)]);

        let other = create_meal_plan(&db, &owner, None, MealPlanTemplate::Weekday).await?;
        let cross = move_meal_plan_recipe(&db, entry_a.id, other.groups[0].group.id, 1).await;
        assert!(matches!(cross, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_and_group_deletion_renumber() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let a = create_test_recipe(&db, &owner, "A", 2, &[("x", "1")]).await?;
        let b = create_test_recipe(&db, &owner, "B", 2, &[("x", "1")]).await?;
        let plan = create_meal_plan(&db, &owner, None, MealPlanTemplate::MealType).await?;
        let breakfasts = plan.groups[0].group.id;

        let entry_a = add_recipe_to_group(&db, breakfasts, a.id, None).await?;
        add_recipe_to_group(&db, breakfasts, b.id, None).await?;
        assert_eq!(remove_meal_plan_recipe(&db, entry_a.id).await?, 1);

        let detail = get_meal_plan_detail(&db, plan.meal_plan.id).await?;
        assert_eq!(layout(&detail)[0], vec![(b.id, 1)]);

        delete_meal_group(&db, plan.groups[1].group.id).await?;
        let detail = get_meal_plan_detail(&db, plan.meal_plan.id).await?;
        let groups: Vec<(&str, i32)> = detail
            .groups
            .iter()
            .map(|g| (g.group.name.as_str(), g.group.position))
            .collect();
        assert_eq!(
            groups,
            vec![("Breakfasts", 1), ("Dinners", 2), ("Snacks", 3)]
        );

        let added = add_meal_group(&db, plan.meal_plan.id, "Desserts".to_string()).await?;
        assert_eq!(added.position, 4);
        let renamed = rename_meal_group(&db, added.id, "Puddings".to_string()).await?;
        assert_eq!(renamed.name, "Puddings");
        assert!(rename_meal_group(&db, added.id, " ".to_string()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_and_viewing() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let first = create_meal_plan(&db, &owner, Some("First".into()), MealPlanTemplate::Blank)
            .await?;
        let second = create_meal_plan(&db, &owner, Some("Second".into()), MealPlanTemplate::Blank)
            .await?;

        mark_meal_plan_viewed(&db, first.meal_plan.id).await?;
        let recent = most_recent_meal_plan(&db, owner.id).await?.unwrap();
        assert_eq!(recent.id, first.meal_plan.id);
        let listed = list_meal_plans(&db, owner.id).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].id, second.meal_plan.id);

        let renamed = rename_meal_plan(&db, second.meal_plan.id, "Renamed".into()).await?;
        assert_eq!(renamed.name, "Renamed");
        assert!(rename_meal_plan(&db, second.meal_plan.id, String::new()).await.is_err());

        delete_meal_plan(&db, first.meal_plan.id).await?;
        assert!(get_meal_plan_by_id(&db, first.meal_plan.id).await?.is_none());
        assert!(matches!(
            delete_meal_plan(&db, first.meal_plan.id).await,
            Err(Error::MealPlanNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_servings_and_scaled_entry() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let recipe = create_test_recipe(&db, &owner, "Soup", 2, &[("carrot", "2 cups")]).await?;
        let plan = create_meal_plan(&db, &owner, None, MealPlanTemplate::Weekday).await?;
        let entry = add_recipe_to_group(&db, plan.groups[0].group.id, recipe.id, None).await?;

        let updated = set_meal_plan_recipe_servings(&db, entry.id, 4).await?;
        assert_eq!(updated.servings, 4);
        assert!(set_meal_plan_recipe_servings(&db, entry.id, 0).await.is_err());

        let scaled = scaled_entry_ingredients(&db, entry.id).await?;
        assert_eq!(scaled[0].quantity, "4 cups");
        assert_eq!(scaled[0].name, "carrots");
        Ok(())
    }
}
