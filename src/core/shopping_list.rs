//! Shopping list business logic - generation from meal plans and list upkeep.
//!
//! A generated list records the content digest of its meal plan at the moment
//! the ingredients were read, so later edits to the plan's recipes or servings
//! show up through [`digest::is_out_of_sync`](super::digest::is_out_of_sync).

use super::{
    digest::meal_plan_content_digest,
    meal_plan::{MealPlanDetail, get_meal_plan_detail},
    recipe::{load_ingredients, scale_lines},
};
use crate::{
    entities::{
        ShoppingCategory, ShoppingItem, ShoppingList, Units, shopping_item, shopping_list, user,
    },
    errors::{Error, Result},
    generation::{
        ShoppingListGenerator,
        shopping_list::{PreliminaryItem, ShoppingListRequest},
    },
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::collections::HashSet;
use tracing::{info, instrument};

/// A shopping list with its items sorted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListDetail {
    /// The list row
    pub shopping_list: shopping_list::Model,
    /// Items ordered by category, then name
    pub items: Vec<shopping_item::Model>,
}

impl ShoppingListDetail {
    /// Items grouped by category, skipping empty categories.
    #[must_use]
    pub fn by_category(&self) -> Vec<(ShoppingCategory, Vec<&shopping_item::Model>)> {
        ShoppingCategory::ALL
            .into_iter()
            .map(|category| {
                let items = self
                    .items
                    .iter()
                    .filter(|i| i.category == category)
                    .collect::<Vec<_>>();
                (category, items)
            })
            .filter(|(_, items)| !items.is_empty())
            .collect()
    }
}

/// Name given to a list generated from a plan.
#[must_use]
pub fn shopping_list_name(meal_plan_name: &str) -> String {
    format!("Shopping List for '{meal_plan_name}'")
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(name: &str) -> String {
    let mut chars = name.trim().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

fn sort_items(items: &mut [shopping_item::Model]) {
    items.sort_by(|a, b| {
        a.category
            .sort_order()
            .cmp(&b.category.sort_order())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
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

async fn require_item<C>(db: &C, item_id: i64) -> Result<shopping_item::Model>
where
    C: ConnectionTrait,
{
    ShoppingItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::ShoppingItemNotFound { id: item_id })
}

async fn touch_shopping_list<C>(db: &C, shopping_list_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    ShoppingList::update_many()
        .col_expr(shopping_list::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(shopping_list::Column::Id.eq(shopping_list_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn collect_preliminary_items(
    db: &DatabaseConnection,
    plan: &MealPlanDetail,
) -> Result<Vec<PreliminaryItem>> {
    let mut items = Vec::new();
    for group in &plan.groups {
        for entry in &group.entries {
            let ingredients = load_ingredients(db, entry.recipe.id).await?;
            let scaled = scale_lines(&ingredients, entry.recipe.servings, entry.entry.servings);
            items.extend(scaled.into_iter().map(|line| PreliminaryItem {
                name: line.name,
                quantity: line.quantity,
                recipe_id: entry.recipe.id,
            }));
        }
    }
    Ok(items)
}

/// Every ingredient of every entry in the plan, scaled to the entry's
/// servings, in group then entry then ingredient order.
///
/// # Errors
/// Returns an error if the plan does not exist or a query fails.
pub async fn preliminary_items(
    db: &DatabaseConnection,
    meal_plan_id: i64,
) -> Result<Vec<PreliminaryItem>> {
    let plan = get_meal_plan_detail(db, meal_plan_id).await?;
    collect_preliminary_items(db, &plan).await
}

/// Generates and stores a shopping list for a meal plan.
///
/// # Errors
/// Returns an error if:
/// - The plan does not exist or has no entries ([`Error::EmptyMealPlan`])
/// - The generator fails
/// - The generated list fails validation (nothing is stored)
/// - A database operation fails
#[instrument(skip(db, generator, owner), fields(owner = owner.id))]
pub async fn generate_shopping_list<G>(
    db: &DatabaseConnection,
    generator: &G,
    owner: &user::Model,
    meal_plan_id: i64,
    units: Units,
) -> Result<ShoppingListDetail>
where
    G: ShoppingListGenerator,
{
    let plan = get_meal_plan_detail(db, meal_plan_id).await?;
    if plan.entry_count() == 0 {
        return Err(Error::EmptyMealPlan { id: meal_plan_id });
    }

    // Taken before the generator runs so that edits made meanwhile mark the
    // new list as stale.
    let content_digest = meal_plan_content_digest(db, Some(meal_plan_id)).await?;
    let recipe_ids: HashSet<i64> = plan
        .groups
        .iter()
        .flat_map(|g| g.entries.iter().map(|e| e.recipe.id))
        .collect();

    let request = ShoppingListRequest {
        items: collect_preliminary_items(db, &plan).await?,
        units,
    };
    let generated = generator.generate_shopping_list(&request).await?;
    let drafts = generated.into_drafts(&recipe_ids)?;

    let now = Utc::now();
    let txn = db.begin().await?;
    let shopping_list = shopping_list::ActiveModel {
        user_id: Set(owner.id),
        meal_plan_id: Set(Some(meal_plan_id)),
        name: Set(shopping_list_name(&plan.meal_plan.name)),
        content_digest: Set(content_digest),
        created_at: Set(now),
        updated_at: Set(now),
        last_viewed_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let item = shopping_item::ActiveModel {
            shopping_list_id: Set(shopping_list.id),
            recipe_id: Set(draft.recipe_id),
            name: Set(draft.name),
            quantity: Set(draft.quantity),
            category: Set(draft.category),
            is_checked: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }
    txn.commit().await?;

    sort_items(&mut items);
    info!(
        shopping_list_id = shopping_list.id,
        items = items.len(),
        "generated shopping list"
    );
    Ok(ShoppingListDetail {
        shopping_list,
        items,
    })
}

/// Loads a list with its items ordered by category, then name.
///
/// # Errors
/// Returns an error if the list does not exist or a query fails.
pub async fn get_shopping_list_detail(
    db: &DatabaseConnection,
    shopping_list_id: i64,
) -> Result<ShoppingListDetail> {
    let shopping_list = require_shopping_list(db, shopping_list_id).await?;
    let mut items = ShoppingItem::find()
        .filter(shopping_item::Column::ShoppingListId.eq(shopping_list_id))
        .all(db)
        .await?;
    sort_items(&mut items);
    Ok(ShoppingListDetail {
        shopping_list,
        items,
    })
}

/// The user's lists, most recently viewed first; never-viewed lists follow,
/// most recently modified first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_shopping_lists(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<shopping_list::Model>> {
    ShoppingList::find()
        .filter(shopping_list::Column::UserId.eq(user_id))
        .order_by_desc(shopping_list::Column::LastViewedAt)
        .order_by_desc(shopping_list::Column::UpdatedAt)
        .order_by_desc(shopping_list::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The list the user looked at last, if any.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn most_recent_shopping_list(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<shopping_list::Model>> {
    Ok(list_shopping_lists(db, user_id).await?.into_iter().next())
}

/// Records that the list was opened.
///
/// # Errors
/// Returns an error if the list does not exist or the update fails.
pub async fn mark_shopping_list_viewed(
    db: &DatabaseConnection,
    shopping_list_id: i64,
) -> Result<shopping_list::Model> {
    let list = require_shopping_list(db, shopping_list_id).await?;
    let mut active: shopping_list::ActiveModel = list.into();
    active.last_viewed_at = Set(Some(Utc::now()));
    active.update(db).await.map_err(Into::into)
}

/// Renames a list.
///
/// # Errors
/// Returns an error if the name is blank, the list does not exist or the
/// update fails.
pub async fn rename_shopping_list(
    db: &DatabaseConnection,
    shopping_list_id: i64,
    name: String,
) -> Result<shopping_list::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Shopping list name cannot be empty"));
    }
    let list = require_shopping_list(db, shopping_list_id).await?;
    let mut active: shopping_list::ActiveModel = list.into();
    active.name = Set(name.trim().to_string());
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a list with its items.
///
/// # Errors
/// Returns an error if the list does not exist or the delete fails.
pub async fn delete_shopping_list(db: &DatabaseConnection, shopping_list_id: i64) -> Result<()> {
    require_shopping_list(db, shopping_list_id).await?;
    ShoppingList::delete_by_id(shopping_list_id).exec(db).await?;
    info!(shopping_list_id, "deleted shopping list");
    Ok(())
}

/// Adds a hand-written item. The name is capitalised and the category
/// defaults to fruit and vegetables.
///
/// # Errors
/// Returns an error if the name is blank, the list does not exist or the
/// insert fails.
pub async fn add_shopping_item(
    db: &DatabaseConnection,
    shopping_list_id: i64,
    name: &str,
    quantity: &str,
    category: Option<ShoppingCategory>,
) -> Result<shopping_item::Model> {
    let name = capitalize(name);
    if name.is_empty() {
        return Err(Error::validation("Item name cannot be empty"));
    }

    let txn = db.begin().await?;
    require_shopping_list(&txn, shopping_list_id).await?;
    let item = shopping_item::ActiveModel {
        shopping_list_id: Set(shopping_list_id),
        recipe_id: Set(None),
        name: Set(name),
        quantity: Set(quantity.trim().to_string()),
        category: Set(category.unwrap_or(ShoppingCategory::FruitVeg)),
        is_checked: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    touch_shopping_list(&txn, shopping_list_id).await?;
    txn.commit().await?;
    Ok(item)
}

/// Removes an item from its list.
///
/// # Errors
/// Returns an error if the item does not exist or the delete fails.
pub async fn delete_shopping_item(db: &DatabaseConnection, item_id: i64) -> Result<()> {
    let item = require_item(db, item_id).await?;
    ShoppingItem::delete_by_id(item_id).exec(db).await?;
    touch_shopping_list(db, item.shopping_list_id).await
}

/// Flips an item's checked flag.
///
/// # Errors
/// Returns an error if the item does not exist or the update fails.
pub async fn toggle_shopping_item_checked(
    db: &DatabaseConnection,
    item_id: i64,
) -> Result<shopping_item::Model> {
    let item = require_item(db, item_id).await?;
    let checked = !item.is_checked;
    let mut active: shopping_item::ActiveModel = item.into();
    active.is_checked = Set(checked);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{
            digest::{is_out_of_sync, recompute_content_digest, refresh_content_digest},
            ingredient::update_ingredient,
            meal_plan::{
                add_recipe_to_group, create_meal_plan, delete_meal_plan, move_meal_plan_recipe,
                set_meal_plan_recipe_servings,
            },
            recipe::get_recipe_detail,
            templates::MealPlanTemplate,
        },
        test_utils::{FakeShoppingListGenerator, create_test_recipe, setup_with_meal_plan},
    };

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("  bananas "), "Bananas");
        assert_eq!(capitalize("GREEK yogurt"), "Greek yogurt");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_preliminary_items_are_scaled_to_entry_servings() -> Result<()> {
        let (db, _user, recipe, plan) = setup_with_meal_plan().await?;
        let entry = plan.groups[0].entries[0].entry.id;
        set_meal_plan_recipe_servings(&db, entry, recipe.servings * 2).await?;

        let items = preliminary_items(&db, plan.meal_plan.id).await?;
        assert_eq!(
            items[0],
            PreliminaryItem {
                name: "carrots".to_string(),
                quantity: "4 cups".to_string(),
                recipe_id: recipe.id,
            }
        );
        assert!(items.iter().all(|i| i.recipe_id == recipe.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_stores_validated_items() -> Result<()> {
        let (db, user, recipe, plan) = setup_with_meal_plan().await?;
        let generator = FakeShoppingListGenerator::default();

        let detail =
            generate_shopping_list(&db, &generator, &user, plan.meal_plan.id, Units::Metric)
                .await?;
        assert_eq!(
            detail.shopping_list.name,
            format!("Shopping List for '{}'", plan.meal_plan.name)
        );
        assert_eq!(detail.shopping_list.meal_plan_id, Some(plan.meal_plan.id));

        // The fixture recipe contains salt, which the exclusion policy drops.
        let names: Vec<&str> = detail.items.iter().map(|i| i.name.as_str()).collect();
        assert!(!names.iter().any(|n| n.eq_ignore_ascii_case("salt")));
        assert!(detail.items.iter().all(|i| i.recipe_id == Some(recipe.id)));

        let request = generator.last_request().unwrap();
        assert_eq!(request.units, Units::Metric);
        let recipe_detail = get_recipe_detail(&db, recipe.id).await?;
        assert_eq!(request.items.len(), recipe_detail.ingredients.len());

        let reloaded = get_shopping_list_detail(&db, detail.shopping_list.id).await?;
        assert_eq!(reloaded.items.len(), detail.items.len());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_plan_is_rejected() -> Result<()> {
        let (db, user, _recipe, _plan) = setup_with_meal_plan().await?;
        let empty = create_meal_plan(&db, &user, None, MealPlanTemplate::Blank).await?;
        let generator = FakeShoppingListGenerator::default();

        let result =
            generate_shopping_list(&db, &generator, &user, empty.meal_plan.id, Units::Us).await;
        assert!(matches!(result, Err(Error::EmptyMealPlan { .. })));
        assert!(generator.last_request().is_none());
        assert!(list_shopping_lists(&db, user.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_category_stores_nothing() -> Result<()> {
        let (db, user, _recipe, plan) = setup_with_meal_plan().await?;
        let generator = FakeShoppingListGenerator::with_category("Homeware");

        let result =
            generate_shopping_list(&db, &generator, &user, plan.meal_plan.id, Units::Metric).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(list_shopping_lists(&db, user.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_staleness_tracks_recipe_and_servings_changes() -> Result<()> {
        let (db, user, recipe, plan) = setup_with_meal_plan().await?;
        let generator = FakeShoppingListGenerator::default();
        let list = generate_shopping_list(&db, &generator, &user, plan.meal_plan.id, Units::Metric)
            .await?
            .shopping_list;
        assert!(!is_out_of_sync(&db, list.id).await?);

        let first_ingredient = get_recipe_detail(&db, recipe.id).await?.ingredients[0].id;
        update_ingredient(&db, first_ingredient, "carrot".to_string(), "3 cups".to_string())
            .await?;
        assert!(is_out_of_sync(&db, list.id).await?);
        // Checking is read-only: the answer does not flip back on its own.
        assert!(is_out_of_sync(&db, list.id).await?);

        let refreshed = refresh_content_digest(&db, list.id).await?;
        assert_eq!(refreshed, recompute_content_digest(&db, list.id).await?);
        assert!(!is_out_of_sync(&db, list.id).await?);

        let entry = plan.groups[0].entries[0].entry.id;
        set_meal_plan_recipe_servings(&db, entry, 9).await?;
        assert!(is_out_of_sync(&db, list.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_moving_entries_keeps_list_in_sync() -> Result<()> {
        let (db, user, _recipe, plan) = setup_with_meal_plan().await?;
        let other = create_test_recipe(&db, &user, "Rice", 2, &[("rice", "1 cup")]).await?;
        add_recipe_to_group(&db, plan.groups[1].group.id, other.id, None).await?;

        let generator = FakeShoppingListGenerator::default();
        let list = generate_shopping_list(&db, &generator, &user, plan.meal_plan.id, Units::Metric)
            .await?
            .shopping_list;

        let entry = plan.groups[0].entries[0].entry.id;
        move_meal_plan_recipe(&db, entry, plan.groups[1].group.id, 2).await?;
        assert!(!is_out_of_sync(&db, list.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_plan_keeps_list_and_marks_it_stale() -> Result<()> {
        let (db, user, _recipe, plan) = setup_with_meal_plan().await?;
        let generator = FakeShoppingListGenerator::default();
        let list = generate_shopping_list(&db, &generator, &user, plan.meal_plan.id, Units::Metric)
            .await?
            .shopping_list;

        delete_meal_plan(&db, plan.meal_plan.id).await?;
        let detail = get_shopping_list_detail(&db, list.id).await?;
        assert_eq!(detail.shopping_list.meal_plan_id, None);
        assert!(!detail.items.is_empty());
        assert!(is_out_of_sync(&db, list.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_item_management_and_ordering() -> Result<()> {
        let (db, user, _recipe, plan) = setup_with_meal_plan().await?;
        let generator = FakeShoppingListGenerator::default();
        let list = generate_shopping_list(&db, &generator, &user, plan.meal_plan.id, Units::Metric)
            .await?
            .shopping_list;

        let bananas = add_shopping_item(&db, list.id, "bananas", "6", None).await?;
        assert_eq!(bananas.name, "Bananas");
        assert_eq!(bananas.category, ShoppingCategory::FruitVeg);
        let soap = add_shopping_item(&db, list.id, "soap", "1", Some(ShoppingCategory::NonFood))
            .await?;
        assert!(add_shopping_item(&db, list.id, "  ", "1", None).await.is_err());

        let detail = get_shopping_list_detail(&db, list.id).await?;
        assert_eq!(detail.items.first().map(|i| i.id), Some(bananas.id));
        assert_eq!(detail.items.last().map(|i| i.id), Some(soap.id));
        let groups = detail.by_category();
        assert_eq!(groups.first().map(|(c, _)| *c), Some(ShoppingCategory::FruitVeg));
        assert_eq!(groups.last().map(|(c, _)| *c), Some(ShoppingCategory::NonFood));

        let checked = toggle_shopping_item_checked(&db, bananas.id).await?;
        assert!(checked.is_checked);
        let unchecked = toggle_shopping_item_checked(&db, bananas.id).await?;
        assert!(!unchecked.is_checked);

        delete_shopping_item(&db, soap.id).await?;
        assert!(matches!(
            delete_shopping_item(&db, soap.id).await,
            Err(Error::ShoppingItemNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_management() -> Result<()> {
        let (db, user, _recipe, plan) = setup_with_meal_plan().await?;
        let generator = FakeShoppingListGenerator::default();
        let first = generate_shopping_list(&db, &generator, &user, plan.meal_plan.id, Units::Metric)
            .await?
            .shopping_list;
        let second = generate_shopping_list(&db, &generator, &user, plan.meal_plan.id, Units::Us)
            .await?
            .shopping_list;

        mark_shopping_list_viewed(&db, first.id).await?;
        assert_eq!(
            most_recent_shopping_list(&db, user.id).await?.map(|l| l.id),
            Some(first.id)
        );

        let renamed = rename_shopping_list(&db, second.id, "Weekend".to_string()).await?;
        assert_eq!(renamed.name, "Weekend");
        assert!(rename_shopping_list(&db, second.id, String::new()).await.is_err());

        delete_shopping_list(&db, first.id).await?;
        let remaining = list_shopping_lists(&db, user.id).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
        Ok(())
    }
}
