//! User business logic - identity lookup and generation preferences.

use crate::{
    config::settings::PlannerSettings,
    entities::{
        MealPlan, MealPlanRecipe, Recipe, Units, User, meal_plan, meal_plan_recipe, recipe, user,
    },
    errors::{Error, Result},
};
use sea_orm::{QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Smallest servings value accepted anywhere servings are chosen by a person
pub const MIN_SERVINGS: i32 = 1;
/// Largest servings value accepted for preferences and generation requests
pub const MAX_SERVINGS: i32 = 12;

/// Rejects servings outside `MIN_SERVINGS..=MAX_SERVINGS`.
///
/// # Errors
/// Returns a validation error for out-of-range values.
pub fn validate_servings(servings: i32) -> Result<()> {
    if (MIN_SERVINGS..=MAX_SERVINGS).contains(&servings) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Servings must be between {MIN_SERVINGS} and {MAX_SERVINGS}, got {servings}"
        )))
    }
}

/// Finds a user by username.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the named user, creating it with the configured preferences when
/// it does not exist yet.
///
/// # Errors
/// Returns an error if the username is blank or a database operation fails.
pub async fn get_or_create_user(
    db: &DatabaseConnection,
    username: &str,
    defaults: &PlannerSettings,
) -> Result<user::Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::validation("Username cannot be empty"));
    }

    if let Some(existing) = get_user_by_username(db, username).await? {
        return Ok(existing);
    }

    let user = user::ActiveModel {
        username: Set(username.to_string()),
        dietary_preferences: Set(String::new()),
        default_servings: Set(defaults.default_servings.clamp(MIN_SERVINGS, MAX_SERVINGS)),
        preferred_units: Set(defaults.preferred_units),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let user = user.insert(db).await?;
    info!(user_id = user.id, username = %user.username, "created user");
    Ok(user)
}

/// Replaces a user's generation preferences.
///
/// # Errors
/// Returns an error if:
/// - `default_servings` is outside 1..=12
/// - The user does not exist
/// - The database update fails
pub async fn update_preferences(
    db: &DatabaseConnection,
    user_id: i64,
    dietary_preferences: String,
    default_servings: i32,
    preferred_units: Units,
) -> Result<user::Model> {
    validate_servings(default_servings)?;

    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            username: format!("#{user_id}"),
        })?;

    let mut active: user::ActiveModel = user.into();
    active.dietary_preferences = Set(dietary_preferences.trim().to_string());
    active.default_servings = Set(default_servings);
    active.preferred_units = Set(preferred_units);
    active.update(db).await.map_err(Into::into)
}

/// Deletes a user together with everything they own: meal plans, shopping
/// lists, saved recipes and the recipes they created.
///
/// Refuses the delete while another user's meal plan still uses one of the
/// user's recipes.
///
/// # Errors
/// Returns an error if:
/// - The user does not exist
/// - One of their recipes is in another user's meal plan
/// - A database operation fails
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let user = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            username: format!("#{user_id}"),
        })?;

    // Own plans go first so only foreign entries can still hold the recipes.
    MealPlan::delete_many()
        .filter(meal_plan::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    let recipe_ids: Vec<i64> = Recipe::find()
        .select_only()
        .column(recipe::Column::Id)
        .filter(recipe::Column::CreatedBy.eq(user_id))
        .into_tuple()
        .all(&txn)
        .await?;
    let in_use = MealPlanRecipe::find()
        .filter(meal_plan_recipe::Column::RecipeId.is_in(recipe_ids))
        .one(&txn)
        .await?;
    if let Some(entry) = in_use {
        let references = MealPlanRecipe::find()
            .filter(meal_plan_recipe::Column::RecipeId.eq(entry.recipe_id))
            .count(&txn)
            .await?;
        return Err(Error::RecipeInUse {
            id: entry.recipe_id,
            references,
        });
    }

    User::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;
    info!(user_id, username = %user.username, "deleted user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            meal_plan::{add_recipe_to_group, create_meal_plan},
            shopping_list::generate_shopping_list,
            templates::MealPlanTemplate,
        },
        entities::{Ingredient, ShoppingList},
        test_utils::{FakeShoppingListGenerator, setup_test_db, setup_with_meal_plan},
    };

    #[tokio::test]
    async fn test_get_or_create_user_creates_once() -> Result<()> {
        let db = setup_test_db().await?;
        let defaults = PlannerSettings::default();

        let first = get_or_create_user(&db, " alice ", &defaults).await?;
        assert_eq!(first.username, "alice");
        assert_eq!(first.default_servings, defaults.default_servings);
        assert_eq!(first.preferred_units, Units::Metric);

        let second = get_or_create_user(&db, "alice", &defaults).await?;
        assert_eq!(first.id, second.id);
        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_username_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = get_or_create_user(&db, "  ", &PlannerSettings::default()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_preferences() -> Result<()> {
        let db = setup_test_db().await?;
        let user = get_or_create_user(&db, "bob", &PlannerSettings::default()).await?;

        let updated =
            update_preferences(&db, user.id, " vegetarian ".to_string(), 6, Units::Us).await?;
        assert_eq!(updated.dietary_preferences, "vegetarian");
        assert_eq!(updated.default_servings, 6);
        assert_eq!(updated.preferred_units, Units::Us);

        let too_many = update_preferences(&db, user.id, String::new(), 13, Units::Us).await;
        assert!(matches!(too_many, Err(Error::Validation { .. })));
        let too_few = update_preferences(&db, user.id, String::new(), 0, Units::Us).await;
        assert!(matches!(too_few, Err(Error::Validation { .. })));

        let missing = update_preferences(&db, 999, String::new(), 2, Units::Metric).await;
        assert!(matches!(missing, Err(Error::UserNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_user_removes_owned_data() -> Result<()> {
        let (db, alice, recipe, plan) = setup_with_meal_plan().await?;
        generate_shopping_list(
            &db,
            &FakeShoppingListGenerator::default(),
            &alice,
            plan.meal_plan.id,
            Units::Metric,
        )
        .await?;

        let bob = get_or_create_user(&db, "bob", &PlannerSettings::default()).await?;
        let bobs_plan =
            create_meal_plan(&db, &bob, Some("Bob".to_string()), MealPlanTemplate::Weekday)
                .await?;
        add_recipe_to_group(&db, bobs_plan.groups[0].group.id, recipe.id, None).await?;

        let blocked = delete_user(&db, alice.id).await;
        assert!(matches!(
            blocked,
            Err(Error::RecipeInUse { id, references: 1 }) if id == recipe.id
        ));
        assert_eq!(MealPlan::find().count(&db).await?, 2);
        assert_eq!(ShoppingList::find().count(&db).await?, 1);

        crate::core::meal_plan::delete_meal_plan(&db, bobs_plan.meal_plan.id).await?;
        delete_user(&db, alice.id).await?;

        assert_eq!(User::find().count(&db).await?, 1);
        assert_eq!(Recipe::find().count(&db).await?, 0);
        assert_eq!(Ingredient::find().count(&db).await?, 0);
        assert_eq!(MealPlan::find().count(&db).await?, 0);
        assert_eq!(ShoppingList::find().count(&db).await?, 0);

        let missing = delete_user(&db, alice.id).await;
        assert!(matches!(missing, Err(Error::UserNotFound { .. })));
        Ok(())
    }
}
