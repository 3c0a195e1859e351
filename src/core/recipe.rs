//! Recipe business logic - creation, lookup, scaling and deletion.
//!
//! Recipes are written together with their ingredients and instructions in a
//! single transaction. Any change to servings or ingredients recomputes the
//! ingredients digest once, before the transaction commits.

use super::{
    digest::{compute_ingredients_digest, recompute_ingredients_digest},
    ordering::position_at,
    scaling::scale_quantity,
};
use crate::{
    entities::{
        Ingredient, InstructionSection, InstructionStep, MealPlanRecipe, Recipe, RecipeStatus,
        SavedRecipe, ingredient, instruction_section, instruction_step, meal_plan_recipe, recipe,
        saved_recipe, user,
    },
    errors::{Error, Result},
    generation::{
        RecipeGenerator,
        files::load_recipe_directory,
        recipe::{DraftIngredient, DraftSection, DraftStep, RecipeDraft, RecipeRequest},
    },
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::{collections::HashMap, path::Path};
use tracing::{info, instrument, warn};

/// An instruction section with its steps in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDetail {
    /// The section row
    pub section: instruction_section::Model,
    /// Steps ordered by position
    pub steps: Vec<instruction_step::Model>,
}

/// A recipe with everything hanging off it, all in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    /// The recipe row
    pub recipe: recipe::Model,
    /// Ingredients ordered by position
    pub ingredients: Vec<ingredient::Model>,
    /// Instruction sections ordered by position
    pub sections: Vec<SectionDetail>,
}

impl RecipeDetail {
    /// Converts the stored recipe back into the exchange format.
    #[must_use]
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            title: self.recipe.title.clone(),
            description: self.recipe.description.clone(),
            servings: self.recipe.servings,
            ingredients: self
                .ingredients
                .iter()
                .map(|i| DraftIngredient {
                    name: i.name.clone(),
                    quantity: i.quantity.clone(),
                })
                .collect(),
            instructions: self
                .sections
                .iter()
                .map(|s| DraftSection {
                    section_title: s.section.title.clone(),
                    steps: s
                        .steps
                        .iter()
                        .map(|step| DraftStep {
                            text: step.text.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// An ingredient line scaled for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledIngredient {
    /// Name, pluralised when the scaled amount calls for it
    pub name: String,
    /// Scaled quantity text
    pub quantity: String,
}

/// Result of importing a directory of recipe files.
#[derive(Debug, Default)]
pub struct ImportSummary {
    /// Recipes created
    pub imported: Vec<recipe::Model>,
    /// Titles skipped because a recipe with that title already exists
    pub skipped: Vec<String>,
}

pub(crate) async fn require_recipe<C>(db: &C, recipe_id: i64) -> Result<recipe::Model>
where
    C: ConnectionTrait,
{
    Recipe::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or(Error::RecipeNotFound { id: recipe_id })
}

/// Bumps a recipe's `updated_at`.
pub(crate) async fn touch_recipe<C>(db: &C, recipe_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Recipe::update_many()
        .col_expr(recipe::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(recipe::Column::Id.eq(recipe_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Creates a recipe with its ingredients and instructions.
///
/// # Errors
/// Returns an error if:
/// - The draft fails validation
/// - Any insert fails (the whole recipe is rolled back)
#[instrument(skip(db, owner, draft), fields(owner = owner.id, title = %draft.title))]
pub async fn create_recipe(
    db: &DatabaseConnection,
    owner: &user::Model,
    draft: &RecipeDraft,
    status: RecipeStatus,
) -> Result<recipe::Model> {
    draft.validate()?;

    let now = chrono::Utc::now();
    let digest = compute_ingredients_digest(
        draft.servings,
        draft
            .ingredients
            .iter()
            .map(|i| (i.name.trim(), i.quantity.trim())),
    );

    let txn = db.begin().await?;

    let recipe = recipe::ActiveModel {
        title: Set(draft.title.trim().to_string()),
        servings: Set(draft.servings),
        description: Set(draft.description.trim().to_string()),
        status: Set(status),
        created_by: Set(owner.id),
        image: Set(None),
        ingredients_digest: Set(digest),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (index, item) in draft.ingredients.iter().enumerate() {
        ingredient::ActiveModel {
            recipe_id: Set(recipe.id),
            name: Set(item.name.trim().to_string()),
            quantity: Set(item.quantity.trim().to_string()),
            position: Set(position_at(index)?),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for (index, section) in draft.instructions.iter().enumerate() {
        let section_row = instruction_section::ActiveModel {
            recipe_id: Set(recipe.id),
            title: Set(section.section_title.trim().to_string()),
            position: Set(position_at(index)?),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (step_index, step) in section.steps.iter().enumerate() {
            instruction_step::ActiveModel {
                section_id: Set(section_row.id),
                text: Set(step.text.trim().to_string()),
                position: Set(position_at(step_index)?),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    info!(recipe_id = recipe.id, "created recipe");
    Ok(recipe)
}

/// Retrieves a recipe by ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_recipe_by_id(
    db: &DatabaseConnection,
    recipe_id: i64,
) -> Result<Option<recipe::Model>> {
    Recipe::find_by_id(recipe_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub(crate) async fn load_ingredients<C>(db: &C, recipe_id: i64) -> Result<Vec<ingredient::Model>>
where
    C: ConnectionTrait,
{
    Ingredient::find()
        .filter(ingredient::Column::RecipeId.eq(recipe_id))
        .order_by_asc(ingredient::Column::Position)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads a recipe with its ingredients and instructions.
///
/// # Errors
/// Returns an error if the recipe does not exist or a query fails.
pub async fn get_recipe_detail(db: &DatabaseConnection, recipe_id: i64) -> Result<RecipeDetail> {
    let recipe = require_recipe(db, recipe_id).await?;
    let ingredients = load_ingredients(db, recipe_id).await?;

    let section_rows = InstructionSection::find()
        .filter(instruction_section::Column::RecipeId.eq(recipe_id))
        .order_by_asc(instruction_section::Column::Position)
        .all(db)
        .await?;

    let steps = InstructionStep::find()
        .filter(instruction_step::Column::SectionId.is_in(section_rows.iter().map(|s| s.id)))
        .order_by_asc(instruction_step::Column::Position)
        .all(db)
        .await?;

    let mut steps_by_section: HashMap<i64, Vec<instruction_step::Model>> = HashMap::new();
    for step in steps {
        steps_by_section.entry(step.section_id).or_default().push(step);
    }

    let sections = section_rows
        .into_iter()
        .map(|section| {
            let steps = steps_by_section.remove(&section.id).unwrap_or_default();
            SectionDetail { section, steps }
        })
        .collect();

    Ok(RecipeDetail {
        recipe,
        ingredients,
        sections,
    })
}

fn visible_to(user_id: i64) -> Condition {
    Condition::any()
        .add(recipe::Column::Status.eq(RecipeStatus::Published))
        .add(
            Condition::all()
                .add(recipe::Column::Status.eq(RecipeStatus::Draft))
                .add(recipe::Column::CreatedBy.eq(user_id)),
        )
}

/// Published recipes plus the user's own drafts, most recently modified first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_visible_recipes(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<recipe::Model>> {
    Recipe::find()
        .filter(visible_to(user_id))
        .order_by_desc(recipe::Column::UpdatedAt)
        .order_by_asc(recipe::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Visible recipes whose title contains `query`, ignoring ASCII case.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn search_recipes(
    db: &DatabaseConnection,
    user_id: i64,
    query: &str,
) -> Result<Vec<recipe::Model>> {
    let query = query.trim();
    if query.is_empty() {
        return list_visible_recipes(db, user_id).await;
    }
    Recipe::find()
        .filter(visible_to(user_id))
        .filter(recipe::Column::Title.contains(query))
        .order_by_asc(recipe::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a recipe by its exact title.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn find_recipe_by_title(
    db: &DatabaseConnection,
    title: &str,
) -> Result<Option<recipe::Model>> {
    Recipe::find()
        .filter(recipe::Column::Title.eq(title.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Changes a recipe's title and description.
///
/// # Errors
/// Returns an error if the title is blank, the recipe does not exist or the
/// update fails.
pub async fn update_recipe_details(
    db: &DatabaseConnection,
    recipe_id: i64,
    title: String,
    description: String,
) -> Result<recipe::Model> {
    if title.trim().is_empty() {
        return Err(Error::validation("Recipe title cannot be empty"));
    }
    let recipe = require_recipe(db, recipe_id).await?;
    let mut active: recipe::ActiveModel = recipe.into();
    active.title = Set(title.trim().to_string());
    active.description = Set(description.trim().to_string());
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Publishes or unpublishes a recipe.
///
/// # Errors
/// Returns an error if the recipe does not exist or the update fails.
pub async fn set_recipe_status(
    db: &DatabaseConnection,
    recipe_id: i64,
    status: RecipeStatus,
) -> Result<recipe::Model> {
    let recipe = require_recipe(db, recipe_id).await?;
    let mut active: recipe::ActiveModel = recipe.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Sets or clears the image key of a recipe.
///
/// # Errors
/// Returns an error if the recipe does not exist or the update fails.
pub async fn set_recipe_image(
    db: &DatabaseConnection,
    recipe_id: i64,
    image: Option<String>,
) -> Result<recipe::Model> {
    let recipe = require_recipe(db, recipe_id).await?;
    let mut active: recipe::ActiveModel = recipe.into();
    active.image = Set(image.filter(|key| !key.trim().is_empty()));
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Scales ingredient lines from `original_servings` to `new_servings`.
pub(crate) fn scale_lines(
    ingredients: &[ingredient::Model],
    original_servings: i32,
    new_servings: i32,
) -> Vec<ScaledIngredient> {
    ingredients
        .iter()
        .map(|i| {
            let (quantity, name) =
                scale_quantity(&i.quantity, &i.name, original_servings, new_servings);
            ScaledIngredient { name, quantity }
        })
        .collect()
}

/// Previews a recipe's ingredients at another serving count. Nothing is stored.
#[must_use]
pub fn scaled_ingredients(detail: &RecipeDetail, new_servings: i32) -> Vec<ScaledIngredient> {
    scale_lines(&detail.ingredients, detail.recipe.servings, new_servings)
}

/// Permanently rescales a recipe: every ingredient quantity and the servings
/// are rewritten, then the digest is recomputed once.
///
/// # Errors
/// Returns an error if `new_servings` is below 1, the recipe does not exist or
/// any update fails (nothing is stored in that case).
#[instrument(skip(db))]
pub async fn scale_and_save(
    db: &DatabaseConnection,
    recipe_id: i64,
    new_servings: i32,
) -> Result<recipe::Model> {
    if new_servings < 1 {
        return Err(Error::validation(format!(
            "Servings must be at least 1, got {new_servings}"
        )));
    }

    let txn = db.begin().await?;
    let recipe = require_recipe(&txn, recipe_id).await?;
    if recipe.servings == new_servings {
        txn.commit().await?;
        return Ok(recipe);
    }

    let now = chrono::Utc::now();
    let old_servings = recipe.servings;
    for item in load_ingredients(&txn, recipe_id).await? {
        let (quantity, _) = scale_quantity(&item.quantity, &item.name, old_servings, new_servings);
        if quantity == item.quantity {
            continue;
        }
        let mut active: ingredient::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(now);
        active.update(&txn).await?;
    }

    let mut active: recipe::ActiveModel = recipe.into();
    active.servings = Set(new_servings);
    active.updated_at = Set(now);
    active.update(&txn).await?;

    recompute_ingredients_digest(&txn, recipe_id).await?;
    let recipe = require_recipe(&txn, recipe_id).await?;
    txn.commit().await?;

    info!(recipe_id, old_servings, new_servings, "recipe rescaled");
    Ok(recipe)
}

/// Deletes a recipe with its ingredients and instructions.
///
/// # Errors
/// Returns [`Error::RecipeInUse`] if any meal plan entry references the
/// recipe, or an error if it does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_recipe(db: &DatabaseConnection, recipe_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    require_recipe(&txn, recipe_id).await?;

    let references = MealPlanRecipe::find()
        .filter(meal_plan_recipe::Column::RecipeId.eq(recipe_id))
        .count(&txn)
        .await?;
    if references > 0 {
        return Err(Error::RecipeInUse {
            id: recipe_id,
            references,
        });
    }

    Recipe::delete_by_id(recipe_id).exec(&txn).await?;
    txn.commit().await?;
    info!(recipe_id, "deleted recipe");
    Ok(())
}

/// Adds the recipe to the user's saved recipes, or removes it if present.
/// Returns whether the recipe is saved afterwards.
///
/// # Errors
/// Returns an error if the recipe does not exist or a query fails.
pub async fn toggle_saved_recipe(
    db: &DatabaseConnection,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool> {
    require_recipe(db, recipe_id).await?;

    let existing = SavedRecipe::find()
        .filter(saved_recipe::Column::UserId.eq(user_id))
        .filter(saved_recipe::Column::RecipeId.eq(recipe_id))
        .one(db)
        .await?;

    if let Some(saved) = existing {
        SavedRecipe::delete_by_id(saved.id).exec(db).await?;
        return Ok(false);
    }

    saved_recipe::ActiveModel {
        user_id: Set(user_id),
        recipe_id: Set(recipe_id),
        saved_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(true)
}

/// The user's saved recipes, most recently saved first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_saved_recipes(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<recipe::Model>> {
    let saved = SavedRecipe::find()
        .filter(saved_recipe::Column::UserId.eq(user_id))
        .order_by_desc(saved_recipe::Column::SavedAt)
        .order_by_desc(saved_recipe::Column::Id)
        .find_also_related(Recipe)
        .all(db)
        .await?;
    Ok(saved.into_iter().filter_map(|(_, recipe)| recipe).collect())
}

/// Generates a recipe and stores it as a draft saved by its owner.
///
/// # Errors
/// Returns an error if the request or the generated draft is invalid, the
/// generator fails, or the recipe cannot be stored.
#[instrument(skip(db, generator, owner), fields(owner = owner.id))]
pub async fn generate_recipe<G>(
    db: &DatabaseConnection,
    generator: &G,
    owner: &user::Model,
    request: &RecipeRequest,
) -> Result<recipe::Model>
where
    G: RecipeGenerator,
{
    request.validate()?;
    let draft = generator.generate_recipe(request).await?;
    let recipe = create_recipe(db, owner, &draft, RecipeStatus::Draft).await?;
    toggle_saved_recipe(db, owner.id, recipe.id).await?;
    Ok(recipe)
}

/// Imports every valid recipe file in `dir` as a published recipe. Titles that
/// already exist are skipped.
///
/// # Errors
/// Returns an error if the directory cannot be read or a recipe cannot be
/// stored.
pub async fn import_recipe_directory(
    db: &DatabaseConnection,
    owner: &user::Model,
    dir: &Path,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for (path, draft) in load_recipe_directory(dir)? {
        if find_recipe_by_title(db, &draft.title).await?.is_some() {
            warn!(path = %path.display(), title = %draft.title, "recipe already exists");
            summary.skipped.push(draft.title);
            continue;
        }
        let recipe = create_recipe(db, owner, &draft, RecipeStatus::Published).await?;
        summary.imported.push(recipe);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{digest::ingredients_digest, meal_plan, templates::MealPlanTemplate},
        generation::files::write_recipe_file,
        test_utils::{
            FakeRecipeGenerator, create_test_recipe, create_test_user, sample_draft,
            setup_test_db,
        },
    };
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_recipe_with_content() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let draft = sample_draft("Carrot Soup", 2, &[("carrot", "2 cups"), ("onion", "1")]);

        let recipe = create_recipe(&db, &owner, &draft, RecipeStatus::Published).await?;
        let detail = get_recipe_detail(&db, recipe.id).await?;

        assert_eq!(detail.recipe.title, "Carrot Soup");
        assert_eq!(detail.ingredients.len(), 2);
        assert_eq!(detail.ingredients[0].position, 1);
        assert_eq!(detail.ingredients[1].position, 2);
        assert_eq!(detail.sections.len(), 1);
        assert_eq!(detail.sections[0].steps.len(), 2);
        assert_eq!(detail.sections[0].steps[1].position, 2);
        assert_eq!(
            recipe.ingredients_digest,
            ingredients_digest(2, &detail.ingredients)
        );
        assert_eq!(detail.to_draft(), draft);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_draft_stores_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let draft = sample_draft("Empty", 2, &[]);

        let result = create_recipe(&db, &owner, &draft, RecipeStatus::Published).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(Recipe::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_visibility_and_search() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;

        create_test_recipe(&db, &alice, "Lemon Tart", 4, &[("lemon", "3")]).await?;
        create_recipe(
            &db,
            &alice,
            &sample_draft("Secret Lemonade", 2, &[("lemon", "2")]),
            RecipeStatus::Draft,
        )
        .await?;

        assert_eq!(list_visible_recipes(&db, alice.id).await?.len(), 2);
        assert_eq!(list_visible_recipes(&db, bob.id).await?.len(), 1);

        let found = search_recipes(&db, alice.id, "lemon").await?;
        assert_eq!(found.len(), 2);
        let found = search_recipes(&db, bob.id, "LEMON").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Lemon Tart");

        assert!(find_recipe_by_title(&db, "Lemon Tart").await?.is_some());
        assert!(find_recipe_by_title(&db, "Lime Tart").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_details_status_and_image() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let recipe = create_test_recipe(&db, &owner, "Stew", 4, &[("beef", "500 g")]).await?;

        let updated =
            update_recipe_details(&db, recipe.id, " Beef Stew ".to_string(), "Rich".to_string())
                .await?;
        assert_eq!(updated.title, "Beef Stew");
        assert_eq!(updated.ingredients_digest, recipe.ingredients_digest);

        let blank = update_recipe_details(&db, recipe.id, " ".to_string(), String::new()).await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        let draft = set_recipe_status(&db, recipe.id, RecipeStatus::Draft).await?;
        assert_eq!(draft.status, RecipeStatus::Draft);

        let with_image = set_recipe_image(&db, recipe.id, Some("stew.png".to_string())).await?;
        assert_eq!(with_image.image.as_deref(), Some("stew.png"));
        let cleared = set_recipe_image(&db, recipe.id, None).await?;
        assert_eq!(cleared.image, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_scaled_preview_does_not_store() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let recipe =
            create_test_recipe(&db, &owner, "Soup", 2, &[("carrot", "2 cups"), ("onion", "1 cup")])
                .await?;
        let detail = get_recipe_detail(&db, recipe.id).await?;

        let scaled = scaled_ingredients(&detail, 4);
        assert_eq!(
            scaled[0],
            ScaledIngredient {
                name: "carrots".to_string(),
                quantity: "4 cups".to_string()
            }
        );
        assert_eq!(scaled[1].quantity, "2 cups");

        let reloaded = get_recipe_detail(&db, recipe.id).await?;
        assert_eq!(reloaded, detail);
        Ok(())
    }

    #[tokio::test]
    async fn test_scale_and_save() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let recipe =
            create_test_recipe(&db, &owner, "Soup", 2, &[("carrot", "2 cups"), ("salt", "")])
                .await?;

        let scaled = scale_and_save(&db, recipe.id, 4).await?;
        assert_eq!(scaled.servings, 4);
        assert_ne!(scaled.ingredients_digest, recipe.ingredients_digest);

        let detail = get_recipe_detail(&db, recipe.id).await?;
        assert_eq!(detail.ingredients[0].quantity, "4 cups");
        // Names are not rewritten, only quantities.
        assert_eq!(detail.ingredients[0].name, "carrot");
        assert_eq!(detail.ingredients[1].quantity, "");
        assert_eq!(
            scaled.ingredients_digest,
            ingredients_digest(4, &detail.ingredients)
        );

        let same = scale_and_save(&db, recipe.id, 4).await?;
        assert_eq!(same.ingredients_digest, scaled.ingredients_digest);

        assert!(matches!(
            scale_and_save(&db, recipe.id, 0).await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            scale_and_save(&db, 999, 2).await,
            Err(Error::RecipeNotFound { id: 999 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_recipe_in_use_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let recipe = create_test_recipe(&db, &owner, "Curry", 4, &[("rice", "2 cups")]).await?;
        let plan =
            meal_plan::create_meal_plan(&db, &owner, None, MealPlanTemplate::Weekday).await?;
        let entry =
            meal_plan::add_recipe_to_group(&db, plan.groups[0].group.id, recipe.id, None).await?;

        let result = delete_recipe(&db, recipe.id).await;
        assert!(matches!(
            result,
            Err(Error::RecipeInUse {
                references: 1,
                ..
            })
        ));
        assert!(get_recipe_by_id(&db, recipe.id).await?.is_some());

        // The foreign key refuses a delete that skips the reference check.
        let raw = Recipe::delete_by_id(recipe.id).exec(&db).await;
        assert!(matches!(
            raw.map_err(Error::from),
            Err(Error::Integrity { .. })
        ));
        assert!(get_recipe_by_id(&db, recipe.id).await?.is_some());

        meal_plan::remove_meal_plan_recipe(&db, entry.id).await?;
        delete_recipe(&db, recipe.id).await?;
        assert!(get_recipe_by_id(&db, recipe.id).await?.is_none());
        assert_eq!(Ingredient::find().count(&db).await?, 0);
        assert_eq!(InstructionStep::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_saved_recipe() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let recipe = create_test_recipe(&db, &owner, "Salad", 1, &[("lettuce", "1")]).await?;

        assert!(toggle_saved_recipe(&db, owner.id, recipe.id).await?);
        let saved = list_saved_recipes(&db, owner.id).await?;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, recipe.id);

        assert!(!toggle_saved_recipe(&db, owner.id, recipe.id).await?);
        assert!(list_saved_recipes(&db, owner.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_recipe_stores_saved_draft() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        let generator = FakeRecipeGenerator::default();
        let request = RecipeRequest {
            dish_idea: "tomato soup".to_string(),
            notes: String::new(),
            dietary_preferences: String::new(),
            servings: 3,
            units: owner.preferred_units,
        };

        let recipe = generate_recipe(&db, &generator, &owner, &request).await?;
        assert_eq!(recipe.status, RecipeStatus::Draft);
        assert_eq!(recipe.servings, 3);
        assert_eq!(list_saved_recipes(&db, owner.id).await?.len(), 1);

        let invalid = RecipeRequest {
            servings: 20,
            ..request
        };
        let result = generate_recipe(&db, &generator, &owner, &invalid).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_import_recipe_directory_skips_existing() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "cook").await?;
        create_test_recipe(&db, &owner, "Pesto", 2, &[("basil", "1 bunch")]).await?;

        let tmp = TempDir::new().unwrap();
        write_recipe_file(tmp.path(), &sample_draft("Pesto", 2, &[("basil", "1 bunch")]))?;
        write_recipe_file(tmp.path(), &sample_draft("Risotto", 4, &[("rice", "300 g")]))?;

        let summary = import_recipe_directory(&db, &owner, tmp.path()).await?;
        assert_eq!(summary.imported.len(), 1);
        assert_eq!(summary.imported[0].title, "Risotto");
        assert_eq!(summary.imported[0].status, RecipeStatus::Published);
        assert_eq!(summary.skipped, vec!["Pesto".to_string()]);
        Ok(())
    }
}
