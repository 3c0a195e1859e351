//! Recipe commands - browsing, generation, import/export and upkeep.

use super::ingredient_line;
use crate::{
    cli::{CliContext, RecipeCommand},
    core::recipe::{self, RecipeDetail},
    entities::{RecipeStatus, Units, recipe as recipe_entity},
    errors::Result,
    generation::{
        files::write_recipe_file,
        openai::OpenAiClient,
        recipe::RecipeRequest,
    },
};
use std::{fmt::Write, path::Path};
use tracing::info;

const fn status_label(status: RecipeStatus) -> &'static str {
    match status {
        RecipeStatus::Draft => "draft",
        RecipeStatus::Published => "published",
    }
}

fn render_list(heading: &str, recipes: &[recipe_entity::Model]) -> Result<String> {
    if recipes.is_empty() {
        return Ok(format!("📖 {heading}: none found."));
    }
    let mut out = String::new();
    writeln!(&mut out, "📖 {heading} ({}):", recipes.len())?;
    for r in recipes {
        writeln!(
            &mut out,
            "• #{} {} (serves {}, {})",
            r.id,
            r.title,
            r.servings,
            status_label(r.status)
        )?;
    }
    Ok(out)
}

fn render_detail(detail: &RecipeDetail, servings: Option<i32>) -> Result<String> {
    let r = &detail.recipe;
    let mut out = String::new();
    writeln!(&mut out, "📖 {} (#{}, {})", r.title, r.id, status_label(r.status))?;
    if !r.description.is_empty() {
        writeln!(&mut out, "{}", r.description)?;
    }

    match servings {
        Some(servings) if servings != r.servings => {
            writeln!(&mut out, "\nIngredients (scaled from {} to {servings} servings):", r.servings)?;
            for line in recipe::scaled_ingredients(detail, servings) {
                writeln!(&mut out, "• {}", ingredient_line(&line.quantity, &line.name))?;
            }
        }
        _ => {
            writeln!(&mut out, "\nIngredients (serves {}):", r.servings)?;
            for i in &detail.ingredients {
                writeln!(&mut out, "• {}", ingredient_line(&i.quantity, &i.name))?;
            }
        }
    }

    for section in &detail.sections {
        writeln!(&mut out, "\n{}:", section.section.title)?;
        for step in &section.steps {
            writeln!(&mut out, "  {}. {}", step.position, step.text)?;
        }
    }
    Ok(out)
}

/// Runs a recipe subcommand.
///
/// # Errors
/// Returns whatever error the underlying operation reports.
pub async fn run(ctx: &CliContext, command: RecipeCommand) -> Result<String> {
    let db = &ctx.database;
    match command {
        RecipeCommand::List { search, saved } => {
            if saved {
                let recipes = recipe::list_saved_recipes(db, ctx.user.id).await?;
                render_list("Saved recipes", &recipes)
            } else if let Some(query) = search {
                let recipes = recipe::search_recipes(db, ctx.user.id, &query).await?;
                render_list(&format!("Recipes matching '{query}'"), &recipes)
            } else {
                let recipes = recipe::list_visible_recipes(db, ctx.user.id).await?;
                render_list("Recipes", &recipes)
            }
        }
        RecipeCommand::Show { id, servings } => {
            let detail = recipe::get_recipe_detail(db, id).await?;
            render_detail(&detail, servings)
        }
        RecipeCommand::Generate {
            idea,
            notes,
            servings,
            units,
        } => generate(ctx, idea, notes, servings, units).await,
        RecipeCommand::Import { dir } => import(ctx, &dir).await,
        RecipeCommand::Export { id, dir } => {
            let detail = recipe::get_recipe_detail(db, id).await?;
            let path = write_recipe_file(&dir, &detail.to_draft())?;
            Ok(format!("💾 Wrote '{}' to {}", detail.recipe.title, path.display()))
        }
        RecipeCommand::Scale { id, servings } => {
            let scaled = recipe::scale_and_save(db, id, servings).await?;
            let detail = recipe::get_recipe_detail(db, scaled.id).await?;
            render_detail(&detail, None)
        }
        RecipeCommand::Publish { id } => {
            let published = recipe::set_recipe_status(db, id, RecipeStatus::Published).await?;
            Ok(format!("✅ Published '{}'", published.title))
        }
        RecipeCommand::Delete { id } => {
            let title = recipe::get_recipe_detail(db, id).await?.recipe.title;
            recipe::delete_recipe(db, id).await?;
            Ok(format!("🗑️ Deleted recipe '{title}'"))
        }
        RecipeCommand::Save { id } => {
            let saved = recipe::toggle_saved_recipe(db, ctx.user.id, id).await?;
            Ok(if saved {
                format!("⭐ Saved recipe #{id}")
            } else {
                format!("Removed recipe #{id} from your saved recipes")
            })
        }
    }
}

async fn generate(
    ctx: &CliContext,
    idea: String,
    notes: String,
    servings: Option<i32>,
    units: Option<Units>,
) -> Result<String> {
    let request = RecipeRequest {
        dish_idea: idea,
        notes,
        dietary_preferences: ctx.user.dietary_preferences.clone(),
        servings: servings.unwrap_or(ctx.user.default_servings),
        units: units.unwrap_or(ctx.user.preferred_units),
    };
    // Fail on bad input before asking for an API key.
    request.validate()?;

    let client = OpenAiClient::from_env(&ctx.settings.generator)?;
    let created = recipe::generate_recipe(&ctx.database, &client, &ctx.user, &request).await?;
    let detail = recipe::get_recipe_detail(&ctx.database, created.id).await?;
    render_detail(&detail, None)
}

async fn import(ctx: &CliContext, dir: &Path) -> Result<String> {
    let summary = recipe::import_recipe_directory(&ctx.database, &ctx.user, dir).await?;
    info!(
        imported = summary.imported.len(),
        skipped = summary.skipped.len(),
        "recipe import finished"
    );

    let mut out = String::new();
    writeln!(
        &mut out,
        "📥 Imported {} recipe(s) from {}",
        summary.imported.len(),
        dir.display()
    )?;
    for r in &summary.imported {
        writeln!(&mut out, "• #{} {}", r.id, r.title)?;
    }
    if !summary.skipped.is_empty() {
        writeln!(&mut out, "Skipped (already exist): {}", summary.skipped.join(", "))?;
    }
    Ok(out)
}
