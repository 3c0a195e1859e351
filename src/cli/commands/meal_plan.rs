//! Meal plan commands - plans, groups and the recipes placed in them.

use crate::{
    cli::{CliContext, PlanCommand},
    core::meal_plan::{self, MealPlanDetail},
    errors::Result,
};
use std::fmt::Write;

fn render_plan(detail: &MealPlanDetail) -> Result<String> {
    let mut out = String::new();
    writeln!(
        &mut out,
        "🗓️ {} (#{}, {} recipe(s))",
        detail.meal_plan.name,
        detail.meal_plan.id,
        detail.entry_count()
    )?;
    if detail.groups.is_empty() {
        writeln!(&mut out, "No groups yet. Add one with `plan add-group`.")?;
    }
    for group in &detail.groups {
        writeln!(&mut out, "\n{} [group #{}]", group.group.name, group.group.id)?;
        if group.entries.is_empty() {
            writeln!(&mut out, "  (empty)")?;
        }
        for entry in &group.entries {
            writeln!(
                &mut out,
                "  {}. {} - serves {} [entry #{}]",
                entry.entry.position, entry.recipe.title, entry.entry.servings, entry.entry.id
            )?;
        }
    }
    Ok(out)
}

/// Runs a meal plan subcommand.
///
/// # Errors
/// Returns whatever error the underlying operation reports.
pub async fn run(ctx: &CliContext, command: PlanCommand) -> Result<String> {
    let db = &ctx.database;
    match command {
        PlanCommand::Create { name, template } => {
            let detail = meal_plan::create_meal_plan(db, &ctx.user, name, template).await?;
            Ok(format!(
                "✅ Created meal plan '{}' (#{}) from the {} template\n\n{}",
                detail.meal_plan.name,
                detail.meal_plan.id,
                template.name(),
                render_plan(&detail)?
            ))
        }
        PlanCommand::List => {
            let plans = meal_plan::list_meal_plans(db, ctx.user.id).await?;
            if plans.is_empty() {
                return Ok("🗓️ No meal plans yet. Create one with `plan create`.".to_string());
            }
            let mut out = String::new();
            writeln!(&mut out, "🗓️ Meal plans ({}):", plans.len())?;
            for plan in &plans {
                let count = meal_plan::count_plan_recipes(db, plan.id).await?;
                writeln!(&mut out, "• #{} {} ({count} recipe(s))", plan.id, plan.name)?;
            }
            Ok(out)
        }
        PlanCommand::Show { id } => {
            let id = match id {
                Some(id) => id,
                None => match meal_plan::most_recent_meal_plan(db, ctx.user.id).await? {
                    Some(plan) => plan.id,
                    None => return Ok("🗓️ No meal plans yet.".to_string()),
                },
            };
            meal_plan::mark_meal_plan_viewed(db, id).await?;
            let detail = meal_plan::get_meal_plan_detail(db, id).await?;
            render_plan(&detail)
        }
        PlanCommand::AddGroup { plan_id, name } => {
            let group = meal_plan::add_meal_group(db, plan_id, name).await?;
            Ok(format!(
                "✅ Added group '{}' (#{}) at position {}",
                group.name, group.id, group.position
            ))
        }
        PlanCommand::AddRecipe {
            group_id,
            recipe_id,
            servings,
        } => {
            let entry = meal_plan::add_recipe_to_group(db, group_id, recipe_id, servings).await?;
            Ok(format!(
                "✅ Added recipe #{recipe_id} to group #{group_id} as entry #{} (serves {})",
                entry.id, entry.servings
            ))
        }
        PlanCommand::RemoveRecipe { entry_id } => {
            let remaining = meal_plan::remove_meal_plan_recipe(db, entry_id).await?;
            Ok(format!(
                "🗑️ Removed entry #{entry_id}; the plan now has {remaining} recipe(s)"
            ))
        }
        PlanCommand::MoveRecipe {
            entry_id,
            group_id,
            position,
        } => {
            let entry = meal_plan::move_meal_plan_recipe(db, entry_id, group_id, position).await?;
            Ok(format!(
                "↕️ Moved entry #{entry_id} to group #{} position {}",
                entry.meal_group_id, entry.position
            ))
        }
        PlanCommand::Delete { id } => {
            meal_plan::delete_meal_plan(db, id).await?;
            Ok(format!("🗑️ Deleted meal plan #{id}"))
        }
    }
}
