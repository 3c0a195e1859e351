//! Shopping list commands - generation, staleness checks and item upkeep.

use super::ingredient_line;
use crate::{
    cli::{CliContext, ListCommand},
    core::{
        digest::{is_out_of_sync, refresh_content_digest},
        shopping_list::{self, ShoppingListDetail},
    },
    errors::Result,
    generation::openai::OpenAiClient,
};
use std::fmt::Write;

const STALE_NOTICE: &str =
    "⚠️ The meal plan has changed since this list was made. Regenerate it or run `list refresh`.";

fn render_list(detail: &ShoppingListDetail, stale: bool) -> Result<String> {
    let mut out = String::new();
    writeln!(
        &mut out,
        "🛒 {} (#{})",
        detail.shopping_list.name, detail.shopping_list.id
    )?;
    if stale {
        writeln!(&mut out, "{STALE_NOTICE}")?;
    }
    if detail.items.is_empty() {
        writeln!(&mut out, "No items.")?;
    }
    for (category, items) in detail.by_category() {
        writeln!(&mut out, "\n{category}")?;
        for item in items {
            let mark = if item.is_checked { "x" } else { " " };
            writeln!(
                &mut out,
                "  [{mark}] {} [item #{}]",
                ingredient_line(&item.quantity, &item.name),
                item.id
            )?;
        }
    }
    Ok(out)
}

/// Runs a shopping list subcommand.
///
/// # Errors
/// Returns whatever error the underlying operation reports.
pub async fn run(ctx: &CliContext, command: ListCommand) -> Result<String> {
    let db = &ctx.database;
    match command {
        ListCommand::Generate { plan_id, units } => {
            let client = OpenAiClient::from_env(&ctx.settings.generator)?;
            let units = units.unwrap_or(ctx.user.preferred_units);
            let detail =
                shopping_list::generate_shopping_list(db, &client, &ctx.user, plan_id, units)
                    .await?;
            render_list(&detail, false)
        }
        ListCommand::Show { id } => {
            let id = match id {
                Some(id) => id,
                None => match shopping_list::most_recent_shopping_list(db, ctx.user.id).await? {
                    Some(list) => list.id,
                    None => return Ok("🛒 No shopping lists yet.".to_string()),
                },
            };
            shopping_list::mark_shopping_list_viewed(db, id).await?;
            let detail = shopping_list::get_shopping_list_detail(db, id).await?;
            let stale = is_out_of_sync(db, id).await?;
            render_list(&detail, stale)
        }
        ListCommand::Check { id } => {
            shopping_list::get_shopping_list_detail(db, id).await?;
            Ok(if is_out_of_sync(db, id).await? {
                STALE_NOTICE.to_string()
            } else {
                format!("✅ Shopping list #{id} is up to date")
            })
        }
        ListCommand::Refresh { id } => {
            refresh_content_digest(db, id).await?;
            Ok(format!("✅ Shopping list #{id} marked as up to date"))
        }
        ListCommand::AddItem {
            list_id,
            name,
            quantity,
            category,
        } => {
            let item =
                shopping_list::add_shopping_item(db, list_id, &name, &quantity, category).await?;
            Ok(format!(
                "✅ Added {} to {} [item #{}]",
                ingredient_line(&item.quantity, &item.name),
                item.category,
                item.id
            ))
        }
        ListCommand::Toggle { item_id } => {
            let item = shopping_list::toggle_shopping_item_checked(db, item_id).await?;
            let state = if item.is_checked { "checked" } else { "unchecked" };
            Ok(format!("{} {state}", item.name))
        }
        ListCommand::Delete { id } => {
            shopping_list::delete_shopping_list(db, id).await?;
            Ok(format!("🗑️ Deleted shopping list #{id}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::settings::Settings,
        core::{ingredient::update_ingredient, recipe::get_recipe_detail},
        entities::{ShoppingCategory, Units},
        errors::Error,
        test_utils::{FakeShoppingListGenerator, setup_with_meal_plan},
    };

    #[tokio::test]
    async fn test_show_flags_stale_list_until_refreshed() -> Result<()> {
        let (db, user, recipe, plan) = setup_with_meal_plan().await?;
        let generator = FakeShoppingListGenerator::default();
        let list = shopping_list::generate_shopping_list(
            &db,
            &generator,
            &user,
            plan.meal_plan.id,
            Units::Metric,
        )
        .await?
        .shopping_list;
        let ctx = CliContext::new(db, Settings::default(), user);

        let out = run(&ctx, ListCommand::Show { id: None }).await?;
        assert!(out.contains("Pantry"));
        assert!(out.contains("[ ] 2 cups carrots"));
        assert!(!out.contains(STALE_NOTICE));

        let first = get_recipe_detail(&ctx.database, recipe.id).await?.ingredients[0].id;
        update_ingredient(&ctx.database, first, "carrot".to_string(), "5 cups".to_string())
            .await?;
        let out = run(&ctx, ListCommand::Check { id: list.id }).await?;
        assert_eq!(out, STALE_NOTICE);

        run(&ctx, ListCommand::Refresh { id: list.id }).await?;
        let out = run(&ctx, ListCommand::Check { id: list.id }).await?;
        assert!(out.contains("up to date"));
        Ok(())
    }

    #[tokio::test]
    async fn test_item_commands() -> Result<()> {
        let (db, user, _recipe, plan) = setup_with_meal_plan().await?;
        let generator = FakeShoppingListGenerator::default();
        let list = shopping_list::generate_shopping_list(
            &db,
            &generator,
            &user,
            plan.meal_plan.id,
            Units::Metric,
        )
        .await?
        .shopping_list;
        let ctx = CliContext::new(db, Settings::default(), user);

        let out = run(
            &ctx,
            ListCommand::AddItem {
                list_id: list.id,
                name: "soap".to_string(),
                quantity: "1 bar".to_string(),
                category: Some(ShoppingCategory::NonFood),
            },
        )
        .await?;
        assert!(out.contains("1 bar Soap to Non-food"));

        let detail = shopping_list::get_shopping_list_detail(&ctx.database, list.id).await?;
        let soap = detail.items.iter().find(|i| i.name == "Soap").map(|i| i.id);
        let soap = soap.ok_or_else(|| Error::validation("soap missing"))?;
        let out = run(&ctx, ListCommand::Toggle { item_id: soap }).await?;
        assert_eq!(out, "Soap checked");

        run(&ctx, ListCommand::Delete { id: list.id }).await?;
        let out = run(&ctx, ListCommand::Show { id: None }).await?;
        assert_eq!(out, "🛒 No shopping lists yet.");
        Ok(())
    }
}
