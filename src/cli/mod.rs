//! Command-line layer - argument parsing and command dispatch
//!
//! This module provides the terminal interface for the meal planner: the
//! `clap` command tree, the shared context every command runs against, and
//! [`run`], which turns a parsed command into the text `main` prints.

/// Command implementations (scaling, recipes, meal plans, shopping lists)
pub mod commands;

use crate::{
    config::settings::Settings,
    core::templates::MealPlanTemplate,
    entities::{ShoppingCategory, Units, user},
    errors::Result,
};
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;

/// Shared data available to all commands.
/// This structure holds the database connection, the loaded settings and the
/// user every command acts on behalf of.
pub struct CliContext {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings loaded from `config.toml`
    pub settings: Settings,
    /// The resolved default identity
    pub user: user::Model,
}

impl CliContext {
    /// Creates a new `CliContext`.
    /// This is called once in `main` after the database is ready and the
    /// default identity has been resolved.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: Settings, user: user::Model) -> Self {
        Self {
            database,
            settings,
            user,
        }
    }
}

/// Plan meals, scale recipes and build shopping lists.
#[derive(Debug, Parser)]
#[command(name = "meal-planner", version)]
pub struct Cli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scale a single ingredient line between serving counts
    Scale {
        /// Quantity text, e.g. "1 1/2 cups"
        quantity: String,
        /// Ingredient name, e.g. "carrot"
        name: String,
        /// Servings the quantity is written for
        #[arg(long)]
        from: i32,
        /// Servings to scale to
        #[arg(long)]
        to: i32,
    },
    /// Manage recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),
    /// Manage meal plans
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Manage shopping lists
    #[command(subcommand)]
    List(ListCommand),
}

/// Recipe subcommands.
#[derive(Debug, Subcommand)]
pub enum RecipeCommand {
    /// List recipes visible to you
    List {
        /// Only recipes whose title contains this text
        #[arg(long)]
        search: Option<String>,
        /// Only your saved recipes
        #[arg(long)]
        saved: bool,
    },
    /// Show a recipe, optionally scaled
    Show {
        /// Recipe id
        id: i64,
        /// Preview the ingredients for this many servings
        #[arg(long)]
        servings: Option<i32>,
    },
    /// Generate a recipe from a dish idea
    Generate {
        /// Free-text description of the dish
        idea: String,
        /// Extra guidance for the generator
        #[arg(long, default_value = "")]
        notes: String,
        /// Servings (defaults to your preference)
        #[arg(long)]
        servings: Option<i32>,
        /// Measurement system (defaults to your preference)
        #[arg(long)]
        units: Option<Units>,
    },
    /// Import every recipe file in a directory as published recipes
    Import {
        /// Directory of recipe JSON files
        dir: PathBuf,
    },
    /// Write a recipe to a JSON file
    Export {
        /// Recipe id
        id: i64,
        /// Target directory
        dir: PathBuf,
    },
    /// Rewrite a recipe's quantities for a new serving count
    Scale {
        /// Recipe id
        id: i64,
        /// New servings
        servings: i32,
    },
    /// Make a draft recipe visible to everyone
    Publish {
        /// Recipe id
        id: i64,
    },
    /// Delete a recipe that no meal plan uses
    Delete {
        /// Recipe id
        id: i64,
    },
    /// Add or remove a recipe from your saved recipes
    Save {
        /// Recipe id
        id: i64,
    },
}

/// Meal plan subcommands.
#[derive(Debug, Subcommand)]
pub enum PlanCommand {
    /// Create a meal plan from a template
    Create {
        /// Plan name (defaults to today's date)
        #[arg(long)]
        name: Option<String>,
        /// One of: weekday, meal_type, blank
        #[arg(long, default_value = "weekday")]
        template: MealPlanTemplate,
    },
    /// List your meal plans, most recently viewed first
    List,
    /// Show a meal plan (defaults to the most recently viewed)
    Show {
        /// Meal plan id
        id: Option<i64>,
    },
    /// Append a group to a meal plan
    AddGroup {
        /// Meal plan id
        plan_id: i64,
        /// Group name
        name: String,
    },
    /// Add a recipe to a group
    AddRecipe {
        /// Meal group id
        group_id: i64,
        /// Recipe id
        recipe_id: i64,
        /// Servings (defaults to the recipe's)
        #[arg(long)]
        servings: Option<i32>,
    },
    /// Remove an entry from its plan
    RemoveRecipe {
        /// Meal plan entry id
        entry_id: i64,
    },
    /// Move an entry to a position in a group of the same plan
    MoveRecipe {
        /// Meal plan entry id
        entry_id: i64,
        /// Target meal group id
        group_id: i64,
        /// 1-based position in the target group
        position: i32,
    },
    /// Delete a meal plan
    Delete {
        /// Meal plan id
        id: i64,
    },
}

/// Shopping list subcommands.
#[derive(Debug, Subcommand)]
pub enum ListCommand {
    /// Generate a shopping list from a meal plan
    Generate {
        /// Meal plan id
        plan_id: i64,
        /// Measurement system (defaults to your preference)
        #[arg(long)]
        units: Option<Units>,
    },
    /// Show a shopping list (defaults to the most recently viewed)
    Show {
        /// Shopping list id
        id: Option<i64>,
    },
    /// Report whether a list still matches its meal plan
    Check {
        /// Shopping list id
        id: i64,
    },
    /// Mark a list as matching its meal plan's current contents
    Refresh {
        /// Shopping list id
        id: i64,
    },
    /// Add an item by hand
    AddItem {
        /// Shopping list id
        list_id: i64,
        /// Item name
        name: String,
        /// Quantity text
        #[arg(long, default_value = "")]
        quantity: String,
        /// Category key or label (defaults to fruit & vegetables)
        #[arg(long)]
        category: Option<ShoppingCategory>,
    },
    /// Check or uncheck an item
    Toggle {
        /// Shopping item id
        item_id: i64,
    },
    /// Delete a shopping list
    Delete {
        /// Shopping list id
        id: i64,
    },
}

/// Runs a parsed command and returns the text to print.
///
/// # Errors
/// Returns whatever error the underlying operation reports.
pub async fn run(ctx: &CliContext, command: Command) -> Result<String> {
    match command {
        Command::Scale {
            quantity,
            name,
            from,
            to,
        } => commands::general::scale(&quantity, &name, from, to),
        Command::Recipe(command) => commands::recipe::run(ctx, command).await,
        Command::Plan(command) => commands::meal_plan::run(ctx, command).await,
        Command::List(command) => commands::shopping_list::run(ctx, command).await,
    }
}
