//! Unified error types for the meal planner.
//!
//! Every fallible operation in the crate returns [`Result`]. Database errors are
//! classified on conversion so that constraint violations surface as
//! [`Error::Integrity`] rather than as opaque driver failures.

use sea_orm::{DbErr, RuntimeErr, SqlErr, sqlx};
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file or environment could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any database failure that is not a constraint violation
    #[error("Database error: {0}")]
    Database(DbErr),

    /// A foreign-key or uniqueness constraint rejected the write
    #[error("Integrity error: {message}")]
    Integrity {
        /// Constraint message reported by the database
        message: String,
    },

    /// Input or collaborator output did not have the expected shape
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the data
        message: String,
    },

    /// No user with the given username
    #[error("User not found: {username}")]
    UserNotFound {
        /// Username that was looked up
        username: String,
    },

    /// No recipe with the given id
    #[error("Recipe not found: {id}")]
    RecipeNotFound {
        /// Recipe id
        id: i64,
    },

    /// No ingredient with the given id
    #[error("Ingredient not found: {id}")]
    IngredientNotFound {
        /// Ingredient id
        id: i64,
    },

    /// No instruction section or step with the given id
    #[error("Instruction not found: {id}")]
    InstructionNotFound {
        /// Section or step id
        id: i64,
    },

    /// No meal plan with the given id
    #[error("Meal plan not found: {id}")]
    MealPlanNotFound {
        /// Meal plan id
        id: i64,
    },

    /// No meal group with the given id
    #[error("Meal group not found: {id}")]
    MealGroupNotFound {
        /// Meal group id
        id: i64,
    },

    /// No meal plan entry with the given id
    #[error("Meal plan recipe not found: {id}")]
    MealPlanRecipeNotFound {
        /// Meal plan recipe id
        id: i64,
    },

    /// No shopping list with the given id
    #[error("Shopping list not found: {id}")]
    ShoppingListNotFound {
        /// Shopping list id
        id: i64,
    },

    /// No shopping item with the given id
    #[error("Shopping item not found: {id}")]
    ShoppingItemNotFound {
        /// Shopping item id
        id: i64,
    },

    /// The recipe is referenced by meal plan entries and cannot be deleted
    #[error("Recipe {id} is used by {references} meal plan entries and cannot be deleted")]
    RecipeInUse {
        /// Recipe id
        id: i64,
        /// Number of meal plan entries pointing at the recipe
        references: u64,
    },

    /// A recipe may appear at most once per meal group
    #[error("Recipe {recipe_id} is already in meal group {group_id}")]
    DuplicateMealPlanRecipe {
        /// Meal group id
        group_id: i64,
        /// Recipe id
        recipe_id: i64,
    },

    /// Shopping lists can only be generated from plans with at least one recipe
    #[error("Cannot generate shopping list: meal plan {id} has no meals")]
    EmptyMealPlan {
        /// Meal plan id
        id: i64,
    },

    /// The AI collaborator failed or returned something unusable
    #[error("Upstream service error: {message}")]
    Upstream {
        /// Description of the failure
        message: String,
    },

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendering command output failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// The generation service refused the request outright (bad key, bad
    /// request); sending it again will not help
    #[error("Generation service rejected the request: {message}")]
    Rejected {
        /// Status line and response body
        message: String,
    },

    /// Environment variable could not be read
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// SQLite's extended code for a constraint raised by a trigger, which is also
/// how it reports an `ON DELETE RESTRICT` foreign key.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

/// Message of a restrict violation that `DbErr::sql_err` does not classify.
fn restrict_violation(err: &DbErr) -> Option<String> {
    let (DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e)))) = err
    else {
        return None;
    };
    (e.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER)
        && e.message().contains("FOREIGN KEY"))
    .then(|| e.message().to_string())
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(message)
            | SqlErr::UniqueConstraintViolation(message)) => Self::Integrity { message },
            _ => match restrict_violation(&err) {
                Some(message) => Self::Integrity { message },
                None => Self::Database(err),
            },
        }
    }
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for building a [`Error::Upstream`].
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
