/// Content digests and shopping list staleness
pub mod digest;

/// Ingredient editing
pub mod ingredient;

/// Instruction sections and steps
pub mod instruction;

/// Meal plans, groups and entries
pub mod meal_plan;

mod ordering;

/// Recipe storage, lookup, scaling and import
pub mod recipe;

/// Quantity scaling for free-text ingredient lines
pub mod scaling;

/// Shopping list generation and upkeep
pub mod shopping_list;

/// Starting layouts for new meal plans
pub mod templates;

/// User lookup and preferences
pub mod user;
