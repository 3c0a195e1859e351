//! Command implementations organized by area.
//!
//! Every command returns the text to print; nothing here writes to stdout.

/// Stand-alone utility commands
pub mod general;

/// Meal plan commands
pub mod meal_plan;

/// Recipe commands
pub mod recipe;

/// Shopping list commands
pub mod shopping_list;

/// Renders an ingredient as "quantity name", or just the name when the
/// quantity is blank.
fn ingredient_line(quantity: &str, name: &str) -> String {
    if quantity.trim().is_empty() {
        name.to_string()
    } else {
        format!("{quantity} {name}")
    }
}
