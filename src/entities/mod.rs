//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod ingredient;
pub mod instruction_section;
pub mod instruction_step;
pub mod meal_group;
pub mod meal_plan;
pub mod meal_plan_recipe;
pub mod recipe;
pub mod saved_recipe;
pub mod shopping_item;
pub mod shopping_list;
pub mod user;

// Re-export specific types to avoid conflicts
pub use category::ShoppingCategory;
pub use ingredient::{Column as IngredientColumn, Entity as Ingredient, Model as IngredientModel};
pub use instruction_section::{
    Column as InstructionSectionColumn, Entity as InstructionSection,
    Model as InstructionSectionModel,
};
pub use instruction_step::{
    Column as InstructionStepColumn, Entity as InstructionStep, Model as InstructionStepModel,
};
pub use meal_group::{Column as MealGroupColumn, Entity as MealGroup, Model as MealGroupModel};
pub use meal_plan::{Column as MealPlanColumn, Entity as MealPlan, Model as MealPlanModel};
pub use meal_plan_recipe::{
    Column as MealPlanRecipeColumn, Entity as MealPlanRecipe, Model as MealPlanRecipeModel,
};
pub use recipe::{Column as RecipeColumn, Entity as Recipe, Model as RecipeModel, RecipeStatus};
pub use saved_recipe::{
    Column as SavedRecipeColumn, Entity as SavedRecipe, Model as SavedRecipeModel,
};
pub use shopping_item::{
    Column as ShoppingItemColumn, Entity as ShoppingItem, Model as ShoppingItemModel,
};
pub use shopping_list::{
    Column as ShoppingListColumn, Entity as ShoppingList, Model as ShoppingListModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Units};
