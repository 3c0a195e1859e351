//! Recipe entity - a dish definition owned by its creator.
//!
//! Ingredients and instruction sections hang off a recipe. `ingredients_digest`
//! is a cached hash of the scalable content (servings plus ordered
//! ingredients) and is only ever written by `core::digest`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication state of a recipe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    /// Visible only to its creator
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Visible to everyone
    #[default]
    #[sea_orm(string_value = "published")]
    Published,
}

/// Recipe database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    /// Unique identifier for the recipe
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Dish name shown in lists (e.g. "Chicken Korma")
    pub title: String,
    /// Number of servings the ingredient quantities are written for
    pub servings: i32,
    /// Free-text description
    pub description: String,
    /// Draft or published
    pub status: RecipeStatus,
    /// User who created the recipe
    pub created_by: i64,
    /// Opaque key of the recipe image in object storage, if any
    pub image: Option<String>,
    /// SHA-256 hex digest of servings plus ordered ingredients
    pub ingredients_digest: String,
    /// When the recipe was created
    pub created_at: DateTimeUtc,
    /// When the recipe was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Recipe and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each recipe belongs to its creator
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,
    /// One recipe has many ingredients
    #[sea_orm(has_many = "super::ingredient::Entity")]
    Ingredients,
    /// One recipe has many instruction sections
    #[sea_orm(has_many = "super::instruction_section::Entity")]
    InstructionSections,
    /// One recipe is referenced by many meal plan entries
    #[sea_orm(has_many = "super::meal_plan_recipe::Entity")]
    MealPlanRecipes,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl Related<super::instruction_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstructionSections.def()
    }
}

impl Related<super::meal_plan_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealPlanRecipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
