//! Meal plan recipe entity - places a recipe inside a meal group.
//!
//! The recipe reference is protected: a recipe cannot be deleted while any
//! entry points at it. Deleting the group removes its entries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal plan recipe database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_plan_recipes")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the group holding the entry
    pub meal_group_id: i64,
    /// ID of the referenced recipe
    pub recipe_id: i64,
    /// Servings to cook for this entry
    pub servings: i32,
    /// 1-based position within the group, unique per group
    pub position: i32,
    /// When the entry was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `MealPlanRecipe` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one group
    #[sea_orm(
        belongs_to = "super::meal_group::Entity",
        from = "Column::MealGroupId",
        to = "super::meal_group::Column::Id",
        on_delete = "Cascade"
    )]
    MealGroup,
    /// Each entry references one recipe
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id",
        on_delete = "Restrict"
    )]
    Recipe,
}

impl Related<super::meal_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealGroup.def()
    }
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
