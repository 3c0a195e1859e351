//! Meal group entity - a named subdivision of a meal plan ("Monday", "Lunches").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_groups")]
pub struct Model {
    /// Unique identifier for the group
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning meal plan
    pub meal_plan_id: i64,
    /// Group name
    pub name: String,
    /// 1-based position within the plan, unique per plan
    pub position: i32,
}

/// Defines relationships between `MealGroup` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each group belongs to one meal plan
    #[sea_orm(
        belongs_to = "super::meal_plan::Entity",
        from = "Column::MealPlanId",
        to = "super::meal_plan::Column::Id",
        on_delete = "Cascade"
    )]
    MealPlan,
    /// One group holds many recipe entries
    #[sea_orm(has_many = "super::meal_plan_recipe::Entity")]
    MealPlanRecipes,
}

impl Related<super::meal_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealPlan.def()
    }
}

impl Related<super::meal_plan_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealPlanRecipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
