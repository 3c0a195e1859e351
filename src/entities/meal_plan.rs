//! Meal plan entity - a named collection of meal groups owned by one user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal plan database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_plans")]
pub struct Model {
    /// Unique identifier for the meal plan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the plan
    pub user_id: i64,
    /// Plan name (e.g. "Christmas Menu")
    pub name: String,
    /// When the plan was created
    pub created_at: DateTimeUtc,
    /// When the plan was last modified
    pub updated_at: DateTimeUtc,
    /// When the owner last opened the plan
    pub last_viewed_at: Option<DateTimeUtc>,
}

/// Defines relationships between `MealPlan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each plan belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// One plan has many groups
    #[sea_orm(has_many = "super::meal_group::Entity")]
    Groups,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::meal_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
