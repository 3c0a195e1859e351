//! Shopping list entity - items derived from a meal plan, owned by a user.
//!
//! `content_digest` caches a hash over the `(recipe digest, servings)` pairs
//! the list was generated from. It drives a staleness flag only; lists are
//! never regenerated automatically.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shopping list database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_lists")]
pub struct Model {
    /// Unique identifier for the list
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the list
    pub user_id: i64,
    /// Meal plan the list was generated from, if it still exists
    pub meal_plan_id: Option<i64>,
    /// List name
    pub name: String,
    /// SHA-256 hex digest of the source recipes at generation time
    pub content_digest: String,
    /// When the list was created
    pub created_at: DateTimeUtc,
    /// When the list was last modified
    pub updated_at: DateTimeUtc,
    /// When the owner last opened the list
    pub last_viewed_at: Option<DateTimeUtc>,
}

/// Defines relationships between `ShoppingList` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each list belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each list may point back at its meal plan
    #[sea_orm(
        belongs_to = "super::meal_plan::Entity",
        from = "Column::MealPlanId",
        to = "super::meal_plan::Column::Id",
        on_delete = "SetNull"
    )]
    MealPlan,
    /// One list has many items
    #[sea_orm(has_many = "super::shopping_item::Entity")]
    Items,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::meal_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealPlan.def()
    }
}

impl Related<super::shopping_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
