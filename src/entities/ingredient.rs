//! Ingredient entity - one line of a recipe's ingredient list.
//!
//! `quantity` is free text ("2 1/2 cups, diced"); only its leading number is
//! ever interpreted, by `core::scaling`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ingredient database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    /// Unique identifier for the ingredient
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning recipe
    pub recipe_id: i64,
    /// Display name (e.g. "Carrot")
    pub name: String,
    /// Quantity text (e.g. "2 cups")
    pub quantity: String,
    /// 1-based position within the recipe, contiguous
    pub position: i32,
    /// When the ingredient was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Ingredient and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ingredient belongs to one recipe
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id",
        on_delete = "Cascade"
    )]
    Recipe,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
