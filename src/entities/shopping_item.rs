//! Shopping item entity - one line on a shopping list.

use super::category::ShoppingCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shopping item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning list
    pub shopping_list_id: i64,
    /// Recipe the item came from, if any
    pub recipe_id: Option<i64>,
    /// Item name (e.g. "Carrots")
    pub name: String,
    /// Quantity text (e.g. "500 g")
    pub quantity: String,
    /// Aisle category
    pub category: ShoppingCategory,
    /// Whether the item has been ticked off
    pub is_checked: bool,
}

/// Defines relationships between `ShoppingItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one list
    #[sea_orm(
        belongs_to = "super::shopping_list::Entity",
        from = "Column::ShoppingListId",
        to = "super::shopping_list::Column::Id",
        on_delete = "Cascade"
    )]
    ShoppingList,
    /// Each item may point back at the recipe it came from
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id",
        on_delete = "SetNull"
    )]
    Recipe,
}

impl Related<super::shopping_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingList.def()
    }
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
