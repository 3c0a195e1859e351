//! Instruction section entity - a titled block of steps ("Prepare the sauce").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Instruction section database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "instruction_sections")]
pub struct Model {
    /// Unique identifier for the section
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning recipe
    pub recipe_id: i64,
    /// Section heading
    pub title: String,
    /// 1-based position within the recipe, contiguous
    pub position: i32,
}

/// Defines relationships between `InstructionSection` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each section belongs to one recipe
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id",
        on_delete = "Cascade"
    )]
    Recipe,
    /// One section has many steps
    #[sea_orm(has_many = "super::instruction_step::Entity")]
    Steps,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl Related<super::instruction_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Steps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
