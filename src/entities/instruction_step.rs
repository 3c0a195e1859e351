//! Instruction step entity - a single numbered step inside a section.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Instruction step database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "instruction_steps")]
pub struct Model {
    /// Unique identifier for the step
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning section
    pub section_id: i64,
    /// Step text
    pub text: String,
    /// 1-based position within the section, contiguous
    pub position: i32,
}

/// Defines relationships between `InstructionStep` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each step belongs to one section
    #[sea_orm(
        belongs_to = "super::instruction_section::Entity",
        from = "Column::SectionId",
        to = "super::instruction_section::Column::Id",
        on_delete = "Cascade"
    )]
    Section,
}

impl Related<super::instruction_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
