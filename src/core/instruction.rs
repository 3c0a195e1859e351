//! Instruction sections and steps.
//!
//! Instructions do not affect scaling, so these operations leave the
//! ingredients digest alone and only bump the recipe's `updated_at`.

use super::{
    ordering::{position_at, renumber},
    recipe::{require_recipe, touch_recipe},
};
use crate::{
    entities::{InstructionSection, InstructionStep, instruction_section, instruction_step},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::instrument;

async fn require_section<C>(db: &C, section_id: i64) -> Result<instruction_section::Model>
where
    C: ConnectionTrait,
{
    InstructionSection::find_by_id(section_id)
        .one(db)
        .await?
        .ok_or(Error::InstructionNotFound { id: section_id })
}

async fn section_ids<C>(db: &C, recipe_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    Ok(InstructionSection::find()
        .filter(instruction_section::Column::RecipeId.eq(recipe_id))
        .order_by_asc(instruction_section::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect())
}

async fn step_ids<C>(db: &C, section_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    Ok(InstructionStep::find()
        .filter(instruction_step::Column::SectionId.eq(section_id))
        .order_by_asc(instruction_step::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect())
}

/// Appends a titled section to a recipe.
///
/// # Errors
/// Returns an error if the title is blank, the recipe does not exist or the
/// insert fails.
#[instrument(skip(db))]
pub async fn add_instruction_section(
    db: &DatabaseConnection,
    recipe_id: i64,
    title: String,
) -> Result<instruction_section::Model> {
    if title.trim().is_empty() {
        return Err(Error::validation("Section title cannot be empty"));
    }

    let txn = db.begin().await?;
    require_recipe(&txn, recipe_id).await?;
    let existing = section_ids(&txn, recipe_id).await?;

    let section = instruction_section::ActiveModel {
        recipe_id: Set(recipe_id),
        title: Set(title.trim().to_string()),
        position: Set(position_at(existing.len())?),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    touch_recipe(&txn, recipe_id).await?;
    txn.commit().await?;
    Ok(section)
}

/// Appends a step to a section.
///
/// # Errors
/// Returns an error if the text is blank, the section does not exist or the
/// insert fails.
#[instrument(skip(db, text))]
pub async fn add_instruction_step(
    db: &DatabaseConnection,
    section_id: i64,
    text: String,
) -> Result<instruction_step::Model> {
    if text.trim().is_empty() {
        return Err(Error::validation("Step text cannot be empty"));
    }

    let txn = db.begin().await?;
    let section = require_section(&txn, section_id).await?;
    let existing = step_ids(&txn, section_id).await?;

    let step = instruction_step::ActiveModel {
        section_id: Set(section_id),
        text: Set(text.trim().to_string()),
        position: Set(position_at(existing.len())?),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    touch_recipe(&txn, section.recipe_id).await?;
    txn.commit().await?;
    Ok(step)
}

/// Deletes a section with its steps and renumbers the remaining sections.
///
/// # Errors
/// Returns an error if the section does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_instruction_section(db: &DatabaseConnection, section_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let section = require_section(&txn, section_id).await?;

    InstructionSection::delete_by_id(section_id)
        .exec(&txn)
        .await?;
    let remaining = section_ids(&txn, section.recipe_id).await?;
    renumber::<InstructionSection, _>(
        &txn,
        instruction_section::Column::Id,
        instruction_section::Column::Position,
        &remaining,
    )
    .await?;

    touch_recipe(&txn, section.recipe_id).await?;
    txn.commit().await?;
    Ok(())
}

/// Deletes a step and renumbers the remaining steps of its section.
///
/// # Errors
/// Returns an error if the step does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_instruction_step(db: &DatabaseConnection, step_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let step = InstructionStep::find_by_id(step_id)
        .one(&txn)
        .await?
        .ok_or(Error::InstructionNotFound { id: step_id })?;
    let section = require_section(&txn, step.section_id).await?;

    InstructionStep::delete_by_id(step_id).exec(&txn).await?;
    let remaining = step_ids(&txn, section.id).await?;
    renumber::<InstructionStep, _>(
        &txn,
        instruction_step::Column::Id,
        instruction_step::Column::Position,
        &remaining,
    )
    .await?;

    touch_recipe(&txn, section.recipe_id).await?;
    txn.commit().await?;
    Ok(())
}
