//! User entity - owner of recipes, meal plans and shopping lists.
//!
//! Authentication is handled elsewhere; this table only carries the identity
//! and the preferences that seed recipe and shopping-list generation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Preferred measurement system for generated quantities.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Metric (g, ml, °C)
    #[default]
    #[sea_orm(string_value = "metric")]
    Metric,
    /// US customary (oz, cups, °F)
    #[sea_orm(string_value = "us")]
    Us,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Metric => "metric",
            Self::Us => "US",
        })
    }
}

impl FromStr for Units {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "us" | "imperial" => Ok(Self::Us),
            other => Err(crate::errors::Error::validation(format!(
                "Unknown units '{other}', expected metric or us"
            ))),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across the system
    #[sea_orm(unique)]
    pub username: String,
    /// Free-text dietary preferences (e.g. "vegetarian, no nuts")
    pub dietary_preferences: String,
    /// Servings pre-filled on the recipe generation form
    pub default_servings: i32,
    /// Measurement system used for generated quantities
    pub preferred_units: Units,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user creates many recipes
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipes,
    /// One user owns many meal plans
    #[sea_orm(has_many = "super::meal_plan::Entity")]
    MealPlans,
    /// One user owns many shopping lists
    #[sea_orm(has_many = "super::shopping_list::Entity")]
    ShoppingLists,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl Related<super::meal_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealPlans.def()
    }
}

impl Related<super::shopping_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingLists.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
