//! Shopping category vocabulary shared by the shopping-list generator and the
//! persisted `shopping_items.category` column.
//!
//! The set is closed: anything outside it is rejected at the boundary by
//! [`ShoppingCategory::parse`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aisle-style grouping for shopping items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ShoppingCategory {
    /// Fruit & Vegetables
    #[sea_orm(string_value = "fruit_veg")]
    FruitVeg,
    /// Meat & Fish
    #[sea_orm(string_value = "meat_fish")]
    MeatFish,
    /// Dairy & Refrigerated
    #[sea_orm(string_value = "dairy")]
    Dairy,
    /// Bakery
    #[sea_orm(string_value = "bakery")]
    Bakery,
    /// Pantry
    #[sea_orm(string_value = "pantry")]
    Pantry,
    /// Drinks
    #[sea_orm(string_value = "drinks")]
    Drinks,
    /// Snacks
    #[sea_orm(string_value = "snacks")]
    Snacks,
    /// Frozen
    #[sea_orm(string_value = "frozen")]
    Frozen,
    /// Non-food
    #[sea_orm(string_value = "non_food")]
    NonFood,
}

impl ShoppingCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 9] = [
        Self::FruitVeg,
        Self::MeatFish,
        Self::Dairy,
        Self::Bakery,
        Self::Pantry,
        Self::Drinks,
        Self::Snacks,
        Self::Frozen,
        Self::NonFood,
    ];

    /// Stable storage key, e.g. `"fruit_veg"`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FruitVeg => "fruit_veg",
            Self::MeatFish => "meat_fish",
            Self::Dairy => "dairy",
            Self::Bakery => "bakery",
            Self::Pantry => "pantry",
            Self::Drinks => "drinks",
            Self::Snacks => "snacks",
            Self::Frozen => "frozen",
            Self::NonFood => "non_food",
        }
    }

    /// Human-readable label, also the wording offered to the generator.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FruitVeg => "Fruit & Vegetables",
            Self::MeatFish => "Meat & Fish",
            Self::Dairy => "Dairy & Refrigerated",
            Self::Bakery => "Bakery",
            Self::Pantry => "Pantry",
            Self::Drinks => "Drinks",
            Self::Snacks => "Snacks",
            Self::Frozen => "Frozen",
            Self::NonFood => "Non-food",
        }
    }

    /// Position used when listing items by aisle.
    #[must_use]
    pub fn sort_order(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(Self::ALL.len())
    }

    /// Accepts either the storage key or the label, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|c| {
            c.key().eq_ignore_ascii_case(value) || c.label().eq_ignore_ascii_case(value)
        })
    }
}

impl fmt::Display for ShoppingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShoppingCategory {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            crate::errors::Error::validation(format!("Unknown shopping category: {s}"))
        })
    }
}
