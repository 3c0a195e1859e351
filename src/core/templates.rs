//! Meal plan templates: the groups a new plan starts with.

use crate::errors::{Error, Result};
use std::{fmt, str::FromStr};

/// Starting layout for a new meal plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MealPlanTemplate {
    /// One group per day, Monday to Sunday
    #[default]
    Weekday,
    /// Breakfasts, lunches, dinners and snacks
    MealType,
    /// No groups
    Blank,
}

impl MealPlanTemplate {
    /// All templates in display order.
    pub const ALL: [Self; 3] = [Self::Weekday, Self::MealType, Self::Blank];

    /// Key used on the command line and in stored settings.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Weekday => "weekday",
            Self::MealType => "meal_type",
            Self::Blank => "blank",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Weekday => "By Weekday",
            Self::MealType => "By Meal Type",
            Self::Blank => "Blank",
        }
    }

    /// One-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Weekday => "Organise meals by day of the week",
            Self::MealType => "Organise meals by type: breakfasts, lunches, dinners, snacks",
            Self::Blank => "Create your own meal plan from scratch",
        }
    }

    /// Names of the groups a plan created from this template starts with.
    #[must_use]
    pub const fn meal_groups(self) -> &'static [&'static str] {
        match self {
            Self::Weekday => &[
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday",
            ],
            Self::MealType => &["Breakfasts", "Lunches", "Dinners", "Snacks"],
            Self::Blank => &[],
        }
    }
}

impl fmt::Display for MealPlanTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MealPlanTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.key() == wanted)
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|t| t.key()).collect();
                Error::validation(format!(
                    "Unknown meal plan template '{s}', expected one of: {}",
                    keys.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_group_layouts() {
        assert_eq!(MealPlanTemplate::Weekday.meal_groups().len(), 7);
        assert_eq!(MealPlanTemplate::Weekday.meal_groups()[0], "Monday");
        assert_eq!(
            MealPlanTemplate::MealType.meal_groups(),
            &["Breakfasts", "Lunches", "Dinners", "Snacks"]
        );
        assert!(MealPlanTemplate::Blank.meal_groups().is_empty());
    }

    #[test]
    fn test_parse_template() {
        assert_eq!(
            "weekday".parse::<MealPlanTemplate>().unwrap(),
            MealPlanTemplate::Weekday
        );
        assert_eq!(
            "Meal-Type".parse::<MealPlanTemplate>().unwrap(),
            MealPlanTemplate::MealType
        );
        let err = "monthly".parse::<MealPlanTemplate>().unwrap_err();
        assert!(err.to_string().contains("weekday, meal_type, blank"));
    }
}
